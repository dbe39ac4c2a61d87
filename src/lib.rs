// cyclenes - cycle-accurate NES emulation core
//
// CPU, PPU, bus and cartridge mappers, stepped one CPU cycle (three PPU
// dots) at a time by the `Emulator` driver.

// Public modules
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod emulator;
pub mod input;
pub mod ppu;

// Re-export main types for convenience
pub use bus::{Bus, BusState, CpuBus, MemoryMappedDevice, VideoMemory};
pub use cartridge::{create_mapper, Cartridge, CartridgeError, FormatError, Mapper, Mirroring};
pub use cpu::Cpu;
pub use debug::{CpuState, Logger};
pub use emulator::{Emulator, EmulatorConfig, Movie, MovieError, SaveStateError, Snapshot};
pub use input::{Buttons, Controller};
pub use ppu::Ppu;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        let _cpu = Cpu::new();
        let _ppu = Ppu::new();
        let _bus = Bus::new();
        let _controller = Controller::new();
        let _emulator = Emulator::default();
    }
}
