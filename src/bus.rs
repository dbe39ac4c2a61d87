// Bus module - CPU and PPU address routing
//
// The bus owns every piece of console state that is not a processor: work
// RAM, nametable RAM, palette RAM, the controller port, the OAM DMA unit and
// the cartridge. The CPU and PPU only see it through `MemoryMappedDevice`.
//
// # NES Memory Map (CPU Address Space)
//
// ```text
// $0000-$07FF: 2KB Internal RAM
// $0800-$1FFF: Mirrors of RAM (3 times)
// $2000-$2007: PPU Registers
// $2008-$3FFF: Mirrors of PPU Registers (repeating every 8 bytes)
// $4000-$4013: APU registers (writes ignored, reads 0)
// $4014:       OAM DMA
// $4015:       APU status (reads 0)
// $4016:       Controller 1 data / strobe
// $4017:       Controller 2 data (unplugged)
// $4018-$401F: APU and I/O test functionality (reads 0)
// $4020-$FFFF: Cartridge space (PRG-ROM, PRG-RAM, and mapper registers)
// ```
//
// # PPU Address Space
//
// ```text
// $0000-$1FFF: Pattern tables (cartridge CHR)
// $2000-$2FFF: Nametables (2KB VRAM, arranged by the mapper's mirroring)
// $3000-$3EFF: Mirror of $2000-$2EFF
// $3F00-$3F1F: Palette RAM
// $3F20-$3FFF: Mirrors of palette RAM
// ```

use crate::cartridge::{Mapper, MapperState, Mirroring};
use crate::input::{Buttons, Controller};
use crate::ppu::{palette, Ppu, PPU_REGISTER_MASK};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the console work RAM
pub const RAM_SIZE: usize = 2048;

/// Size of the console nametable RAM
pub const VRAM_SIZE: usize = 2048;

/// Size of palette RAM
pub const PALETTE_SIZE: usize = 32;

/// Trait for memory-mapped components
///
/// This trait defines the interface through which the CPU and PPU reach
/// memory. Implementations decide what each address means; reads take
/// `&mut self` because some of them have side effects (e.g., PPUSTATUS
/// clears flags).
pub trait MemoryMappedDevice {
    /// Read a byte from the device
    ///
    /// # Arguments
    /// * `addr` - The address to read from (device-specific addressing)
    ///
    /// # Returns
    /// The byte value at the specified address
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to the device
    ///
    /// # Arguments
    /// * `addr` - The address to write to (device-specific addressing)
    /// * `data` - The byte value to write
    fn write(&mut self, addr: u16, data: u8);
}

/// CPU view of the bus: memory plus the two interrupt request lines
pub trait CpuBus: MemoryMappedDevice {
    /// Level of the NMI line (the CPU detects the rising edge)
    fn nmi_line(&self) -> bool {
        false
    }

    /// Level of the IRQ line
    fn irq_line(&self) -> bool {
        false
    }
}

// ========================================
// PPU address space
// ========================================

/// PPU-side router, borrowed from the bus for the duration of one PPU access
pub struct VideoMemory<'a> {
    vram: &'a mut [u8; VRAM_SIZE],
    palette: &'a mut [u8; PALETTE_SIZE],
    mapper: Option<&'a mut Box<dyn Mapper>>,
}

impl VideoMemory<'_> {
    fn mirroring(&self) -> Mirroring {
        self.mapper
            .as_ref()
            .map_or(Mirroring::Horizontal, |mapper| mapper.mirroring_mode())
    }
}

impl MemoryMappedDevice for VideoMemory<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        match addr & 0x3FFF {
            addr @ 0x0000..=0x1FFF => {
                self.mapper.as_ref().map_or(0, |mapper| mapper.chr_read(addr))
            }
            addr @ 0x2000..=0x3EFF => self.vram[self.mirroring().vram_offset(addr)],
            addr @ 0x3F00..=0x3FFF => self.palette[palette::palette_ram_index(addr)],
            _ => unreachable!("PPU address decode is exhaustive"),
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr & 0x3FFF {
            addr @ 0x0000..=0x1FFF => {
                if let Some(mapper) = self.mapper.as_mut() {
                    mapper.chr_write(addr, data);
                }
            }
            addr @ 0x2000..=0x3EFF => {
                let offset = self.mirroring().vram_offset(addr);
                self.vram[offset] = data;
            }
            addr @ 0x3F00..=0x3FFF => self.palette[palette::palette_ram_index(addr)] = data,
            _ => unreachable!("PPU address decode is exhaustive"),
        }
    }
}

// ========================================
// OAM DMA
// ========================================

/// Progress of an OAM DMA transfer
///
/// A write to $4014 requests the transfer. The DMA unit halts the CPU on its
/// next read cycle, optionally waits one more to align with a read cycle,
/// then alternates a read from `$XX00+low` and a write to $2004 for each of
/// the 256 bytes. The halt and alignment cycles repeat the read the CPU was
/// about to make.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DmaState {
    #[default]
    Idle,
    Halt { page: u8 },
    Align { page: u8 },
    Read { page: u8, low: u8 },
    Write { page: u8, low: u8, value: u8 },
}

// ========================================
// Bus
// ========================================

/// Main memory bus structure
///
/// The Bus connects the CPU to all memory-mapped components in the NES system.
/// It handles address decoding, memory mirroring, and routes read/write operations
/// to the appropriate components.
pub struct Bus {
    /// Internal RAM: 2KB at $0000-$07FF, mirrored 3 times at $0800-$1FFF
    ram: [u8; RAM_SIZE],

    ppu: Ppu,

    /// Nametable RAM (CIRAM)
    vram: [u8; VRAM_SIZE],

    palette: [u8; PALETTE_SIZE],

    cartridge: Option<Box<dyn Mapper>>,

    /// Controller port 1 ($4016)
    controller: Controller,

    dma: DmaState,
}

/// Serializable copy of everything the bus owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusState {
    pub ram: Vec<u8>,
    pub vram: Vec<u8>,
    pub palette: Vec<u8>,
    pub ppu: Ppu,
    pub controller: Controller,
    pub dma: DmaState,
    pub mapper: Option<MapperState>,
}

impl Bus {
    /// Create a bus with zeroed memory and no cartridge
    ///
    /// # Example
    /// ```
    /// use cyclenes::{Bus, MemoryMappedDevice};
    /// let mut bus = Bus::new();
    /// bus.write(0x0800, 0x42);
    /// assert_eq!(bus.read(0x0000), 0x42);
    /// ```
    pub fn new() -> Self {
        Bus {
            ram: [0; RAM_SIZE],
            ppu: Ppu::new(),
            vram: [0; VRAM_SIZE],
            palette: [0; PALETTE_SIZE],
            cartridge: None,
            controller: Controller::new(),
            dma: DmaState::Idle,
        }
    }

    /// Plug in a cartridge, replacing any previous one
    pub fn insert_cartridge(&mut self, mapper: Box<dyn Mapper>) {
        self.cartridge = Some(mapper);
    }

    /// The active cartridge, if any
    pub fn cartridge(&self) -> Option<&dyn Mapper> {
        self.cartridge.as_deref()
    }

    /// Fill work RAM with a power-on pattern
    pub fn fill_ram(&mut self, value: u8) {
        self.ram.fill(value);
    }

    pub fn ram(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    /// Update the buttons held on controller 1
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.controller.set_buttons(buttons);
    }

    /// Split the bus into the PPU and the PPU's view of memory
    fn split(&mut self) -> (&mut Ppu, VideoMemory<'_>) {
        (
            &mut self.ppu,
            VideoMemory {
                vram: &mut self.vram,
                palette: &mut self.palette,
                mapper: self.cartridge.as_mut(),
            },
        )
    }

    /// Advance the PPU by one dot
    ///
    /// # Returns
    ///
    /// `true` if the dot completed a frame
    pub fn tick_ppu(&mut self) -> bool {
        let (ppu, mut memory) = self.split();
        ppu.tick(&mut memory)
    }

    /// Read PPU address space without touching PPU registers
    pub fn ppu_read(&mut self, addr: u16) -> u8 {
        let (_, mut memory) = self.split();
        memory.read(addr)
    }

    /// Read a CPU address without side effects
    ///
    /// PPU registers return the I/O latch and controller ports do not shift.
    /// Used by the disassembler and trace logger.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self.ppu.io_latch(),
            0x4000..=0x401F => 0,
            0x4020..=0xFFFF => self.cartridge.as_ref().map_or(0, |mapper| mapper.cpu_read(addr)),
        }
    }

    // ========================================
    // OAM DMA
    // ========================================

    /// A DMA transfer owns the bus this cycle
    pub fn dma_active(&self) -> bool {
        self.dma != DmaState::Idle
    }

    pub fn dma_state(&self) -> DmaState {
        self.dma
    }

    /// Run one DMA cycle in place of a CPU read cycle
    ///
    /// The CPU is only halted on a read: callers keep ticking the CPU while
    /// its next cycle is a write, and the request stays pending.
    ///
    /// # Arguments
    ///
    /// * `cycle` - Index of this CPU cycle since power-on; the halt cycle's
    ///   parity decides whether an alignment cycle is needed
    /// * `halted_read` - Address of the read the halted CPU is stuck on
    pub fn step_dma(&mut self, cycle: u64, halted_read: u16) {
        self.dma = match self.dma {
            DmaState::Idle => DmaState::Idle,
            DmaState::Halt { page } => {
                self.read(halted_read);
                if cycle % 2 == 1 {
                    DmaState::Align { page }
                } else {
                    DmaState::Read { page, low: 0 }
                }
            }
            DmaState::Align { page } => {
                self.read(halted_read);
                DmaState::Read { page, low: 0 }
            }
            DmaState::Read { page, low } => {
                let value = self.read(u16::from_le_bytes([low, page]));
                DmaState::Write { page, low, value }
            }
            DmaState::Write { page, low, value } => {
                self.write(0x2004, value);
                match low.checked_add(1) {
                    Some(low) => DmaState::Read { page, low },
                    None => DmaState::Idle,
                }
            }
        };
    }

    // ========================================
    // Save states
    // ========================================

    /// Capture RAM, PPU, controller, DMA and mapper state
    pub fn save_state(&self) -> BusState {
        BusState {
            ram: self.ram.to_vec(),
            vram: self.vram.to_vec(),
            palette: self.palette.to_vec(),
            ppu: self.ppu.clone(),
            controller: self.controller.clone(),
            dma: self.dma,
            mapper: self.cartridge.as_ref().map(|mapper| mapper.save_state()),
        }
    }

    /// Restore a state captured by [`Bus::save_state`]
    ///
    /// Returns `false`, leaving the bus untouched, when the RAM sizes are
    /// wrong or the mapper state does not fit the inserted cartridge.
    pub fn load_state(&mut self, state: &BusState) -> bool {
        if state.ram.len() != RAM_SIZE
            || state.vram.len() != VRAM_SIZE
            || state.palette.len() != PALETTE_SIZE
        {
            return false;
        }

        match (self.cartridge.as_mut(), &state.mapper) {
            (Some(mapper), Some(mapper_state)) => {
                if !mapper.load_state(mapper_state) {
                    return false;
                }
            }
            (None, None) => {}
            _ => return false,
        }

        self.ram.copy_from_slice(&state.ram);
        self.vram.copy_from_slice(&state.vram);
        self.palette.copy_from_slice(&state.palette);
        self.ppu = state.ppu.clone();
        self.controller = state.controller.clone();
        self.dma = state.dma;
        true
    }
}

impl MemoryMappedDevice for Bus {
    /// Read a byte from the CPU address space
    ///
    /// Reads from PPU registers and the controller port have side effects.
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => {
                let (ppu, mut memory) = self.split();
                ppu.read_register(addr & PPU_REGISTER_MASK, &mut memory)
            }
            // Bits 5-7 of the controller ports are open bus
            0x4016 => self.controller.read() | 0x40,
            0x4017 => 0x40,
            0x4000..=0x4015 | 0x4018..=0x401F => 0,
            0x4020..=0xFFFF => self.cartridge.as_ref().map_or(0, |mapper| mapper.cpu_read(addr)),
        }
    }

    /// Write a byte to the CPU address space
    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,
            0x2000..=0x3FFF => {
                let (ppu, mut memory) = self.split();
                ppu.write_register(addr & PPU_REGISTER_MASK, data, &mut memory);
            }
            0x4014 => self.dma = DmaState::Halt { page: data },
            0x4016 => self.controller.write_strobe(data),
            // APU and test registers
            0x4000..=0x4013 | 0x4015 | 0x4017..=0x401F => {}
            0x4020..=0xFFFF => {
                if let Some(mapper) = self.cartridge.as_mut() {
                    mapper.cpu_write(addr, data);
                }
            }
        }
    }
}

impl CpuBus for Bus {
    fn nmi_line(&self) -> bool {
        self.ppu.nmi_line()
    }

    fn irq_line(&self) -> bool {
        self.cartridge.as_ref().is_some_and(|mapper| mapper.irq_line())
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("ppu", &self.ppu)
            .field("controller", &self.controller)
            .field("dma", &self.dma)
            .field(
                "mapper",
                &self.cartridge.as_ref().map(|mapper| mapper.mapper_number()),
            )
            .finish_non_exhaustive()
    }
}
