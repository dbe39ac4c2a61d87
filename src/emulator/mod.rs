// Emulator module - Main emulator coordinator
//
// Owns the CPU and the bus (which owns the PPU, RAM, controller and
// cartridge) and drives them in lockstep: three PPU dots, then one CPU or
// DMA cycle. Also hosts the quality-of-life features built on top of that
// loop: snapshots, screenshots, instruction tracing and configuration.

mod config;
mod movie;
mod save_state;
mod screenshot;

pub use config::{
    DebugConfig, EmulatorConfig, InputConfig, OutputConfig, PowerOnConfig, CONFIG_FILE,
};
pub use movie::{Movie, MovieCommand, MovieError, MovieFrame};
pub use save_state::{SaveStateError, Snapshot, SAVE_STATE_VERSION};
pub use screenshot::{save_png, save_screenshot, ScreenshotError};

use crate::bus::Bus;
use crate::cartridge::{create_mapper, Cartridge, CartridgeError};
use crate::cpu::Cpu;
use crate::debug::{CpuState, Logger};
use crate::input::Buttons;
use std::path::{Path, PathBuf};

/// PPU dots per CPU cycle (NTSC)
pub const DOTS_PER_CPU_CYCLE: usize = 3;

/// Main emulator structure
///
/// Constructed once; mutated only by stepping and by loading ROMs.
pub struct Emulator {
    /// CPU (6502 processor)
    cpu: Cpu,

    /// Bus (connects all components)
    bus: Bus,

    /// Configuration
    config: EmulatorConfig,

    /// CPU cycles since the ROM was loaded, DMA cycles included
    total_cycles: u64,

    /// Currently loaded ROM path
    rom_path: Option<PathBuf>,

    /// Image of the inserted cartridge, reloaded on a power cycle
    rom_image: Option<Vec<u8>>,

    /// Instruction trace
    logger: Logger,
}

impl Emulator {
    /// Create an emulator with no cartridge inserted
    ///
    /// # Example
    ///
    /// ```
    /// use cyclenes::emulator::{Emulator, EmulatorConfig};
    ///
    /// let emulator = Emulator::new(EmulatorConfig::default());
    /// assert_eq!(emulator.total_cycles(), 0);
    /// ```
    pub fn new(config: EmulatorConfig) -> Self {
        let mut logger = Logger::new();
        logger.set_max_buffer_size(config.debug.trace_buffer_size);
        if config.debug.cpu_trace {
            logger.enable_cpu_trace();
        }

        Emulator {
            cpu: Cpu::new(),
            bus: Self::power_on_bus(&config),
            config,
            total_cycles: 0,
            rom_path: None,
            rom_image: None,
            logger,
        }
    }

    fn power_on_bus(config: &EmulatorConfig) -> Bus {
        let mut bus = Bus::new();
        bus.fill_ram(config.power_on.ram_fill);
        bus.controller_mut()
            .set_allow_opposing_directions(config.input.allow_opposing_directions);
        bus
    }

    // ========================================
    // ROM loading
    // ========================================

    /// Load an iNES image and power the console on with it
    ///
    /// The image is fully parsed and its mapper built before anything is
    /// replaced, so a failed load leaves the current cartridge and all
    /// machine state untouched. On success CPU, PPU, RAM, controller and
    /// DMA state start over from power-on.
    ///
    /// # Errors
    ///
    /// [`CartridgeError::Format`] for a malformed image and
    /// [`CartridgeError::UnsupportedMapper`] for boards other than 0, 1 and 2
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), CartridgeError> {
        let cartridge = Cartridge::from_ines_bytes(bytes)?;
        let mapper = create_mapper(cartridge)?;

        let (prg_rom, chr_rom) = mapper.rom_sizes();
        tracing::info!(
            mapper = mapper.mapper_number(),
            prg_rom,
            chr_rom,
            mirroring = ?mapper.mirroring_mode(),
            "ROM loaded"
        );

        let mut bus = Self::power_on_bus(&self.config);
        bus.insert_cartridge(mapper);

        self.bus = bus;
        self.cpu = Cpu::new();
        self.total_cycles = 0;
        self.rom_path = None;
        self.rom_image = Some(bytes.to_vec());
        self.logger.clear_buffer();
        Ok(())
    }

    /// Read and load a `.nes` file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cyclenes::emulator::{Emulator, EmulatorConfig};
    ///
    /// let mut emulator = Emulator::new(EmulatorConfig::default());
    /// emulator.load_rom_file("game.nes").expect("Failed to load ROM");
    /// ```
    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        self.load_rom(&bytes)?;
        self.rom_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Press the console's reset button
    ///
    /// The CPU runs its reset sequence over the next seven cycles and the
    /// PPU clears PPUCTRL, PPUMASK and its write toggle. RAM, OAM and the
    /// cartridge are kept.
    pub fn reset(&mut self) {
        tracing::info!("Reset");
        self.cpu.reset();
        self.bus.ppu_mut().reset();
    }

    /// Turn the console off and on again
    ///
    /// The inserted cartridge is rebuilt from its image, so cartridge RAM
    /// and mapper registers start over along with the rest of the machine.
    /// Without a cartridge only CPU and bus are rebuilt.
    pub fn power_cycle(&mut self) -> Result<(), CartridgeError> {
        tracing::info!("Power cycle");
        match self.rom_image.take() {
            Some(image) => {
                let rom_path = self.rom_path.take();
                let result = self.load_rom(&image);
                self.rom_image = Some(image);
                self.rom_path = rom_path;
                result
            }
            None => {
                self.bus = Self::power_on_bus(&self.config);
                self.cpu = Cpu::new();
                self.total_cycles = 0;
                self.logger.clear_buffer();
                Ok(())
            }
        }
    }

    // ========================================
    // Stepping
    // ========================================

    /// Advance exactly one CPU cycle and the three PPU dots that precede it
    ///
    /// # Arguments
    ///
    /// * `buttons` - Controller 1 state; bit 0 A, 1 B, 2 Select, 3 Start,
    ///   4 Up, 5 Down, 6 Left, 7 Right
    ///
    /// # Returns
    ///
    /// `true` if a frame was completed during this cycle
    pub fn step_cycle(&mut self, buttons: u8) -> bool {
        self.bus.set_buttons(Buttons::from_bits_truncate(buttons));

        if self.logger.is_cpu_trace_enabled()
            && self.cpu.at_instruction_boundary()
            && !self.bus.dma_active()
        {
            let state = CpuState::capture(&self.cpu, &self.bus, self.total_cycles);
            self.logger.log_cpu_state(state);
        }

        let mut frame_complete = false;
        for _ in 0..DOTS_PER_CPU_CYCLE {
            frame_complete |= self.bus.tick_ppu();
        }

        // DMA only takes over a CPU read cycle; writes still go through
        match self.cpu.pending_read() {
            Some(address) if self.bus.dma_active() => {
                self.bus.step_dma(self.total_cycles, address);
            }
            _ => self.cpu.tick(&mut self.bus),
        }

        self.total_cycles += 1;
        frame_complete
    }

    /// Run until the CPU reaches the next instruction boundary
    ///
    /// A pending OAM DMA is run to completion. A jammed CPU returns after
    /// a single cycle.
    ///
    /// # Returns
    ///
    /// Number of CPU cycles executed
    pub fn step_instruction(&mut self, buttons: u8) -> u64 {
        let start = self.total_cycles;
        loop {
            self.step_cycle(buttons);
            if self.cpu.is_jammed()
                || (self.cpu.at_instruction_boundary() && !self.bus.dma_active())
            {
                break;
            }
        }
        self.total_cycles - start
    }

    /// Run until the PPU completes a frame
    ///
    /// # Returns
    ///
    /// Number of CPU cycles executed
    pub fn step_frame(&mut self, buttons: u8) -> u64 {
        let start = self.total_cycles;
        while !self.step_cycle(buttons) {}
        self.total_cycles - start
    }

    /// Run one frame of a movie: its console commands, then a frame with
    /// its controller 1 input held
    ///
    /// # Returns
    ///
    /// Number of CPU cycles executed
    pub fn replay_frame(&mut self, frame: &MovieFrame) -> Result<u64, CartridgeError> {
        if frame.commands.contains(MovieCommand::HARD_RESET) {
            self.power_cycle()?;
        } else if frame.commands.contains(MovieCommand::SOFT_RESET) {
            self.reset();
        }
        Ok(self.step_frame(frame.port0.bits()))
    }

    /// Replay every frame of a movie from the current state
    ///
    /// # Returns
    ///
    /// Number of CPU cycles executed
    pub fn play_movie(&mut self, movie: &Movie) -> Result<u64, CartridgeError> {
        tracing::info!(
            frames = movie.len(),
            rom = %movie.rom_filename,
            "Playing movie"
        );
        let mut cycles = 0;
        for frame in &movie.frames {
            cycles += self.replay_frame(frame)?;
        }
        Ok(cycles)
    }

    /// The most recently completed frame, 256x240 packed RGB
    pub fn video_frame(&self) -> &[u8] {
        self.bus.ppu().frame_buffer()
    }

    // ========================================
    // Snapshots
    // ========================================

    /// Capture the complete machine state
    ///
    /// # Errors
    ///
    /// [`SaveStateError::NoRomLoaded`] when no cartridge is inserted
    pub fn snapshot(&self) -> Result<Snapshot, SaveStateError> {
        let mapper = self.bus.cartridge().ok_or(SaveStateError::NoRomLoaded)?;

        Ok(Snapshot {
            version: SAVE_STATE_VERSION,
            timestamp: chrono::Local::now().to_rfc3339(),
            mapper_number: mapper.mapper_number(),
            rom_sizes: mapper.rom_sizes(),
            total_cycles: self.total_cycles,
            cpu: self.cpu.clone(),
            bus: self.bus.save_state(),
        })
    }

    /// Resume from a snapshot taken with the same cartridge
    ///
    /// Nothing is modified when an error is returned.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SaveStateError> {
        if snapshot.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: SAVE_STATE_VERSION,
                found: snapshot.version,
            });
        }

        let mapper = self.bus.cartridge().ok_or(SaveStateError::NoRomLoaded)?;
        if mapper.mapper_number() != snapshot.mapper_number
            || mapper.rom_sizes() != snapshot.rom_sizes
        {
            return Err(SaveStateError::CartridgeMismatch);
        }

        if !self.bus.load_state(&snapshot.bus) {
            return Err(SaveStateError::CartridgeMismatch);
        }
        self.cpu = snapshot.cpu.clone();
        self.total_cycles = snapshot.total_cycles;

        tracing::info!(
            cycles = snapshot.total_cycles,
            taken = %snapshot.timestamp,
            "Snapshot restored"
        );
        Ok(())
    }

    /// Save the current frame to the configured screenshot directory
    pub fn screenshot(&self) -> Result<PathBuf, ScreenshotError> {
        save_screenshot(
            self.video_frame(),
            &self.config.output.screenshot_directory,
            self.rom_path.as_deref(),
        )
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable CPU access for test harnesses (e.g. `jump_to`)
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut Logger {
        &mut self.logger
    }

    /// CPU cycles since the ROM was loaded
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Frames completed by the PPU
    pub fn frame_count(&self) -> u64 {
        self.bus.ppu().frame_count()
    }

    /// Path of the loaded ROM, when it came from a file
    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}
