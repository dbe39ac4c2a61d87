// Common test utilities for integration tests
//
// Builds synthetic iNES images so cartridge, bus and driver behavior can be
// tested without commercial or test-suite ROM files.

#![allow(dead_code)]

use cyclenes::emulator::{Emulator, EmulatorConfig};
use std::path::{Path, PathBuf};

/// Where the ROM-dependent (ignored) tests look for their files
pub const ROM_DIR: &str = "tests/roms";

pub const PRG_BANK_SIZE: usize = 16 * 1024;
pub const CHR_BANK_SIZE: usize = 8 * 1024;

/// Entry point of the main program (start of the last PRG bank)
pub const RESET_ENTRY: u16 = 0xC000;

/// Entry point of the NMI handler
pub const NMI_ENTRY: u16 = 0xE000;

/// Synthetic iNES image builder
///
/// Every 16KB PRG bank is filled with its bank number and every 4KB CHR
/// half-bank with its half-bank number, so bank switching shows up directly
/// in read values. The program is placed at the start of the last PRG bank,
/// which every supported board maps at $C000 after power-on.
#[derive(Debug, Clone)]
pub struct RomBuilder {
    mapper: u8,
    prg_banks: u8,
    chr_banks: u8,
    vertical_mirroring: bool,
    program: Vec<u8>,
    nmi_handler: Vec<u8>,
    chr: Option<Vec<u8>>,
}

impl RomBuilder {
    /// NROM-128 with one 8KB CHR-ROM bank and vertical mirroring
    pub fn new() -> Self {
        RomBuilder {
            mapper: 0,
            prg_banks: 1,
            chr_banks: 1,
            vertical_mirroring: true,
            program: Vec::new(),
            nmi_handler: vec![0x40], // RTI
            chr: None,
        }
    }

    pub fn mapper(mut self, mapper: u8) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn prg_banks(mut self, banks: u8) -> Self {
        self.prg_banks = banks;
        self
    }

    /// 8KB CHR banks; zero selects 8KB of CHR-RAM
    pub fn chr_banks(mut self, banks: u8) -> Self {
        self.chr_banks = banks;
        self
    }

    pub fn horizontal_mirroring(mut self) -> Self {
        self.vertical_mirroring = false;
        self
    }

    /// Main program, entered from the reset vector at $C000
    pub fn program(mut self, code: &[u8]) -> Self {
        self.program = code.to_vec();
        self
    }

    /// NMI handler at $E000
    pub fn nmi_handler(mut self, code: &[u8]) -> Self {
        self.nmi_handler = code.to_vec();
        self
    }

    /// Explicit CHR-ROM contents instead of the bank-number pattern
    pub fn chr(mut self, chr: Vec<u8>) -> Self {
        self.chr_banks = (chr.len() / CHR_BANK_SIZE) as u8;
        self.chr = Some(chr);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let flags6 = ((self.mapper & 0x0F) << 4) | u8::from(self.vertical_mirroring);
        let flags7 = self.mapper & 0xF0;
        let mut rom = vec![
            b'N', b'E', b'S', 0x1A, self.prg_banks, self.chr_banks, flags6, flags7, 0, 0, 0, 0, 0,
            0, 0, 0,
        ];

        let mut prg: Vec<u8> = (0..self.prg_banks)
            .flat_map(|bank| std::iter::repeat(bank).take(PRG_BANK_SIZE))
            .collect();
        let last = PRG_BANK_SIZE * (self.prg_banks as usize - 1);
        prg[last..last + self.program.len()].copy_from_slice(&self.program);
        let nmi = last + (NMI_ENTRY - RESET_ENTRY) as usize;
        prg[nmi..nmi + self.nmi_handler.len()].copy_from_slice(&self.nmi_handler);

        let vectors = last + PRG_BANK_SIZE - 6;
        prg[vectors..vectors + 6].copy_from_slice(&[
            NMI_ENTRY as u8,
            (NMI_ENTRY >> 8) as u8,
            RESET_ENTRY as u8,
            (RESET_ENTRY >> 8) as u8,
            NMI_ENTRY as u8,
            (NMI_ENTRY >> 8) as u8,
        ]);
        rom.extend_from_slice(&prg);

        match &self.chr {
            Some(chr) => rom.extend_from_slice(chr),
            None => {
                let halves = self.chr_banks as usize * 2;
                for half in 0..halves {
                    rom.extend(std::iter::repeat(half as u8).take(CHR_BANK_SIZE / 2));
                }
            }
        }

        rom
    }
}

impl Default for RomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Emulator with default configuration and `rom` loaded
pub fn emulator_with(rom: &RomBuilder) -> Emulator {
    let mut emulator = Emulator::new(EmulatorConfig::default());
    emulator.load_rom(&rom.build()).expect("Failed to load synthetic ROM");
    emulator
}

/// Run until the CPU reaches `pc` at an instruction boundary
pub fn run_until_pc(emulator: &mut Emulator, pc: u16, buttons: u8, max_cycles: u64) {
    let start = emulator.total_cycles();
    while emulator.cpu().pc != pc || !emulator.cpu().at_instruction_boundary() {
        emulator.step_cycle(buttons);
        assert!(
            emulator.total_cycles() - start < max_cycles,
            "PC ${:04X} not reached within {} cycles",
            pc,
            max_cycles
        );
    }
}

/// Path of a ROM-suite file, `None` when it is not checked out
pub fn rom_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(ROM_DIR).join(name);
    path.exists().then_some(path)
}
