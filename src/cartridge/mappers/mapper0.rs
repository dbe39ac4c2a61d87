// Mapper 0 (NROM) - Fixed banks, no registers
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (mirror of the first for NROM-128)
// - PPU $0000-$1FFF: 8KB CHR-ROM or CHR-RAM

use super::{chr_memory, restore_ram, MapperState, PRG_RAM_SIZE};
use crate::cartridge::{Cartridge, Mapper, Mirroring};

/// NROM board
pub struct Mapper0 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr_mem: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Mapper0 {
    pub fn new(mut cartridge: Cartridge) -> Self {
        let (chr_mem, chr_is_ram) = chr_memory(&mut cartridge);
        Mapper0 {
            prg_rom: cartridge.prg_rom,
            prg_ram: vec![0; PRG_RAM_SIZE],
            chr_mem,
            chr_is_ram,
            mirroring: cartridge.mirroring,
        }
    }
}

impl Mapper for Mapper0 {
    fn mapper_number(&self) -> u8 {
        0
    }

    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x6000..=0x7FFF => self.prg_ram[(address - 0x6000) as usize],
            // Modulo mirrors a 16KB image into $C000-$FFFF
            0x8000..=0xFFFF => self.prg_rom[(address - 0x8000) as usize % self.prg_rom.len()],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        if let 0x6000..=0x7FFF = address {
            self.prg_ram[(address - 0x6000) as usize] = value;
        }
    }

    fn chr_read(&self, address: u16) -> u8 {
        self.chr_mem[(address & 0x1FFF) as usize % self.chr_mem.len()]
    }

    fn chr_write(&mut self, address: u16, value: u8) {
        if self.chr_is_ram {
            self.chr_mem[(address & 0x1FFF) as usize] = value;
        }
    }

    fn mirroring_mode(&self) -> Mirroring {
        self.mirroring
    }

    fn rom_sizes(&self) -> (usize, usize) {
        (self.prg_rom.len(), if self.chr_is_ram { 0 } else { self.chr_mem.len() })
    }

    fn save_state(&self) -> MapperState {
        MapperState::Nrom {
            prg_ram: self.prg_ram.clone(),
            chr_ram: if self.chr_is_ram {
                self.chr_mem.clone()
            } else {
                Vec::new()
            },
        }
    }

    fn load_state(&mut self, state: &MapperState) -> bool {
        let MapperState::Nrom { prg_ram, chr_ram } = state else {
            return false;
        };
        if self.chr_is_ram && chr_ram.len() != self.chr_mem.len() {
            return false;
        }
        if !restore_ram(&mut self.prg_ram, prg_ram) {
            return false;
        }
        if self.chr_is_ram {
            self.chr_mem.copy_from_slice(chr_ram);
        }
        true
    }
}
