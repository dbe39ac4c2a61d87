// Mapper 2 (UxROM) - Switchable 16KB PRG bank, fixed last bank
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM
// - CPU $8000-$BFFF: 16KB switchable PRG-ROM bank
// - CPU $C000-$FFFF: 16KB fixed PRG-ROM bank (last bank)
// - PPU $0000-$1FFF: 8KB CHR-RAM (CHR-ROM if the header declares any)
//
// Bank Switching:
// - Any write to $8000-$FFFF selects the PRG-ROM bank for $8000-$BFFF

use super::{chr_memory, restore_ram, MapperState, PRG_RAM_SIZE};
use crate::cartridge::{Cartridge, Mapper, Mirroring};

const PRG_BANK_SIZE: usize = 16 * 1024;

/// UxROM board
pub struct Mapper2 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr_mem: Vec<u8>,
    chr_is_ram: bool,
    /// Bank mapped at $8000-$BFFF
    prg_bank: u8,
    prg_banks: usize,
    mirroring: Mirroring,
}

impl Mapper2 {
    pub fn new(mut cartridge: Cartridge) -> Self {
        let (chr_mem, chr_is_ram) = chr_memory(&mut cartridge);
        let prg_banks = (cartridge.prg_rom.len() / PRG_BANK_SIZE).max(1);

        Mapper2 {
            prg_rom: cartridge.prg_rom,
            prg_ram: vec![0; PRG_RAM_SIZE],
            chr_mem,
            chr_is_ram,
            prg_bank: 0,
            prg_banks,
            mirroring: cartridge.mirroring,
        }
    }

    fn map_prg_address(&self, address: u16) -> usize {
        let bank = match address {
            0x8000..=0xBFFF => self.prg_bank as usize % self.prg_banks,
            _ => self.prg_banks - 1,
        };
        bank * PRG_BANK_SIZE + (address & 0x3FFF) as usize
    }
}

impl Mapper for Mapper2 {
    fn mapper_number(&self) -> u8 {
        2
    }

    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x6000..=0x7FFF => self.prg_ram[(address - 0x6000) as usize],
            0x8000..=0xFFFF => self.prg_rom[self.map_prg_address(address)],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        match address {
            0x6000..=0x7FFF => self.prg_ram[(address - 0x6000) as usize] = value,
            0x8000..=0xFFFF => {
                self.prg_bank = value;
                tracing::trace!(bank = value, "UxROM bank select");
            }
            _ => {}
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
        MapperState::Uxrom {
            prg_bank: self.prg_bank,
            prg_ram: self.prg_ram.clone(),
            chr_ram: if self.chr_is_ram {
                self.chr_mem.clone()
            } else {
                Vec::new()
            },
        }
    }

    fn load_state(&mut self, state: &MapperState) -> bool {
        let MapperState::Uxrom {
            prg_bank,
            prg_ram,
            chr_ram,
        } = state
        else {
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
        self.prg_bank = *prg_bank;
        true
    }
}
