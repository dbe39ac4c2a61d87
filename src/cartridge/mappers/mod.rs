// Mappers module - Board implementations and the mapper factory
//
// Supported boards:
// - 0: NROM  (fixed banks)
// - 1: SxROM (MMC1, serial bank registers)
// - 2: UxROM (switchable 16KB PRG bank, fixed last bank)

mod mapper0;
mod mapper1;
mod mapper2;

pub use mapper0::Mapper0;
pub use mapper1::Mapper1;
pub use mapper2::Mapper2;

use super::{Cartridge, CartridgeError, Mapper, CHR_ROM_BANK_SIZE};
use serde::{Deserialize, Serialize};

/// PRG-RAM window at $6000-$7FFF (8KB)
pub(crate) const PRG_RAM_SIZE: usize = 8 * 1024;

/// Serializable mapper registers and cartridge RAM
///
/// CHR-RAM is stored only for boards that have it (`chr_ram` is empty
/// otherwise); ROM contents are never part of the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapperState {
    Nrom {
        prg_ram: Vec<u8>,
        chr_ram: Vec<u8>,
    },
    Sxrom {
        shift_register: u8,
        write_count: u8,
        control: u8,
        chr_bank_0: u8,
        chr_bank_1: u8,
        prg_bank: u8,
        prg_ram: Vec<u8>,
        chr_ram: Vec<u8>,
    },
    Uxrom {
        prg_bank: u8,
        prg_ram: Vec<u8>,
        chr_ram: Vec<u8>,
    },
}

/// Build the mapper for a parsed cartridge
///
/// # Errors
///
/// Returns [`CartridgeError::UnsupportedMapper`] for any mapper number other
/// than 0, 1 or 2.
///
/// # Example
/// ```
/// use cyclenes::cartridge::{create_mapper, Cartridge, Mirroring};
///
/// let cartridge = Cartridge {
///     prg_rom: vec![0; 16 * 1024],
///     chr_rom: vec![0; 8 * 1024],
///     mapper: 0,
///     mirroring: Mirroring::Vertical,
///     has_battery: false,
/// };
/// let mapper = create_mapper(cartridge).unwrap();
/// assert_eq!(mapper.mapper_number(), 0);
/// ```
pub fn create_mapper(cartridge: Cartridge) -> Result<Box<dyn Mapper>, CartridgeError> {
    match cartridge.mapper {
        0 => Ok(Box::new(Mapper0::new(cartridge))),
        1 => Ok(Box::new(Mapper1::new(cartridge))),
        2 => Ok(Box::new(Mapper2::new(cartridge))),
        n => Err(CartridgeError::UnsupportedMapper(n)),
    }
}

/// CHR storage for a board: the ROM image, or 8KB of zeroed RAM
pub(crate) fn chr_memory(cartridge: &mut Cartridge) -> (Vec<u8>, bool) {
    if cartridge.uses_chr_ram() {
        (vec![0; CHR_ROM_BANK_SIZE], true)
    } else {
        (std::mem::take(&mut cartridge.chr_rom), false)
    }
}

/// Copy a saved RAM image back, refusing mismatched lengths
pub(crate) fn restore_ram(target: &mut [u8], saved: &[u8]) -> bool {
    if target.len() != saved.len() {
        return false;
    }
    target.copy_from_slice(saved);
    true
}
