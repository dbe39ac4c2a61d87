// Cartridge module - iNES parsing and the mapper interface
//
// iNES layout:
//
// ```text
// 0-3:   "NES" followed by MS-DOS end-of-file ($4E $45 $53 $1A)
// 4:     PRG-ROM size in 16KB units
// 5:     CHR-ROM size in 8KB units (0 = board uses 8KB CHR-RAM)
// 6:     Flags 6 - mirroring, battery, trainer, four-screen, mapper low nibble
// 7:     Flags 7 - mapper high nibble
// 8-15:  Reserved / iNES 2.0 extensions (ignored)
// [512]: Trainer, present when flags 6 bit 2 is set
// PRG-ROM data, then CHR-ROM data
// ```

pub mod mappers;

pub use mappers::{create_mapper, MapperState};

use std::fmt;

/// Size of the iNES header in bytes
pub const INES_HEADER_SIZE: usize = 16;

/// Size of the optional trainer block
pub const TRAINER_SIZE: usize = 512;

/// PRG-ROM unit (16KB)
pub const PRG_ROM_BANK_SIZE: usize = 16 * 1024;

/// CHR-ROM unit (8KB)
pub const CHR_ROM_BANK_SIZE: usize = 8 * 1024;

const INES_SIGNATURE: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

/// Nametable mirroring arrangement
///
/// Selects which of the two physical 1KB nametables each of the four logical
/// nametables ($2000, $2400, $2800, $2C00) maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Mirroring {
    /// $2000/$2400 share table A, $2800/$2C00 share table B
    Horizontal,
    /// $2000/$2800 share table A, $2400/$2C00 share table B
    Vertical,
    /// All four logical nametables use table A
    SingleScreenLower,
    /// All four logical nametables use table B
    SingleScreenUpper,
}

impl Mirroring {
    /// Map a nametable address ($2000-$3EFF) to an offset into 2KB of VRAM
    pub fn vram_offset(self, address: u16) -> usize {
        let address = (address & 0x0FFF) as usize;
        let table = address / 0x400;
        let offset = address % 0x400;

        let physical = match self {
            Mirroring::Horizontal => table / 2,
            Mirroring::Vertical => table % 2,
            Mirroring::SingleScreenLower => 0,
            Mirroring::SingleScreenUpper => 1,
        };

        physical * 0x400 + offset
    }
}

// ========================================
// Errors
// ========================================

/// The ROM image is not a well-formed iNES file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The first four bytes are not "NES\x1A"
    MissingSignature,
    /// Fewer than 16 bytes were supplied
    TruncatedHeader { length: usize },
    /// The header's declared sizes disagree with the buffer length
    SizeMismatch { expected: usize, actual: usize },
    /// The header declares zero PRG-ROM banks
    NoPrgRom,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::MissingSignature => write!(f, "missing iNES signature"),
            FormatError::TruncatedHeader { length } => {
                write!(f, "image is {} bytes, shorter than the iNES header", length)
            }
            FormatError::SizeMismatch { expected, actual } => write!(
                f,
                "header declares {} bytes of data but image has {}",
                expected, actual
            ),
            FormatError::NoPrgRom => write!(f, "header declares no PRG-ROM"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Error returned when a ROM image cannot become the active cartridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    /// Malformed iNES image
    Format(FormatError),
    /// Mapper number outside {0, 1, 2}
    UnsupportedMapper(u8),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::Format(e) => write!(f, "Invalid ROM image: {}", e),
            CartridgeError::UnsupportedMapper(n) => write!(f, "Mapper {} is not supported", n),
        }
    }
}

impl std::error::Error for CartridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CartridgeError::Format(e) => Some(e),
            CartridgeError::UnsupportedMapper(_) => None,
        }
    }
}

impl From<FormatError> for CartridgeError {
    fn from(e: FormatError) -> Self {
        CartridgeError::Format(e)
    }
}

// ========================================
// Cartridge image
// ========================================

/// A parsed iNES image
///
/// Holds the raw ROM banks and header fields; a [`Mapper`] built from it
/// via [`create_mapper`] is what the bus talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    /// PRG-ROM contents (multiple of 16KB)
    pub prg_rom: Vec<u8>,
    /// CHR-ROM contents (multiple of 8KB, empty when the board uses CHR-RAM)
    pub chr_rom: Vec<u8>,
    /// iNES mapper number
    pub mapper: u8,
    /// Hard-wired mirroring from flags 6
    pub mirroring: Mirroring,
    /// Battery-backed PRG-RAM flag
    pub has_battery: bool,
}

impl Cartridge {
    /// Parse an iNES image
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the signature is missing, the header is
    /// truncated, no PRG-ROM is declared, or the declared bank sizes do not
    /// add up to the buffer length.
    pub fn from_ines_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < INES_HEADER_SIZE {
            if bytes.len() >= 4 && bytes[..4] != INES_SIGNATURE {
                return Err(FormatError::MissingSignature);
            }
            return Err(FormatError::TruncatedHeader {
                length: bytes.len(),
            });
        }

        let header = &bytes[..INES_HEADER_SIZE];
        if header[..4] != INES_SIGNATURE {
            return Err(FormatError::MissingSignature);
        }

        let prg_size = header[4] as usize * PRG_ROM_BANK_SIZE;
        let chr_size = header[5] as usize * CHR_ROM_BANK_SIZE;
        if prg_size == 0 {
            return Err(FormatError::NoPrgRom);
        }

        let flags6 = header[6];
        let flags7 = header[7];
        let has_trainer = flags6 & 0x04 != 0;

        let prg_start = INES_HEADER_SIZE + if has_trainer { TRAINER_SIZE } else { 0 };
        let chr_start = prg_start + prg_size;
        let expected = chr_start + chr_size;
        if bytes.len() != expected {
            return Err(FormatError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        // Old dumps stamped text into bytes 7-15; the high nibble is garbage then
        let legacy_header = header[12..16].iter().any(|&b| b != 0);
        let mapper_high = if legacy_header { 0 } else { flags7 & 0xF0 };
        let mapper = mapper_high | (flags6 >> 4);

        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        Ok(Cartridge {
            prg_rom: bytes[prg_start..chr_start].to_vec(),
            chr_rom: bytes[chr_start..expected].to_vec(),
            mapper,
            mirroring,
            has_battery: flags6 & 0x02 != 0,
        })
    }

    /// Whether the board carries CHR-RAM instead of CHR-ROM
    pub fn uses_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }
}

// ========================================
// Mapper interface
// ========================================

/// Cartridge board logic
///
/// Address translation is a pure function of the address and the current
/// bank registers: reads never mutate mapper state.
pub trait Mapper {
    /// iNES mapper number of this board
    fn mapper_number(&self) -> u8;

    /// Read from CPU space ($4020-$FFFF)
    fn cpu_read(&self, address: u16) -> u8;

    /// Write to CPU space ($4020-$FFFF), including bank-select registers
    fn cpu_write(&mut self, address: u16, value: u8);

    /// Read pattern data ($0000-$1FFF)
    fn chr_read(&self, address: u16) -> u8;

    /// Write pattern data ($0000-$1FFF); ignored unless the board has CHR-RAM
    fn chr_write(&mut self, address: u16, value: u8);

    /// Current nametable arrangement
    fn mirroring_mode(&self) -> Mirroring;

    /// Level of the cartridge IRQ line
    fn irq_line(&self) -> bool {
        false
    }

    /// PRG-ROM and CHR-ROM sizes, used to match snapshots to cartridges
    fn rom_sizes(&self) -> (usize, usize);

    /// Capture bank registers and cartridge RAM
    fn save_state(&self) -> MapperState;

    /// Restore a state captured by [`Mapper::save_state`] on the same board
    ///
    /// Returns `false` (leaving the mapper untouched) when the state belongs
    /// to a different board type.
    fn load_state(&mut self, state: &MapperState) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ines_image(prg_banks: u8, chr_banks: u8, flags6: u8, flags7: u8) -> Vec<u8> {
        let mut image = vec![0x4E, 0x45, 0x53, 0x1A, prg_banks, chr_banks, flags6, flags7];
        image.resize(INES_HEADER_SIZE, 0);
        image.resize(
            INES_HEADER_SIZE
                + prg_banks as usize * PRG_ROM_BANK_SIZE
                + chr_banks as usize * CHR_ROM_BANK_SIZE,
            0xEA,
        );
        image
    }

    #[test]
    fn test_parse_nrom_header() {
        let cartridge = Cartridge::from_ines_bytes(&ines_image(2, 1, 0x01, 0x00)).unwrap();

        assert_eq!(cartridge.prg_rom.len(), 32 * 1024);
        assert_eq!(cartridge.chr_rom.len(), 8 * 1024);
        assert_eq!(cartridge.mapper, 0);
        assert_eq!(cartridge.mirroring, Mirroring::Vertical);
        assert!(!cartridge.uses_chr_ram());
    }

    #[test]
    fn test_mapper_number_from_both_nibbles() {
        let cartridge = Cartridge::from_ines_bytes(&ines_image(1, 0, 0x10, 0x40)).unwrap();
        assert_eq!(cartridge.mapper, 0x41);
        assert!(cartridge.uses_chr_ram());
        assert_eq!(cartridge.mirroring, Mirroring::Horizontal);
    }

    #[test]
    fn test_legacy_header_ignores_flags7() {
        let mut image = ines_image(1, 1, 0x20, 0x40);
        image[12..16].copy_from_slice(b"Dude");
        let cartridge = Cartridge::from_ines_bytes(&image).unwrap();
        assert_eq!(cartridge.mapper, 2);
    }

    #[test]
    fn test_trainer_is_skipped() {
        let mut image = ines_image(1, 1, 0x04, 0x00);
        let trainer = vec![0x55; TRAINER_SIZE];
        image.splice(INES_HEADER_SIZE..INES_HEADER_SIZE, trainer);

        let cartridge = Cartridge::from_ines_bytes(&image).unwrap();
        assert_eq!(cartridge.prg_rom[0], 0xEA, "PRG must start after the trainer");
    }

    #[test]
    fn test_missing_signature() {
        let mut image = ines_image(1, 1, 0, 0);
        image[3] = 0x00;
        assert_eq!(
            Cartridge::from_ines_bytes(&image),
            Err(FormatError::MissingSignature)
        );
    }

    #[test]
    fn test_truncated_header() {
        assert_eq!(
            Cartridge::from_ines_bytes(&[0x4E, 0x45, 0x53]),
            Err(FormatError::TruncatedHeader { length: 3 })
        );
    }

    #[test]
    fn test_size_mismatch() {
        let mut image = ines_image(1, 1, 0, 0);
        image.pop();
        assert!(matches!(
            Cartridge::from_ines_bytes(&image),
            Err(FormatError::SizeMismatch { .. })
        ));

        let mut image = ines_image(1, 1, 0, 0);
        image.push(0);
        assert!(matches!(
            Cartridge::from_ines_bytes(&image),
            Err(FormatError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_prg_is_rejected() {
        assert_eq!(
            Cartridge::from_ines_bytes(&ines_image(0, 1, 0, 0)),
            Err(FormatError::NoPrgRom)
        );
    }

    #[test]
    fn test_mirroring_offsets() {
        assert_eq!(Mirroring::Horizontal.vram_offset(0x2000), 0x000);
        assert_eq!(Mirroring::Horizontal.vram_offset(0x2400), 0x000);
        assert_eq!(Mirroring::Horizontal.vram_offset(0x2800), 0x400);
        assert_eq!(Mirroring::Horizontal.vram_offset(0x2C00), 0x400);

        assert_eq!(Mirroring::Vertical.vram_offset(0x2000), 0x000);
        assert_eq!(Mirroring::Vertical.vram_offset(0x2400), 0x400);
        assert_eq!(Mirroring::Vertical.vram_offset(0x2800), 0x000);
        assert_eq!(Mirroring::Vertical.vram_offset(0x2C05), 0x405);

        assert_eq!(Mirroring::SingleScreenLower.vram_offset(0x2C10), 0x010);
        assert_eq!(Mirroring::SingleScreenUpper.vram_offset(0x2010), 0x410);

        // $3000-$3EFF mirrors $2000-$2EFF
        assert_eq!(
            Mirroring::Vertical.vram_offset(0x3400),
            Mirroring::Vertical.vram_offset(0x2400)
        );
    }
}
