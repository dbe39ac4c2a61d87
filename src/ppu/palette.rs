// NES master palette
//
// The PPU outputs 6-bit color indices ($00-$3F). The 2C02 produces a
// composite signal; here each index maps straight to an RGB triple.
//
// Indices $0E-$0F, $1E-$1F, $2E-$2F, $3E-$3F are unused and render as black.

/// NES master palette in RGB format (64 colors), each entry 0xRRGGBB
pub const NES_PALETTE: [u32; 64] = [
    // $00-$0F
    0x666666, 0x002A88, 0x1412A7, 0x3B00A4, 0x5C007E, 0x6E0040, 0x6C0600, 0x561D00,
    0x333500, 0x0B4800, 0x005200, 0x004F08, 0x00404D, 0x000000, 0x000000, 0x000000,
    // $10-$1F
    0xADADAD, 0x155FD9, 0x4240FF, 0x7527FE, 0xA01ACC, 0xB71E7B, 0xB53120, 0x994E00,
    0x6B6D00, 0x388700, 0x0C9300, 0x008F32, 0x007C8D, 0x000000, 0x000000, 0x000000,
    // $20-$2F
    0xFFFEFF, 0x64B0FF, 0x9290FF, 0xC676FF, 0xF36AFF, 0xFE6ECC, 0xFE8170, 0xEA9E22,
    0xBCBE00, 0x88D800, 0x5CE430, 0x45E082, 0x48CDDE, 0x4F4F4F, 0x000000, 0x000000,
    // $30-$3F
    0xFFFEFF, 0xC0DFFF, 0xD3D2FF, 0xE8C8FF, 0xFBC2FF, 0xFEC4EA, 0xFECCC5, 0xF7D8A5,
    0xE4E594, 0xCFEF96, 0xBDF4AB, 0xB3F3CC, 0xB5EBF2, 0xB8B8B8, 0x000000, 0x000000,
];

/// RGB bytes for a color index; bits 6-7 of the index are ignored
#[inline]
pub fn rgb(index: u8) -> [u8; 3] {
    let color = NES_PALETTE[(index & 0x3F) as usize];
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

/// Palette RAM offset for an address in $3F00-$3FFF
///
/// $3F10/$3F14/$3F18/$3F1C are mirrors of $3F00/$3F04/$3F08/$3F0C: the
/// sprite palettes share their backdrop entries with the background.
#[inline]
pub fn palette_ram_index(address: u16) -> usize {
    let index = (address & 0x1F) as usize;
    if index >= 0x10 && index % 4 == 0 {
        index - 0x10
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_lookup() {
        assert_eq!(rgb(0x00), [0x66, 0x66, 0x66]);
        assert_eq!(rgb(0x30), [0xFF, 0xFE, 0xFF]);
        assert_eq!(rgb(0x40), rgb(0x00), "only six bits select a color");
    }

    #[test]
    fn test_palette_mirrors() {
        assert_eq!(palette_ram_index(0x3F10), 0x00);
        assert_eq!(palette_ram_index(0x3F14), 0x04);
        assert_eq!(palette_ram_index(0x3F1C), 0x0C);
        assert_eq!(palette_ram_index(0x3F11), 0x11);
        assert_eq!(palette_ram_index(0x3F3F), 0x1F, "$3F20-$3FFF repeat");
    }
}
