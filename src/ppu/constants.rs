// PPU constants

/// PPU register address mask for mirroring
///
/// PPU registers are 8 bytes ($2000-$2007) but mirrored throughout $2000-$3FFF.
pub const PPU_REGISTER_MASK: u16 = 0x0007;

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Size of an RGB frame buffer in bytes
pub const FRAME_BUFFER_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 3;

/// Size of primary OAM (64 sprites x 4 bytes)
pub const OAM_SIZE: usize = 256;

/// Size of secondary OAM (8 sprites x 4 bytes)
pub const SECONDARY_OAM_SIZE: usize = 32;

/// Sprites the PPU can draw on one scanline
pub const MAX_SPRITES_PER_LINE: usize = 8;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================

/// Number of PPU dots per scanline
pub const DOTS_PER_SCANLINE: u16 = 341;

/// Last dot of a scanline
pub const LAST_DOT: u16 = DOTS_PER_SCANLINE - 1;

/// Number of scanlines per frame (NTSC)
pub const SCANLINES_PER_FRAME: u16 = 262;

/// Total PPU dots per frame (NTSC, even frame)
/// 341 dots/scanline × 262 scanlines = 89,342 dots
pub const DOTS_PER_FRAME: u32 = (DOTS_PER_SCANLINE as u32) * (SCANLINES_PER_FRAME as u32);

/// Last visible scanline
pub const LAST_VISIBLE_SCANLINE: u16 = 239;

/// Post-render scanline; reaching it completes a frame
pub const POSTRENDER_SCANLINE: u16 = 240;

/// Scanline whose dot 1 sets the VBlank flag
pub const VBLANK_SCANLINE: u16 = 241;

/// Pre-render scanline
/// This is scanline 261 (or -1 in some documentation)
pub const PRERENDER_SCANLINE: u16 = 261;

// ========================================
// PPU address space
// ========================================

/// First nametable address
pub const NAMETABLE_BASE: u16 = 0x2000;

/// First attribute table address
pub const ATTRIBUTE_TABLE_BASE: u16 = 0x23C0;

/// Palette RAM base ($3F00-$3F1F, mirrored to $3FFF)
pub const PALETTE_BASE: u16 = 0x3F00;

/// PPU address space is 14 bits wide
pub const PPU_ADDRESS_MASK: u16 = 0x3FFF;
