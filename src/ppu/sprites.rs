// Sprite evaluation and sprite output units
//
// Per visible scanline:
// - Dots 1-64: secondary OAM is cleared to $FF
// - Dots 65-256: primary OAM is scanned for sprites on the next scanline
//   (odd dots read, even dots write)
// - Dots 257-320: pattern data for up to eight sprites is fetched into the
//   output units, OAMADDR is held at 0
//
// Once secondary OAM is full, the scan keeps going with the diagonal
// n/m increment of the real hardware, so the overflow flag has the same
// false positives and negatives.

use super::constants::{LAST_VISIBLE_SCANLINE, MAX_SPRITES_PER_LINE, PRERENDER_SCANLINE};
use super::registers::{PpuCtrl, PpuStatus};
use super::Ppu;
use crate::bus::MemoryMappedDevice;
use serde::{Deserialize, Serialize};

// OAM attribute byte
const ATTR_PALETTE: u8 = 0x03;
const ATTR_BEHIND_BACKGROUND: u8 = 0x20;
const ATTR_FLIP_HORIZONTAL: u8 = 0x40;
const ATTR_FLIP_VERTICAL: u8 = 0x80;

/// Sprite evaluation progress for the current scanline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct SpriteEvaluation {
    /// OAM byte read on the previous odd dot
    oam_latch: u8,
    /// Next free byte of secondary OAM
    secondary_addr: u8,
    /// Copying the remaining bytes of an in-range sprite
    in_range: bool,
    /// All 64 sprites checked or overflow found
    done: bool,
    /// OAM sprite 0 was copied to slot 0 for the next scanline
    sprite_zero_next: bool,
}

/// One of the eight sprite output units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct SpriteUnit {
    x: u8,
    attributes: u8,
    /// Pattern bits with horizontal flip already applied; bit 7 is leftmost
    pattern_low: u8,
    pattern_high: u8,
}

/// Opaque sprite pixel at a screen column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct SpritePixel {
    /// Palette RAM index ($10-$1F)
    pub palette_index: u8,
    pub behind_background: bool,
    pub is_sprite_zero: bool,
}

impl Ppu {
    /// Sprite work for one dot of a visible or pre-render scanline
    pub(super) fn sprite_dot<M: MemoryMappedDevice + ?Sized>(&mut self, memory: &mut M) {
        let dot = self.dot;

        if self.scanline <= LAST_VISIBLE_SCANLINE {
            match dot {
                1..=64 => self.secondary_oam[((dot - 1) / 2) as usize] = 0xFF,
                65 => {
                    self.evaluation = SpriteEvaluation::default();
                    self.evaluation.oam_latch = self.oam[self.oam_addr as usize];
                }
                66..=256 if dot % 2 == 0 => self.evaluate_sprite_byte(),
                67..=255 => self.evaluation.oam_latch = self.oam[self.oam_addr as usize],
                _ => {}
            }
        }

        if dot == 257 {
            if self.scanline == PRERENDER_SCANLINE {
                self.sprite_count = 0;
                self.sprite_zero_on_line = false;
            } else {
                self.sprite_count =
                    ((self.evaluation.secondary_addr / 4) as usize).min(MAX_SPRITES_PER_LINE);
                self.sprite_zero_on_line = self.evaluation.sprite_zero_next;
            }
        }

        if (257..=320).contains(&dot) {
            self.oam_addr = 0;
            if self.scanline <= LAST_VISIBLE_SCANLINE {
                self.fetch_sprite(memory, ((dot - 257) / 8) as usize, (dot - 257) % 8);
            }
        }
    }

    fn sprite_height(&self) -> u16 {
        if self.ppuctrl.contains(PpuCtrl::SPRITE_SIZE) {
            16
        } else {
            8
        }
    }

    /// Even-dot half of sprite evaluation: act on the latched OAM byte
    fn evaluate_sprite_byte(&mut self) {
        let mut n = self.oam_addr >> 2;
        let mut m = self.oam_addr & 0x03;
        let value = self.evaluation.oam_latch;

        if self.evaluation.done {
            // Failed copies of OAM[n][0] until HBlank
            n = (n + 1) & 0x3F;
        } else {
            let scanline = self.scanline;
            let y = value as u16;
            if !self.evaluation.in_range && scanline >= y && scanline < y + self.sprite_height() {
                self.evaluation.in_range = true;
            }

            if self.dot == 66 {
                self.evaluation.sprite_zero_next = self.evaluation.in_range;
            }

            if (self.evaluation.secondary_addr as usize) < self.secondary_oam.len() {
                self.secondary_oam[self.evaluation.secondary_addr as usize] = value;

                if self.evaluation.in_range {
                    m += 1;
                    self.evaluation.secondary_addr += 1;
                    if m == 4 {
                        self.evaluation.in_range = false;
                        m = 0;
                        n = (n + 1) & 0x3F;
                        self.evaluation.done = n == 0;
                    }
                } else {
                    n = (n + 1) & 0x3F;
                    self.evaluation.done = n == 0;
                }
            } else if self.evaluation.in_range {
                self.ppustatus.insert(PpuStatus::SPRITE_OVERFLOW);
                self.evaluation.done = true;
            } else {
                // Hardware bug: m advances along with n
                n = (n + 1) & 0x3F;
                m = (m + 1) & 0x03;
                self.evaluation.done = n == 0;
            }
        }

        self.oam_addr = (n << 2) | m;
    }

    /// One dot of the 8-dot fetch for sprite `slot`
    fn fetch_sprite<M: MemoryMappedDevice + ?Sized>(&mut self, memory: &mut M, slot: usize, step: u16) {
        let base = slot * 4;
        let y = self.secondary_oam[base];
        let tile = self.secondary_oam[base + 1];
        let attributes = self.secondary_oam[base + 2];
        let x = self.secondary_oam[base + 3];
        let active = slot < self.sprite_count;

        let address = if active {
            self.sprite_pattern_address(y, tile, attributes)
        } else {
            // Empty slots still fetch tile $FF
            self.sprite_pattern_address(self.scanline as u8, 0xFF, 0)
        };

        match step {
            4 => {
                let low = memory.read(address);
                self.sprites[slot] = if active {
                    SpriteUnit {
                        x,
                        attributes,
                        pattern_low: flip_horizontal(low, attributes),
                        pattern_high: 0,
                    }
                } else {
                    SpriteUnit::default()
                };
            }
            6 => {
                let high = memory.read(address + 8);
                if active {
                    self.sprites[slot].pattern_high = flip_horizontal(high, attributes);
                }
            }
            _ => {}
        }
    }

    /// Low plane address of the sprite row drawn on the next scanline
    fn sprite_pattern_address(&self, y: u8, tile: u8, attributes: u8) -> u16 {
        let height = self.sprite_height();
        let mut row = self.scanline.wrapping_sub(y as u16) % height;
        if attributes & ATTR_FLIP_VERTICAL != 0 {
            row = height - 1 - row;
        }

        if height == 16 {
            let table = if tile & 0x01 != 0 { 0x1000 } else { 0x0000 };
            let mut tile = (tile & 0xFE) as u16;
            if row >= 8 {
                tile += 1;
                row -= 8;
            }
            table + tile * 16 + row
        } else {
            let table = if self.ppuctrl.contains(PpuCtrl::SPRITE_TABLE) {
                0x1000
            } else {
                0x0000
            };
            table + tile as u16 * 16 + row
        }
    }

    /// First opaque sprite covering column `x`, in OAM order
    pub(super) fn sprite_pixel(&self, x: u8) -> Option<SpritePixel> {
        self.sprites[..self.sprite_count]
            .iter()
            .enumerate()
            .find_map(|(slot, sprite)| {
                let offset = (x as u16).checked_sub(sprite.x as u16)?;
                if offset >= 8 {
                    return None;
                }
                let bit = 7 - offset;
                let pattern =
                    (((sprite.pattern_high >> bit) & 1) << 1) | ((sprite.pattern_low >> bit) & 1);
                if pattern == 0 {
                    return None;
                }
                Some(SpritePixel {
                    palette_index: 0x10 | ((sprite.attributes & ATTR_PALETTE) << 2) | pattern,
                    behind_background: sprite.attributes & ATTR_BEHIND_BACKGROUND != 0,
                    is_sprite_zero: slot == 0 && self.sprite_zero_on_line,
                })
            })
    }
}

fn flip_horizontal(pattern: u8, attributes: u8) -> u8 {
    if attributes & ATTR_FLIP_HORIZONTAL != 0 {
        pattern.reverse_bits()
    } else {
        pattern
    }
}
