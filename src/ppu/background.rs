// Background pipeline
//
// Tile data is fetched two tiles ahead of the pixel being drawn. Every 8 dots
// the PPU reads a nametable byte, an attribute byte and two pattern bytes
// (two dots each), then reloads the low half of the 16-bit shift registers.
// Pixels come out of bit 15 - fine_x, one shift per dot.
//
// Loopy v layout:
// ```text
// yyy NN YYYYY XXXXX
// ||| || ||||| +++++-- coarse X scroll
// ||| || +++++-------- coarse Y scroll
// ||| ++-------------- nametable select
// +++----------------- fine Y scroll
// ```

use super::constants::{ATTRIBUTE_TABLE_BASE, NAMETABLE_BASE, PRERENDER_SCANLINE};
use super::registers::PpuCtrl;
use super::Ppu;
use crate::bus::MemoryMappedDevice;
use serde::{Deserialize, Serialize};

/// Fetch latches and shift registers of the background pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct BackgroundPipeline {
    // Latches filled by the 8-dot fetch sequence
    nametable: u8,
    attribute: u8,
    pattern_low: u8,
    pattern_high: u8,

    // Shift registers; the high byte is the tile being drawn
    pattern_shift_low: u16,
    pattern_shift_high: u16,
    attribute_shift_low: u16,
    attribute_shift_high: u16,
}

impl BackgroundPipeline {
    /// Move the latched tile into the low byte of the shift registers
    fn reload(&mut self) {
        self.pattern_shift_low = (self.pattern_shift_low & 0xFF00) | self.pattern_low as u16;
        self.pattern_shift_high = (self.pattern_shift_high & 0xFF00) | self.pattern_high as u16;

        let fill = |bit: u8| if self.attribute & bit != 0 { 0x00FF } else { 0x0000 };
        self.attribute_shift_low = (self.attribute_shift_low & 0xFF00) | fill(0x01);
        self.attribute_shift_high = (self.attribute_shift_high & 0xFF00) | fill(0x02);
    }

    fn shift(&mut self) {
        self.pattern_shift_low <<= 1;
        self.pattern_shift_high <<= 1;
        self.attribute_shift_low <<= 1;
        self.attribute_shift_high <<= 1;
    }

    /// Palette index (0-15) of the current pixel; 0 when transparent
    pub(super) fn pixel(&self, fine_x: u8) -> u8 {
        let bit = 15 - fine_x as u16;
        let pattern = (((self.pattern_shift_high >> bit) & 1) << 1) | ((self.pattern_shift_low >> bit) & 1);
        if pattern == 0 {
            return 0;
        }
        let palette =
            (((self.attribute_shift_high >> bit) & 1) << 1) | ((self.attribute_shift_low >> bit) & 1);
        ((palette << 2) | pattern) as u8
    }
}

impl Ppu {
    /// Background work for one dot of a visible or pre-render scanline
    pub(super) fn background_dot<M: MemoryMappedDevice + ?Sized>(&mut self, memory: &mut M) {
        let dot = self.dot;

        if matches!(dot, 2..=257 | 322..=337) {
            self.background.shift();
        }

        if matches!(dot, 1..=256 | 321..=337) {
            match (dot - 1) % 8 {
                0 => {
                    self.background.reload();
                    self.background.nametable = memory.read(self.nametable_address());
                }
                2 => {
                    let byte = memory.read(self.attribute_address());
                    // Each attribute byte covers 4x4 tiles; bits 1 of coarse X
                    // and coarse Y pick the 2x2 quadrant
                    let shift = ((self.v >> 4) & 0x04) | (self.v & 0x02);
                    self.background.attribute = (byte >> shift) & 0x03;
                }
                4 => {
                    self.background.pattern_low = memory.read(self.pattern_address());
                }
                6 => {
                    self.background.pattern_high = memory.read(self.pattern_address() + 8);
                }
                7 => self.increment_coarse_x(),
                _ => {}
            }
        }

        match dot {
            256 => self.increment_fine_y(),
            257 => {
                self.background.reload();
                self.copy_horizontal_bits();
            }
            280..=304 if self.scanline == PRERENDER_SCANLINE => self.copy_vertical_bits(),
            // Unused nametable fetches at the end of the line
            338 | 340 => {
                memory.read(self.nametable_address());
            }
            _ => {}
        }
    }

    fn nametable_address(&self) -> u16 {
        NAMETABLE_BASE | (self.v & 0x0FFF)
    }

    fn attribute_address(&self) -> u16 {
        ATTRIBUTE_TABLE_BASE | (self.v & 0x0C00) | ((self.v >> 4) & 0x38) | ((self.v >> 2) & 0x07)
    }

    /// Low pattern plane address of the latched tile at the current fine Y
    fn pattern_address(&self) -> u16 {
        let table = if self.ppuctrl.contains(PpuCtrl::BACKGROUND_TABLE) {
            0x1000
        } else {
            0x0000
        };
        let fine_y = (self.v >> 12) & 0x07;
        table + self.background.nametable as u16 * 16 + fine_y
    }

    // ========================================
    // Scroll increments
    // ========================================

    /// Coarse X increment, wrapping into the horizontally adjacent nametable
    pub(super) fn increment_coarse_x(&mut self) {
        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Fine Y increment with the coarse Y wrap at row 29
    pub(super) fn increment_fine_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }

        self.v &= !0x7000;
        let mut coarse_y = (self.v & 0x03E0) >> 5;
        match coarse_y {
            29 => {
                coarse_y = 0;
                self.v ^= 0x0800;
            }
            // Rows 30-31 hold attribute data; wrapping there does not
            // switch nametables
            31 => coarse_y = 0,
            _ => coarse_y += 1,
        }
        self.v = (self.v & !0x03E0) | (coarse_y << 5);
    }

    /// hori(v) = hori(t)
    fn copy_horizontal_bits(&mut self) {
        self.v = (self.v & !0x041F) | (self.t & 0x041F);
    }

    /// vert(v) = vert(t)
    fn copy_vertical_bits(&mut self) {
        self.v = (self.v & !0x7BE0) | (self.t & 0x7BE0);
    }
}
