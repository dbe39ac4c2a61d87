// PPU module - Dot-stepped 2C02 picture processing unit
//
// The PPU advances one dot per `tick`. Every memory access it makes (nametable,
// attribute, pattern and palette fetches) goes through the `MemoryMappedDevice`
// handed in by the bus, so the PPU never owns cartridge or VRAM storage.
//
// Frame layout (NTSC):
// - Scanlines 0-239: visible, background and sprite pipelines active
// - Scanline 240: post-render, the completed frame is published here
// - Scanlines 241-260: VBlank (flag set at 241:1)
// - Scanline 261: pre-render, flags cleared at dot 1, odd frames skip a dot

mod background;
pub mod constants;
pub mod palette;
mod registers;
mod sprites;

#[cfg(test)]
mod tests;

pub use constants::*;
pub use registers::{PpuCtrl, PpuMask, PpuStatus};

use crate::bus::MemoryMappedDevice;
use background::BackgroundPipeline;
use serde::{Deserialize, Serialize};
use sprites::{SpriteEvaluation, SpriteUnit};

fn blank_frame() -> Vec<u8> {
    vec![0; FRAME_BUFFER_SIZE]
}

/// PPU structure representing the Picture Processing Unit state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ppu {
    // ========================================
    // Memory-mapped registers
    // ========================================
    ppuctrl: PpuCtrl,
    ppumask: PpuMask,
    ppustatus: PpuStatus,
    oam_addr: u8,

    /// Value left on the PPU data bus by the last register access
    io_latch: u8,

    /// PPUDATA read buffer
    read_buffer: u8,

    // ========================================
    // Internal scroll registers (loopy v/t/x/w)
    // ========================================
    /// Current VRAM address (15 bits)
    v: u16,
    /// Temporary VRAM address (15 bits)
    t: u16,
    /// Fine X scroll (3 bits)
    fine_x: u8,
    /// First/second write toggle for PPUSCROLL and PPUADDR
    write_latch: bool,

    // ========================================
    // Timing
    // ========================================
    /// Scanline of the next dot to process (0-261)
    scanline: u16,
    /// Next dot to process (0-340)
    dot: u16,
    /// Completed frames
    frame: u64,
    odd_frame: bool,
    /// PPUSTATUS was read on the dot before VBlank
    suppress_vblank: bool,

    // ========================================
    // Rendering pipelines
    // ========================================
    oam: Vec<u8>,
    secondary_oam: [u8; SECONDARY_OAM_SIZE],
    background: BackgroundPipeline,
    evaluation: SpriteEvaluation,
    sprites: [SpriteUnit; MAX_SPRITES_PER_LINE],
    /// Sprites loaded for the current scanline
    sprite_count: usize,
    /// Slot 0 holds OAM sprite 0 on the current scanline
    sprite_zero_on_line: bool,

    // ========================================
    // Output
    // ========================================
    /// Frame being drawn
    #[serde(skip, default = "blank_frame")]
    work_buffer: Vec<u8>,
    /// Last completed frame
    #[serde(skip, default = "blank_frame")]
    frame_buffer: Vec<u8>,
}

impl Ppu {
    /// Create a PPU in its power-on state
    pub fn new() -> Self {
        Ppu {
            ppuctrl: PpuCtrl::empty(),
            ppumask: PpuMask::empty(),
            ppustatus: PpuStatus::empty(),
            oam_addr: 0,
            io_latch: 0,
            read_buffer: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            write_latch: false,
            scanline: 0,
            dot: 0,
            frame: 0,
            odd_frame: false,
            suppress_vblank: false,
            oam: vec![0; OAM_SIZE],
            secondary_oam: [0xFF; SECONDARY_OAM_SIZE],
            background: BackgroundPipeline::default(),
            evaluation: SpriteEvaluation::default(),
            sprites: [SpriteUnit::default(); MAX_SPRITES_PER_LINE],
            sprite_count: 0,
            sprite_zero_on_line: false,
            work_buffer: blank_frame(),
            frame_buffer: blank_frame(),
        }
    }

    /// Soft reset: PPUCTRL, PPUMASK and the write toggle clear; OAM, the
    /// dot counters and the frame buffers are kept
    pub fn reset(&mut self) {
        self.ppuctrl = PpuCtrl::empty();
        self.ppumask = PpuMask::empty();
        self.write_latch = false;
        self.read_buffer = 0;
        self.odd_frame = false;
    }

    /// Process one dot
    ///
    /// # Returns
    ///
    /// `true` when this dot completed a frame (the last visible scanline
    /// finished and the frame buffer was published)
    pub fn tick<M: MemoryMappedDevice + ?Sized>(&mut self, memory: &mut M) -> bool {
        let scanline = self.scanline;
        let dot = self.dot;
        let rendering = self.rendering_enabled();

        match scanline {
            0..=LAST_VISIBLE_SCANLINE | PRERENDER_SCANLINE => {
                if scanline == PRERENDER_SCANLINE && dot == 1 {
                    self.ppustatus.remove(
                        PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
                    );
                }

                if rendering {
                    self.background_dot(memory);
                    self.sprite_dot(memory);
                }

                if scanline <= LAST_VISIBLE_SCANLINE && (1..=256).contains(&dot) {
                    self.output_pixel(memory);
                }
            }
            VBLANK_SCANLINE if dot == 1 => {
                if !self.suppress_vblank {
                    self.ppustatus.insert(PpuStatus::VBLANK);
                }
                self.suppress_vblank = false;
            }
            _ => {}
        }

        self.advance(rendering)
    }

    /// Move to the next dot, applying the odd-frame skip
    fn advance(&mut self, rendering: bool) -> bool {
        if self.scanline == PRERENDER_SCANLINE && self.dot == LAST_DOT - 1 && rendering && self.odd_frame
        {
            // Odd frames with rendering on jump from 339 straight to 0:0
            self.dot = LAST_DOT;
        }

        self.dot += 1;
        if self.dot <= LAST_DOT {
            return false;
        }

        self.dot = 0;
        self.scanline += 1;
        match self.scanline {
            POSTRENDER_SCANLINE => {
                std::mem::swap(&mut self.work_buffer, &mut self.frame_buffer);
                self.frame += 1;
                true
            }
            SCANLINES_PER_FRAME => {
                self.scanline = 0;
                self.odd_frame = !self.odd_frame;
                false
            }
            _ => false,
        }
    }

    /// Compose and store the pixel for the current dot
    fn output_pixel<M: MemoryMappedDevice + ?Sized>(&mut self, memory: &mut M) {
        let x = (self.dot - 1) as usize;
        let y = self.scanline as usize;

        let palette_address = if self.rendering_enabled() {
            let background = if self.ppumask.contains(PpuMask::SHOW_BACKGROUND)
                && (x >= 8 || self.ppumask.contains(PpuMask::SHOW_BACKGROUND_LEFT))
            {
                self.background.pixel(self.fine_x)
            } else {
                0
            };

            let sprite = if self.ppumask.contains(PpuMask::SHOW_SPRITES)
                && (x >= 8 || self.ppumask.contains(PpuMask::SHOW_SPRITES_LEFT))
            {
                self.sprite_pixel(x as u8)
            } else {
                None
            };

            match sprite {
                Some(sprite) => {
                    if sprite.is_sprite_zero && background != 0 && x != 255 {
                        self.ppustatus.insert(PpuStatus::SPRITE_ZERO_HIT);
                    }
                    if !sprite.behind_background || background == 0 {
                        sprite.palette_index
                    } else {
                        background
                    }
                }
                None => background,
            }
        } else {
            0
        };

        let color = self.palette_color(memory, PALETTE_BASE | palette_address as u16);
        let offset = (y * SCREEN_WIDTH + x) * 3;
        self.work_buffer[offset..offset + 3].copy_from_slice(&palette::rgb(color));
    }

    /// Palette entry as displayed (greyscale applied)
    fn palette_color<M: MemoryMappedDevice + ?Sized>(&self, memory: &mut M, address: u16) -> u8 {
        let color = memory.read(address) & 0x3F;
        if self.ppumask.contains(PpuMask::GREYSCALE) {
            color & 0x30
        } else {
            color
        }
    }

    // ========================================
    // State queries
    // ========================================

    /// Background or sprite rendering is enabled in PPUMASK
    #[inline]
    pub fn rendering_enabled(&self) -> bool {
        self.ppumask
            .intersects(PpuMask::SHOW_BACKGROUND | PpuMask::SHOW_SPRITES)
    }

    /// Level of the NMI output: VBlank flag AND PPUCTRL NMI enable
    #[inline]
    pub fn nmi_line(&self) -> bool {
        self.ppustatus.contains(PpuStatus::VBLANK) && self.ppuctrl.contains(PpuCtrl::GENERATE_NMI)
    }

    /// Last completed frame, 256×240 packed RGB
    pub fn frame_buffer(&self) -> &[u8] {
        &self.frame_buffer
    }

    /// Scanline of the next dot (0-261)
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Next dot within the scanline (0-340)
    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Number of frames completed since power-on
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn ctrl(&self) -> PpuCtrl {
        self.ppuctrl
    }

    pub fn mask(&self) -> PpuMask {
        self.ppumask
    }

    pub fn status(&self) -> PpuStatus {
        self.ppustatus
    }

    /// Value a read of a write-only register would return
    pub fn io_latch(&self) -> u8 {
        self.io_latch
    }

    /// Current VRAM address (loopy v)
    pub fn vram_address(&self) -> u16 {
        self.v
    }

    /// Primary OAM contents
    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    /// Sprite data may be fetched this dot: rendering is on and the
    /// scanline is visible or pre-render
    fn rendering_active(&self) -> bool {
        self.rendering_enabled()
            && (self.scanline <= LAST_VISIBLE_SCANLINE || self.scanline == PRERENDER_SCANLINE)
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
