// PPU register handling

use super::constants::{PALETTE_BASE, PPU_ADDRESS_MASK, VBLANK_SCANLINE};
use super::Ppu;
use crate::bus::MemoryMappedDevice;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// PPUCTRL ($2000)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PpuCtrl: u8 {
        const NAMETABLE_X = 0x01;
        const NAMETABLE_Y = 0x02;
        /// 0 = add 1 (across), 1 = add 32 (down)
        const VRAM_INCREMENT = 0x04;
        /// Sprite pattern table for 8x8 sprites: 0 = $0000, 1 = $1000
        const SPRITE_TABLE = 0x08;
        /// Background pattern table: 0 = $0000, 1 = $1000
        const BACKGROUND_TABLE = 0x10;
        /// 0 = 8x8, 1 = 8x16
        const SPRITE_SIZE = 0x20;
        const MASTER_SLAVE = 0x40;
        /// Generate an NMI at the start of VBlank
        const GENERATE_NMI = 0x80;
    }
}

bitflags! {
    /// PPUMASK ($2001)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PpuMask: u8 {
        const GREYSCALE = 0x01;
        const SHOW_BACKGROUND_LEFT = 0x02;
        const SHOW_SPRITES_LEFT = 0x04;
        const SHOW_BACKGROUND = 0x08;
        const SHOW_SPRITES = 0x10;
        const EMPHASIZE_RED = 0x20;
        const EMPHASIZE_GREEN = 0x40;
        const EMPHASIZE_BLUE = 0x80;
    }
}

bitflags! {
    /// PPUSTATUS ($2002); the low 5 bits read back as open bus
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PpuStatus: u8 {
        const SPRITE_OVERFLOW = 0x20;
        const SPRITE_ZERO_HIT = 0x40;
        const VBLANK = 0x80;
    }
}

impl Ppu {
    /// Read from a PPU register
    ///
    /// # Arguments
    ///
    /// * `register` - The register number (0-7)
    /// * `memory` - PPU address space, used by PPUDATA
    ///
    /// # Register Behaviors
    ///
    /// - PPUSTATUS ($2002): Status in bits 5-7, clears VBlank and the write toggle
    /// - OAMDATA ($2004): OAM at the current OAM address
    /// - PPUDATA ($2007): Buffered PPU data (palette reads are immediate)
    /// - Write-only registers: The I/O latch
    pub fn read_register<M: MemoryMappedDevice + ?Sized>(
        &mut self,
        register: u16,
        memory: &mut M,
    ) -> u8 {
        let value = match register {
            2 => {
                let value = self.ppustatus.bits() | (self.io_latch & 0x1F);
                self.ppustatus.remove(PpuStatus::VBLANK);
                self.write_latch = false;

                // Reading one dot before VBlank starts hides the flag and the
                // NMI for the whole frame
                if self.scanline == VBLANK_SCANLINE && self.dot == 1 {
                    self.suppress_vblank = true;
                }
                value
            }
            4 => {
                let value = self.oam[self.oam_addr as usize];
                // Attribute bytes have no storage for bits 2-4
                if self.oam_addr & 0x03 == 0x02 {
                    value & 0xE3
                } else {
                    value
                }
            }
            7 => {
                let addr = self.v & PPU_ADDRESS_MASK;
                let value = if addr >= PALETTE_BASE {
                    // Palette reads are immediate; the buffer takes the
                    // nametable byte underneath
                    let color = self.palette_color(memory, addr);
                    self.read_buffer = memory.read(addr & 0x2FFF);
                    color | (self.io_latch & 0xC0)
                } else {
                    let buffered = self.read_buffer;
                    self.read_buffer = memory.read(addr);
                    buffered
                };
                self.increment_vram_address();
                value
            }
            _ => self.io_latch,
        };

        self.io_latch = value;
        value
    }

    /// Write to a PPU register
    ///
    /// # Arguments
    ///
    /// * `register` - The register number (0-7)
    /// * `data` - The value to write
    /// * `memory` - PPU address space, used by PPUDATA
    pub fn write_register<M: MemoryMappedDevice + ?Sized>(
        &mut self,
        register: u16,
        data: u8,
        memory: &mut M,
    ) {
        self.io_latch = data;

        match register {
            0 => {
                self.ppuctrl = PpuCtrl::from_bits_retain(data);
                // t: ...GH.. ........ <- d: ......GH
                self.t = (self.t & 0xF3FF) | (((data as u16) & 0x03) << 10);
            }
            1 => {
                self.ppumask = PpuMask::from_bits_retain(data);
            }
            2 => {
                // PPUSTATUS is read-only
            }
            3 => {
                self.oam_addr = data;
            }
            4 => {
                // OAM is busy with sprite evaluation while rendering
                if !self.rendering_active() {
                    self.oam[self.oam_addr as usize] = data;
                    self.oam_addr = self.oam_addr.wrapping_add(1);
                }
            }
            5 => {
                if !self.write_latch {
                    // t: ....... ...ABCDE <- d: ABCDEFGH
                    // x:              FGH <- d: ABCDEFGH
                    self.t = (self.t & 0xFFE0) | ((data as u16) >> 3);
                    self.fine_x = data & 0x07;
                } else {
                    // t: FGH..AB CDE..... <- d: ABCDEFGH
                    self.t = (self.t & 0x8FFF) | (((data as u16) & 0x07) << 12);
                    self.t = (self.t & 0xFC1F) | (((data as u16) & 0xF8) << 2);
                }
                self.write_latch = !self.write_latch;
            }
            6 => {
                if !self.write_latch {
                    // t: .CDEFGH ........ <- d: ..CDEFGH
                    // t: X...... ........ <- 0
                    self.t = (self.t & 0x80FF) | (((data as u16) & 0x3F) << 8);
                } else {
                    // t: ....... ABCDEFGH <- d: ABCDEFGH
                    // v: <...all bits...> <- t: <...all bits...>
                    self.t = (self.t & 0xFF00) | (data as u16);
                    self.v = self.t;
                }
                self.write_latch = !self.write_latch;
            }
            7 => {
                memory.write(self.v & PPU_ADDRESS_MASK, data);
                self.increment_vram_address();
            }
            _ => {}
        }
    }

    /// Step v by 1 or 32 after a PPUDATA access
    fn increment_vram_address(&mut self) {
        let increment = if self.ppuctrl.contains(PpuCtrl::VRAM_INCREMENT) {
            32
        } else {
            1
        };
        self.v = self.v.wrapping_add(increment) & PPU_ADDRESS_MASK;
    }
}
