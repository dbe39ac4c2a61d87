//! PPU unit tests
//!
//! Tests drive the PPU against a flat 16KB address space instead of a full
//! bus, organized by functionality.

use super::*;

// ========================================
// Test Constants (PPU Register Addresses)
// ========================================

/// PPU Control Register ($2000) - Write only
pub(crate) const PPUCTRL: u16 = 0x2000;
/// PPU Mask Register ($2001) - Write only
pub(crate) const PPUMASK: u16 = 0x2001;
/// PPU Status Register ($2002) - Read only
pub(crate) const PPUSTATUS: u16 = 0x2002;
/// OAM Address Port ($2003) - Write only
pub(crate) const OAMADDR: u16 = 0x2003;
/// OAM Data Port ($2004) - Read/Write
pub(crate) const OAMDATA: u16 = 0x2004;
/// Scroll Position Register ($2005) - Write×2
pub(crate) const PPUSCROLL: u16 = 0x2005;
/// PPU Address Register ($2006) - Write×2
pub(crate) const PPUADDR: u16 = 0x2006;
/// PPU Data Port ($2007) - Read/Write
pub(crate) const PPUDATA: u16 = 0x2007;

// ========================================
// Test Helpers
// ========================================

/// Flat PPU address space: pattern tables and four nametables with no
/// mirroring, $3000-$3EFF mirroring $2000, palette mirrors applied
pub(crate) struct TestMemory {
    pub data: Vec<u8>,
    pub reads: usize,
}

impl TestMemory {
    pub fn new() -> Self {
        TestMemory {
            data: vec![0; 0x4000],
            reads: 0,
        }
    }

    fn index(addr: u16) -> usize {
        let addr = addr & PPU_ADDRESS_MASK;
        match addr {
            0x3000..=0x3EFF => (addr - 0x1000) as usize,
            0x3F00..=0x3FFF => PALETTE_BASE as usize + palette::palette_ram_index(addr),
            _ => addr as usize,
        }
    }
}

impl MemoryMappedDevice for TestMemory {
    fn read(&mut self, addr: u16) -> u8 {
        self.reads += 1;
        self.data[Self::index(addr)]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.data[Self::index(addr)] = data;
    }
}

pub(crate) fn write_reg(ppu: &mut Ppu, memory: &mut TestMemory, addr: u16, data: u8) {
    ppu.write_register(addr & PPU_REGISTER_MASK, data, memory);
}

pub(crate) fn read_reg(ppu: &mut Ppu, memory: &mut TestMemory, addr: u16) -> u8 {
    ppu.read_register(addr & PPU_REGISTER_MASK, memory)
}

/// Run dots; returns how many frames completed
pub(crate) fn run_dots(ppu: &mut Ppu, memory: &mut TestMemory, dots: u32) -> u32 {
    (0..dots).filter(|_| ppu.tick(memory)).count() as u32
}

/// Run until (scanline, dot) is the next dot to process
pub(crate) fn run_until(ppu: &mut Ppu, memory: &mut TestMemory, scanline: u16, dot: u16) {
    let mut guard = 0u32;
    while ppu.scanline() != scanline || ppu.dot() != dot {
        ppu.tick(memory);
        guard += 1;
        assert!(guard <= 2 * DOTS_PER_FRAME, "({scanline}, {dot}) never reached");
    }
}

/// Run until the next completed frame
pub(crate) fn run_frame(ppu: &mut Ppu, memory: &mut TestMemory) {
    let mut guard = 0u32;
    while !ppu.tick(memory) {
        guard += 1;
        assert!(guard <= DOTS_PER_FRAME, "frame never completed");
    }
}

/// Fill both planes of a pattern table tile with constant rows
pub(crate) fn fill_tile(memory: &mut TestMemory, tile_address: u16, low: u8, high: u8) {
    let base = tile_address as usize;
    memory.data[base..base + 8].fill(low);
    memory.data[base + 8..base + 16].fill(high);
}

/// RGB of a pixel in the last completed frame
pub(crate) fn pixel(ppu: &Ppu, x: usize, y: usize) -> [u8; 3] {
    let offset = (y * SCREEN_WIDTH + x) * 3;
    let frame = ppu.frame_buffer();
    [frame[offset], frame[offset + 1], frame[offset + 2]]
}

// ========================================
// Test Modules
// ========================================

mod timing;
