//! PPU Timing Tests
//!
//! Tests for dot-accurate PPU timing including:
//! - Dot and scanline tracking
//! - Frame completion
//! - VBlank flag timing and NMI line
//! - Odd/even frame behavior

use super::*;

#[test]
fn test_ppu_dot_tracking() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();

    assert_eq!(ppu.scanline(), 0, "PPU should start at scanline 0");
    assert_eq!(ppu.dot(), 0, "PPU should start at dot 0");
    assert_eq!(ppu.frame_count(), 0, "PPU should start at frame 0");

    ppu.tick(&mut memory);
    assert_eq!(ppu.dot(), 1, "Dot should advance to 1");
    assert_eq!(ppu.scanline(), 0, "Scanline should remain 0");
}

#[test]
fn test_ppu_scanline_advancement() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();

    run_dots(&mut ppu, &mut memory, DOTS_PER_SCANLINE as u32);

    assert_eq!(ppu.scanline(), 1, "Scanline should advance to 1");
    assert_eq!(ppu.dot(), 0, "Dot should reset to 0");
}

#[test]
fn test_frame_completes_at_postrender_line() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();

    let mut dots = 0u32;
    while !ppu.tick(&mut memory) {
        dots += 1;
    }
    dots += 1;

    assert_eq!(dots, 240 * DOTS_PER_SCANLINE as u32, "Frame completes entering scanline 240");
    assert_eq!(ppu.scanline(), POSTRENDER_SCANLINE);
    assert_eq!(ppu.dot(), 0);
    assert_eq!(ppu.frame_count(), 1, "Counted when the frame is published");
}

#[test]
fn test_frame_is_89342_dots_with_rendering_off() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();

    run_dots(&mut ppu, &mut memory, DOTS_PER_FRAME);
    assert_eq!((ppu.scanline(), ppu.dot()), (0, 0), "Back at the start after one frame");
    assert_eq!(ppu.frame_count(), 1);

    // Odd frame, rendering still off: no skipped dot
    run_dots(&mut ppu, &mut memory, DOTS_PER_FRAME);
    assert_eq!((ppu.scanline(), ppu.dot()), (0, 0));
    assert_eq!(ppu.frame_count(), 2);
}

#[test]
fn test_odd_frame_skips_a_dot_with_rendering() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();
    write_reg(&mut ppu, &mut memory, PPUMASK, 0x08);

    // Even frame: full length
    run_dots(&mut ppu, &mut memory, DOTS_PER_FRAME);
    assert_eq!((ppu.scanline(), ppu.dot()), (0, 0));

    // Odd frame: one dot shorter, so it wraps early
    run_dots(&mut ppu, &mut memory, DOTS_PER_FRAME - 1);
    assert_eq!((ppu.scanline(), ppu.dot()), (0, 0), "Odd frame should be 89341 dots");
    assert_eq!(ppu.frame_count(), 2);
}

#[test]
fn test_vblank_flag_set_at_241_1() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();

    run_until(&mut ppu, &mut memory, VBLANK_SCANLINE, 1);
    assert!(!ppu.status().contains(PpuStatus::VBLANK), "Not yet set before 241:1");

    ppu.tick(&mut memory);
    assert!(ppu.status().contains(PpuStatus::VBLANK), "Set by dot 241:1");
}

#[test]
fn test_vblank_cleared_at_prerender_dot_1() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();

    run_until(&mut ppu, &mut memory, PRERENDER_SCANLINE, 1);
    assert!(ppu.status().contains(PpuStatus::VBLANK));

    ppu.tick(&mut memory);
    assert!(!ppu.status().contains(PpuStatus::VBLANK), "Cleared by dot 261:1");
}

#[test]
fn test_nmi_line_follows_vblank_and_enable() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();

    run_until(&mut ppu, &mut memory, VBLANK_SCANLINE, 2);
    assert!(!ppu.nmi_line(), "NMI disabled in PPUCTRL");

    write_reg(&mut ppu, &mut memory, PPUCTRL, 0x80);
    assert!(ppu.nmi_line(), "Enabling NMI during VBlank raises the line");

    write_reg(&mut ppu, &mut memory, PPUCTRL, 0x00);
    assert!(!ppu.nmi_line());

    write_reg(&mut ppu, &mut memory, PPUCTRL, 0x80);
    read_reg(&mut ppu, &mut memory, PPUSTATUS);
    assert!(!ppu.nmi_line(), "Reading PPUSTATUS clears VBlank and the line");
}

#[test]
fn test_status_read_just_before_vblank_suppresses_flag() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();
    write_reg(&mut ppu, &mut memory, PPUCTRL, 0x80);

    run_until(&mut ppu, &mut memory, VBLANK_SCANLINE, 1);
    let status = read_reg(&mut ppu, &mut memory, PPUSTATUS);
    assert_eq!(status & 0x80, 0, "Flag not set yet");

    ppu.tick(&mut memory);
    assert!(!ppu.status().contains(PpuStatus::VBLANK), "Flag suppressed for this frame");
    assert!(!ppu.nmi_line(), "No NMI this frame");

    // The next frame is unaffected
    run_until(&mut ppu, &mut memory, PRERENDER_SCANLINE, 0);
    run_until(&mut ppu, &mut memory, VBLANK_SCANLINE, 2);
    assert!(ppu.status().contains(PpuStatus::VBLANK));
}

#[test]
fn test_status_read_on_vblank_dot_sees_flag() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();

    run_until(&mut ppu, &mut memory, VBLANK_SCANLINE, 2);
    let status = read_reg(&mut ppu, &mut memory, PPUSTATUS);
    assert_eq!(status & 0x80, 0x80, "Flag visible after 241:1");
    assert!(!ppu.status().contains(PpuStatus::VBLANK), "Read clears the flag");
}

#[test]
fn test_frame_buffer_published_each_frame() {
    let mut ppu = Ppu::new();
    let mut memory = TestMemory::new();
    // Backdrop color $21
    memory.data[0x3F00] = 0x21;

    run_frame(&mut ppu, &mut memory);
    assert_eq!(pixel(&ppu, 0, 0), palette::rgb(0x21));
    assert_eq!(pixel(&ppu, 255, 239), palette::rgb(0x21));
}
