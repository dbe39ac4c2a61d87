// Driver integration tests
//
// Synthetic programs run through `Emulator::step_cycle`, exercising the CPU,
// bus, PPU, controller and mappers together.

mod common;

use common::{emulator_with, run_until_pc, RomBuilder, CHR_BANK_SIZE};
use cyclenes::emulator::Snapshot;
use cyclenes::ppu::{Ppu, PpuStatus};
use cyclenes::{CartridgeError, Emulator, FormatError};

const MAX_CYCLES: u64 = 100_000;

/// INC $10; JMP $C000
const COUNTER_LOOP: [u8; 5] = [0xE6, 0x10, 0x4C, 0x00, 0xC0];

#[test]
fn test_reload_reproduces_power_on_state() {
    let rom_a = RomBuilder::new().program(&COUNTER_LOOP);
    let rom_b = RomBuilder::new()
        .mapper(2)
        .prg_banks(4)
        .program(&[0xA9, 0x01, 0x8D, 0x00, 0x80, 0x4C, 0x05, 0xC0]);

    let mut emulator = emulator_with(&rom_a);
    let cpu = emulator.cpu().clone();
    let bus = serde_json::to_string(&emulator.bus().save_state()).expect("Failed to serialize");

    emulator.step_frame(0);
    emulator.step_frame(0);
    emulator.load_rom(&rom_b.build()).expect("Failed to load ROM B");
    emulator.step_frame(0);
    emulator.load_rom(&rom_a.build()).expect("Failed to reload ROM A");

    assert_eq!(emulator.cpu(), &cpu, "CPU back at power-on");
    assert_eq!(
        serde_json::to_string(&emulator.bus().save_state()).expect("Failed to serialize"),
        bus,
        "RAM, PPU, controller and mapper back at power-on"
    );
    assert_eq!(emulator.total_cycles(), 0);
    assert_eq!(emulator.video_frame(), Ppu::new().frame_buffer());
}

#[test]
fn test_runs_are_deterministic() {
    let rom = RomBuilder::new().program(&COUNTER_LOOP);
    let mut first = emulator_with(&rom);
    let mut second = emulator_with(&rom);

    for _ in 0..3 {
        first.step_frame(0x01);
        second.step_frame(0x01);
    }

    assert_eq!(first.cpu(), second.cpu());
    assert_eq!(first.bus().ram(), second.bus().ram());
    assert_eq!(first.video_frame(), second.video_frame());
}

#[test]
fn test_failed_load_keeps_running_cartridge() {
    let mut emulator = emulator_with(&RomBuilder::new().program(&COUNTER_LOOP));
    emulator.step_frame(0);
    let counter = emulator.bus().ram()[0x10];

    let mut bad = RomBuilder::new().build();
    bad.pop();
    assert!(matches!(
        emulator.load_rom(&bad),
        Err(CartridgeError::Format(FormatError::SizeMismatch { .. }))
    ));
    assert!(matches!(
        emulator.load_rom(&RomBuilder::new().mapper(4).build()),
        Err(CartridgeError::UnsupportedMapper(4))
    ));

    assert_eq!(emulator.bus().ram()[0x10], counter);
    emulator.step_frame(0);
    assert_ne!(emulator.bus().ram()[0x10], counter, "Old cartridge still runs");
}

#[test]
fn test_mmc1_prg_bank_switch_from_cpu() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x02,       // C000 LDA #$02
        0x8D, 0x00, 0xE0, // C002 STA $E000
        0x4A,             // C005 LSR A
        0x8D, 0x00, 0xE0, // C006 STA $E000
        0x4A,             // C009 LSR A
        0x8D, 0x00, 0xE0, // C00A STA $E000
        0x8D, 0x00, 0xE0, // C00D STA $E000
        0x8D, 0x00, 0xE0, // C010 STA $E000 (commit PRG bank 2)
        0xAD, 0x00, 0x80, // C013 LDA $8000
        0x85, 0x00,       // C016 STA $00
        0x4C, 0x18, 0xC0, // C018 JMP $C018
    ];
    let rom = RomBuilder::new().mapper(1).prg_banks(4).program(&program);
    let mut emulator = emulator_with(&rom);

    run_until_pc(&mut emulator, 0xC018, 0, MAX_CYCLES);
    assert_eq!(emulator.bus().ram()[0x00], 2, "$8000 now maps PRG bank 2");
}

#[test]
fn test_mmc1_reset_write_restarts_shift() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x01,       // C000 LDA #$01
        0x8D, 0x00, 0xE0, // C002 STA $E000 (one stray bit)
        0xA9, 0x80,       // C005 LDA #$80
        0x8D, 0x00, 0xE0, // C007 STA $E000 (reset shift register)
        0xA9, 0x01,       // C00A LDA #$01
        0x8D, 0x00, 0xE0, // C00C STA $E000
        0x4A,             // C00F LSR A
        0x8D, 0x00, 0xE0, // C010 STA $E000
        0x8D, 0x00, 0xE0, // C013 STA $E000
        0x8D, 0x00, 0xE0, // C016 STA $E000
        0x8D, 0x00, 0xE0, // C019 STA $E000 (commit PRG bank 1)
        0xAD, 0x00, 0x80, // C01C LDA $8000
        0x85, 0x00,       // C01F STA $00
        0x4C, 0x21, 0xC0, // C021 JMP $C021
    ];
    let rom = RomBuilder::new().mapper(1).prg_banks(4).program(&program);
    let mut emulator = emulator_with(&rom);

    run_until_pc(&mut emulator, 0xC021, 0, MAX_CYCLES);
    assert_eq!(emulator.bus().ram()[0x00], 1);
}

#[test]
fn test_uxrom_bank_select_from_cpu() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x01,       // C000 LDA #$01
        0x8D, 0x00, 0x80, // C002 STA $8000
        0xAD, 0x00, 0x80, // C005 LDA $8000
        0x85, 0x00,       // C008 STA $00
        0xAD, 0x00, 0xC0, // C00A LDA $C000 (fixed last bank)
        0x85, 0x01,       // C00D STA $01
        0x4C, 0x0F, 0xC0, // C00F JMP $C00F
    ];
    let rom = RomBuilder::new()
        .mapper(2)
        .prg_banks(4)
        .chr_banks(0)
        .program(&program);
    let mut emulator = emulator_with(&rom);

    run_until_pc(&mut emulator, 0xC00F, 0, MAX_CYCLES);
    assert_eq!(emulator.bus().ram()[0x00], 1);
    assert_eq!(emulator.bus().ram()[0x01], 0xA9);
}

#[rustfmt::skip]
const CHR_ROUND_TRIP: [u8; 32] = [
    0xA9, 0x00,       // C000 LDA #$00
    0x8D, 0x06, 0x20, // C002 STA $2006
    0x8D, 0x06, 0x20, // C005 STA $2006
    0xA9, 0x5A,       // C008 LDA #$5A
    0x8D, 0x07, 0x20, // C00A STA $2007
    0xA9, 0x00,       // C00D LDA #$00
    0x8D, 0x06, 0x20, // C00F STA $2006
    0x8D, 0x06, 0x20, // C012 STA $2006
    0xAD, 0x07, 0x20, // C015 LDA $2007 (fills the read buffer)
    0xAD, 0x07, 0x20, // C018 LDA $2007
    0x85, 0x00,       // C01B STA $00
    0x4C, 0x1D, 0xC0, // C01D JMP $C01D
];

#[test]
fn test_chr_ram_written_through_ppudata() {
    let rom = RomBuilder::new().chr_banks(0).program(&CHR_ROUND_TRIP);
    let mut emulator = emulator_with(&rom);

    run_until_pc(&mut emulator, 0xC01D, 0, MAX_CYCLES);
    assert_eq!(emulator.bus().ram()[0x00], 0x5A);
}

#[test]
fn test_chr_rom_ignores_ppudata_writes() {
    let rom = RomBuilder::new().program(&CHR_ROUND_TRIP);
    let mut emulator = emulator_with(&rom);

    run_until_pc(&mut emulator, 0xC01D, 0, MAX_CYCLES);
    assert_eq!(emulator.bus().ram()[0x00], 0x00);
}

#[test]
fn test_controller_read_sequence() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x01,       // C000 LDA #$01
        0x8D, 0x16, 0x40, // C002 STA $4016 (strobe on)
        0xA9, 0x00,       // C005 LDA #$00
        0x8D, 0x16, 0x40, // C007 STA $4016 (latch buttons)
        0xA2, 0x00,       // C00A LDX #$00
        0xAD, 0x16, 0x40, // C00C LDA $4016
        0x95, 0x10,       // C00F STA $10,X
        0xE8,             // C011 INX
        0xE0, 0x08,       // C012 CPX #$08
        0xD0, 0xF6,       // C014 BNE $C00C
        0x4C, 0x16, 0xC0, // C016 JMP $C016
    ];
    let mut emulator = emulator_with(&RomBuilder::new().program(&program));

    // A + Start
    run_until_pc(&mut emulator, 0xC016, 0x09, MAX_CYCLES);
    assert_eq!(
        &emulator.bus().ram()[0x10..0x18],
        &[0x41, 0x40, 0x40, 0x41, 0x40, 0x40, 0x40, 0x40]
    );
}

#[test]
fn test_nmi_once_per_frame() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x80,       // C000 LDA #$80
        0x8D, 0x00, 0x20, // C002 STA $2000 (enable NMI)
        0x4C, 0x05, 0xC0, // C005 JMP $C005
    ];
    let rom = RomBuilder::new()
        .program(&program)
        .nmi_handler(&[0xE6, 0x00, 0x40]); // INC $00; RTI
    let mut emulator = emulator_with(&rom);

    emulator.step_frame(0);
    assert_eq!(emulator.bus().ram()[0x00], 0, "No vblank yet");
    emulator.step_frame(0);
    emulator.step_frame(0);
    assert_eq!(emulator.bus().ram()[0x00], 2);
}

/// Tile 0 is opaque everywhere; OAM powers on as 64 copies of tile 0 at (0, 0)
fn sprite_zero_rom(program: &[u8]) -> RomBuilder {
    let mut chr = vec![0; CHR_BANK_SIZE];
    chr[..8].fill(0xFF);
    RomBuilder::new().chr(chr).program(program)
}

#[test]
fn test_sprite_zero_hit_every_frame() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x1E,       // C000 LDA #$1E
        0x8D, 0x01, 0x20, // C002 STA $2001 (show background and sprites)
        0x4C, 0x05, 0xC0, // C005 JMP $C005
    ];
    let mut emulator = emulator_with(&sprite_zero_rom(&program));

    for frame in 0..3 {
        emulator.step_frame(0);
        assert!(
            emulator.bus().ppu().status().contains(PpuStatus::SPRITE_ZERO_HIT),
            "Hit during frame {}",
            frame
        );

        while emulator.bus().ppu().scanline() != 0 {
            emulator.step_cycle(0);
        }
        assert!(
            !emulator.bus().ppu().status().contains(PpuStatus::SPRITE_ZERO_HIT),
            "Cleared by the pre-render line"
        );
    }
}

#[test]
fn test_no_sprite_zero_hit_without_rendering() {
    let mut emulator = emulator_with(&sprite_zero_rom(&[0x4C, 0x00, 0xC0]));

    emulator.step_frame(0);
    emulator.step_frame(0);
    assert!(!emulator.bus().ppu().status().contains(PpuStatus::SPRITE_ZERO_HIT));
}

#[test]
fn test_snapshot_json_resumes_bit_exact() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x80,       // C000 LDA #$80
        0x8D, 0x00, 0x20, // C002 STA $2000
        0xA9, 0x1E,       // C005 LDA #$1E
        0x8D, 0x01, 0x20, // C007 STA $2001
        0xE6, 0x10,       // C00A INC $10
        0x4C, 0x0A, 0xC0, // C00C JMP $C00A
    ];
    let rom = sprite_zero_rom(&program).nmi_handler(&[0xE6, 0x11, 0x40]);
    let mut original = emulator_with(&rom);
    original.step_frame(0);
    original.step_frame(0);

    let json = original
        .snapshot()
        .expect("Failed to take snapshot")
        .to_json()
        .expect("Failed to serialize");
    let snapshot = Snapshot::from_json(&json).expect("Failed to deserialize");

    let mut resumed = Emulator::default();
    resumed.load_rom(&rom.build()).expect("Failed to load ROM");
    resumed.restore(&snapshot).expect("Failed to restore");

    for _ in 0..2 {
        original.step_frame(0x80);
        resumed.step_frame(0x80);
    }

    assert_eq!(resumed.cpu(), original.cpu());
    assert_eq!(resumed.bus().ram(), original.bus().ram());
    assert_eq!(resumed.total_cycles(), original.total_cycles());
    assert!(resumed.video_frame() == original.video_frame(), "Same picture");
}
