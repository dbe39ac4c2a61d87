// PPU Benchmarks
// Dot stepping, register traffic and whole-frame emulation through the bus

use criterion::{criterion_group, criterion_main, Criterion};
use cyclenes::ppu::DOTS_PER_FRAME;
use cyclenes::{create_mapper, Bus, Cartridge, Emulator, MemoryMappedDevice};
use std::hint::black_box;

/// NROM-128 image: `program` at $C000 (mirrored at $8000), CHR-ROM in a
/// striped test pattern
fn test_rom(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let mut prg = vec![0xEA; 16 * 1024];
    prg[..program.len()].copy_from_slice(program);
    prg[0x3FFC] = 0x00;
    prg[0x3FFD] = 0xC0;
    rom.extend_from_slice(&prg);
    rom.extend((0..8 * 1024).map(|i| if i % 16 < 8 { 0xAA } else { 0x55 }));
    rom
}

/// Bus with the test cartridge inserted and rendering enabled
fn rendering_bus() -> Bus {
    let cartridge = Cartridge::from_ines_bytes(&test_rom(&[])).expect("Valid test ROM");
    let mut bus = Bus::new();
    bus.insert_cartridge(create_mapper(cartridge).expect("NROM is supported"));

    // Sprites spread over the screen so evaluation finds work
    bus.write(0x2003, 0x00);
    for i in 0..=255u8 {
        bus.write(0x2004, i.wrapping_mul(37));
    }
    bus.write(0x2001, 0b0001_1110);
    bus
}

/// Benchmark PPU dot stepping
/// This is the main performance-critical path for the PPU
fn bench_ppu_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_rendering");
    group.sample_size(20);

    // One frame = 262 scanlines * 341 dots
    group.bench_function("full_frame_via_tick", |b| {
        let mut bus = rendering_bus();

        b.iter(|| {
            for _ in 0..DOTS_PER_FRAME {
                bus.tick_ppu();
            }
            black_box(bus.ppu().frame_buffer());
        });
    });

    group.bench_function("scanline_341_dots", |b| {
        let mut bus = rendering_bus();

        b.iter(|| {
            for _ in 0..341 {
                black_box(bus.tick_ppu());
            }
        });
    });

    group.finish();
}

/// Benchmark PPU register access patterns
fn bench_ppu_registers(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_registers");

    group.bench_function("ppustatus_read", |b| {
        let mut bus = rendering_bus();
        b.iter(|| black_box(bus.read(black_box(0x2002))));
    });

    group.bench_function("ppudata_write_sequence", |b| {
        let mut bus = Bus::new();

        b.iter(|| {
            bus.write(0x2006, 0x20);
            bus.write(0x2006, 0x00);
            for i in 0..32 {
                bus.write(0x2007, i);
            }
        });
    });

    group.bench_function("oam_dma", |b| {
        let mut bus = Bus::new();

        b.iter(|| {
            bus.write(0x4014, 0x02);
            let mut cycle = 0;
            while bus.dma_active() {
                bus.step_dma(cycle, 0x0000);
                cycle += 1;
            }
        });
    });

    group.finish();
}

/// Benchmark the full driver: CPU, DMA and three PPU dots per cycle
fn bench_emulator_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("emulator");
    group.sample_size(20);

    group.bench_function("step_frame", |b| {
        #[rustfmt::skip]
        let program = [
            0xA9, 0x1E,       // C000 LDA #$1E
            0x8D, 0x01, 0x20, // C002 STA $2001
            0xE6, 0x10,       // C005 INC $10
            0x4C, 0x05, 0xC0, // C007 JMP $C005
        ];
        let mut emulator = Emulator::default();
        emulator.load_rom(&test_rom(&program)).expect("Valid test ROM");

        b.iter(|| black_box(emulator.step_frame(0)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ppu_rendering,
    bench_ppu_registers,
    bench_emulator_frame
);
criterion_main!(benches);
