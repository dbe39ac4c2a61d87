// cyclenes - headless runner
//
// Loads a ROM, runs it for a number of frames (or replays an FM2 movie)
// and optionally writes the final frame as a PNG and a CPU trace in nestest log format.

use clap::Parser;
use cyclenes::emulator::{save_png, Emulator, EmulatorConfig, Movie, CONFIG_FILE};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// nestest automation mode entry point
const NESTEST_START: u16 = 0xC000;

/// Cycles nestest's automation mode needs to log every test
const NESTEST_CYCLES: u64 = 26_554;

/// Cycle-accurate NES emulator core
#[derive(Parser, Debug)]
#[command(name = "cyclenes", version)]
#[command(about = "Run a NES ROM headless", long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    rom: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 60)]
    frames: u64,

    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Save the last frame as PNG (the configured screenshot directory when
    /// no path is given)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "")]
    screenshot: Option<PathBuf>,

    /// Write a CPU trace log
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Replay an FM2 movie instead of running a fixed number of frames
    #[arg(short, long, conflicts_with = "nestest")]
    movie: Option<PathBuf>,

    /// Start at $C000 and run nestest's automation mode instead of frames
    #[arg(long)]
    nestest: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = EmulatorConfig::load_or_default(&args.config);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.debug.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.trace.is_some() {
        config.debug.cpu_trace = true;
    }

    let mut emulator = Emulator::new(config);
    emulator.load_rom_file(&args.rom)?;

    if let Some(path) = &args.trace {
        emulator.logger_mut().open_log_file(path)?;
    }

    if args.nestest {
        run_nestest(&mut emulator);
    } else if let Some(path) = &args.movie {
        let movie = Movie::load(path)?;
        emulator.play_movie(&movie)?;
        tracing::info!(
            frames = movie.len(),
            cycles = emulator.total_cycles(),
            "Movie complete"
        );
    } else {
        for _ in 0..args.frames {
            emulator.step_frame(0);
        }
        tracing::info!(
            frames = emulator.frame_count(),
            cycles = emulator.total_cycles(),
            "Run complete"
        );
    }

    let cpu = emulator.cpu();
    println!(
        "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        cpu.pc,
        cpu.a,
        cpu.x,
        cpu.y,
        cpu.status,
        cpu.sp,
        emulator.total_cycles()
    );

    match args.screenshot {
        Some(path) if path.as_os_str().is_empty() => {
            let path = emulator.screenshot()?;
            println!("Screenshot saved to {}", path.display());
        }
        Some(path) => {
            save_png(&path, emulator.video_frame())?;
            println!("Screenshot saved to {}", path.display());
        }
        None => {}
    }

    emulator.logger_mut().close_log_file()?;
    Ok(())
}

/// Run nestest from its automation entry point and report the result bytes
fn run_nestest(emulator: &mut Emulator) {
    // Let the reset sequence run so the cycle count starts at 7
    while !emulator.cpu().at_instruction_boundary() {
        emulator.step_cycle(0);
    }
    emulator.cpu_mut().jump_to(NESTEST_START);

    while emulator.total_cycles() < NESTEST_CYCLES && !emulator.cpu().is_jammed() {
        emulator.step_instruction(0);
    }

    let ram = emulator.bus().ram();
    println!("nestest result: {:02X} {:02X}", ram[0x02], ram[0x03]);
}
