// Screenshot functionality
//
// Saves a 256x240 RGB frame buffer as a PNG file.

use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during screenshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
        }
    }
}

impl std::error::Error for ScreenshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScreenshotError::Io(e) => Some(e),
            ScreenshotError::PngEncoding(e) => Some(e),
        }
    }
}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Save a frame into `directory` under a timestamped name
///
/// # Arguments
///
/// * `frame_buffer` - 256x240 packed RGB, as returned by `Emulator::video_frame`
/// * `directory` - Target directory, created if missing
/// * `rom_path` - Optional path to the currently loaded ROM (for naming)
///
/// # Returns
///
/// The path of the written file
///
/// # Example
///
/// ```no_run
/// use cyclenes::emulator::save_screenshot;
/// use cyclenes::ppu::Ppu;
/// use std::path::Path;
///
/// let ppu = Ppu::new();
/// let path = save_screenshot(ppu.frame_buffer(), Path::new("screenshots"), None)
///     .expect("Failed to save screenshot");
/// println!("Screenshot saved to: {}", path.display());
/// ```
pub fn save_screenshot(
    frame_buffer: &[u8],
    directory: &Path,
    rom_path: Option<&Path>,
) -> Result<PathBuf, ScreenshotError> {
    fs::create_dir_all(directory)?;

    let file_path = directory.join(screenshot_file_name(rom_path));
    save_png(&file_path, frame_buffer)?;

    tracing::info!(path = %file_path.display(), "Screenshot saved");
    Ok(file_path)
}

/// `<rom>_<timestamp>.png`, or `screenshot_<timestamp>.png` without a ROM
fn screenshot_file_name(rom_path: Option<&Path>) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let stem = rom_path
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "screenshot".to_string());
    format!("{}_{}.png", stem, timestamp)
}

/// Save a 256x240 RGB frame as a PNG file
pub fn save_png(path: &Path, frame_buffer: &[u8]) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(frame_buffer)?;

    Ok(())
}
