// Configuration management
//
// Power-on, input, trace and output settings, persisted as TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default configuration file path
pub const CONFIG_FILE: &str = "cyclenes.toml";

/// Emulator configuration
///
/// Stores all user-configurable settings for the emulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Power-on state
    pub power_on: PowerOnConfig,

    /// Controller settings
    pub input: InputConfig,

    /// Trace and log settings
    pub debug: DebugConfig,

    /// Screenshot settings
    pub output: OutputConfig,
}

/// Power-on configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerOnConfig {
    /// Byte written to every work RAM location when a ROM is loaded
    pub ram_fill: u8,
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pass Up+Down and Left+Right to the game unfiltered
    pub allow_opposing_directions: bool,
}

/// Debug configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Record a trace line for every executed instruction
    pub cpu_trace: bool,

    /// Number of trace lines kept in memory
    pub trace_buffer_size: usize,

    /// `tracing` filter directive used when `RUST_LOG` is not set
    pub log_filter: String,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Screenshot directory
    pub screenshot_directory: PathBuf,
}

impl Default for PowerOnConfig {
    fn default() -> Self {
        PowerOnConfig { ram_fill: 0x00 }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            allow_opposing_directions: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            cpu_trace: false,
            trace_buffer_size: 10_000,
            log_filter: "info".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            screenshot_directory: PathBuf::from("screenshots"),
        }
    }
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            power_on: PowerOnConfig::default(),
            input: InputConfig::default(),
            debug: DebugConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl EmulatorConfig {
    /// Load configuration from file or create default
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// and saves it to the file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cyclenes::emulator::EmulatorConfig;
    ///
    /// let config = EmulatorConfig::load_or_default("cyclenes.toml");
    /// ```
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid configuration");
                return Self::default();
            }
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save(path);
            config
        })
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// I/O errors from reading the file; TOML errors are reported as
    /// [`io::ErrorKind::InvalidData`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cyclenes::emulator::EmulatorConfig;
    ///
    /// let config = EmulatorConfig::default();
    /// config.save("cyclenes.toml").expect("Failed to save configuration");
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }
}
