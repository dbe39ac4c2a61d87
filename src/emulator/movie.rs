// Movie playback - FM2 input recordings
//
// FM2 is the text movie format of FCEUX. A header of `key value` lines is
// followed by one input record per frame:
//
// ```text
// version 3
// emuVersion 20604
// port0 1
// port1 0
// port2 0
// romFilename game
// guid 452DE2C3-EF43-2FA9-77AC-0677FC51543B
// romChecksum base64:...
// |0|........|||
// |1|....T...|||
// ```
//
// Each record is `|commands|port0|port1|port2|`. Gamepad fields list the
// buttons as `RLDUTSBA`, a `.` or space meaning released. Only standard
// gamepads on the two front ports are supported.

use crate::input::Buttons;
use bitflags::bitflags;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

bitflags! {
    /// Console commands issued at the start of a frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MovieCommand: u8 {
        const SOFT_RESET = 0x01;
        const HARD_RESET = 0x02;
        const FDS_DISK_INSERT = 0x04;
        const FDS_DISK_SELECT = 0x08;
        const VS_INSERT_COIN = 0x10;
    }
}

/// Keys whose lines may repeat in the header
const REPEATABLE_KEYS: [&str; 2] = ["comment", "subtitle"];

// ========================================
// Error Types
// ========================================

/// Reasons an FM2 movie cannot be played
#[derive(Debug)]
pub enum MovieError {
    Io(io::Error),
    /// The file ended before the first input record
    NoInput,
    /// A header line without a value
    MalformedHeader { line: usize },
    DuplicateKey { key: String, line: usize },
    MissingKey(&'static str),
    InvalidValue { key: &'static str, value: String },
    /// A valid FM2 feature this core cannot replay
    Unsupported(&'static str),
    /// Wrong number of fields or stray data in an input record
    BadInputLine { line: usize },
    BadCommands { line: usize },
    BadGamepad { line: usize, port: u8 },
}

impl fmt::Display for MovieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieError::Io(e) => write!(f, "Could not read movie: {}", e),
            MovieError::NoInput => write!(f, "No input records found"),
            MovieError::MalformedHeader { line } => write!(f, "Malformed header at line {}", line),
            MovieError::DuplicateKey { key, line } => {
                write!(f, "Duplicate key '{}' at line {}", key, line)
            }
            MovieError::MissingKey(key) => write!(f, "Required key '{}' not found", key),
            MovieError::InvalidValue { key, value } => {
                write!(f, "Invalid value '{}' for key '{}'", value, key)
            }
            MovieError::Unsupported(what) => write!(f, "Unsupported movie: {}", what),
            MovieError::BadInputLine { line } => write!(f, "Malformed input record at line {}", line),
            MovieError::BadCommands { line } => write!(f, "Bad commands field at line {}", line),
            MovieError::BadGamepad { line, port } => {
                write!(f, "Bad gamepad input for port {} at line {}", port, line)
            }
        }
    }
}

impl std::error::Error for MovieError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MovieError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MovieError {
    fn from(error: io::Error) -> Self {
        MovieError::Io(error)
    }
}

// ========================================
// Movie
// ========================================

/// Input for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovieFrame {
    pub commands: MovieCommand,
    /// Controller 1
    pub port0: Buttons,
    /// Controller 2 (recorded, not connected to the core)
    pub port1: Buttons,
}

/// A parsed FM2 movie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub version: i32,
    pub emu_version: i32,
    pub rerecord_count: Option<i32>,
    pub rom_filename: String,
    pub guid: String,
    pub rom_checksum: String,
    pub comments: Vec<String>,
    pub frames: Vec<MovieFrame>,
}

/// What is plugged into a front port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortDevice {
    None,
    Gamepad,
}

impl Movie {
    /// Read and parse an `.fm2` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MovieError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse FM2 text
    ///
    /// # Example
    ///
    /// ```
    /// use cyclenes::emulator::Movie;
    /// use cyclenes::Buttons;
    ///
    /// let text = "version 3\nemuVersion 1\nport0 1\nport1 0\nport2 0\n\
    ///             romFilename demo\nguid 0\nromChecksum 0\n|0|....T...|||\n";
    /// let movie = Movie::parse(text).unwrap();
    /// assert_eq!(movie.frames[0].port0, Buttons::START);
    /// ```
    pub fn parse(text: &str) -> Result<Self, MovieError> {
        let mut lines = text.lines().enumerate().map(|(index, line)| (index + 1, line));

        // Header, up to the first input record
        let mut header: HashMap<String, String> = HashMap::new();
        let mut comments = Vec::new();
        let first_record = loop {
            let (number, line) = lines.next().ok_or(MovieError::NoInput)?;
            if line.starts_with('|') {
                break (number, line);
            }
            if line.trim().is_empty() {
                continue;
            }

            let (key, value) = line
                .split_once(' ')
                .ok_or(MovieError::MalformedHeader { line: number })?;
            if REPEATABLE_KEYS.contains(&key) {
                if key == "comment" {
                    comments.push(value.to_string());
                }
                continue;
            }
            if header.insert(key.to_string(), value.to_string()).is_some() {
                return Err(MovieError::DuplicateKey {
                    key: key.to_string(),
                    line: number,
                });
            }
        };

        let version = required_int(&mut header, "version")?;
        let emu_version = required_int(&mut header, "emuVersion")?;
        let rerecord_count = optional_int(&mut header, "rerecordCount")?;
        if optional_bool(&mut header, "palFlag")? {
            return Err(MovieError::Unsupported("PAL timing"));
        }
        if optional_bool(&mut header, "fds")? {
            return Err(MovieError::Unsupported("Famicom Disk System"));
        }
        if optional_bool(&mut header, "fourscore")? {
            return Err(MovieError::Unsupported("Four Score"));
        }
        if optional_bool(&mut header, "binary")? {
            return Err(MovieError::Unsupported("binary input log"));
        }
        if header.contains_key("savestate") {
            return Err(MovieError::Unsupported("recorded from a savestate"));
        }
        let port0 = port_device(&mut header, "port0")?;
        let port1 = port_device(&mut header, "port1")?;
        if required_int(&mut header, "port2")? != 0 {
            return Err(MovieError::Unsupported("expansion port device"));
        }
        let length = optional_int(&mut header, "length")?;
        let rom_filename = required(&mut header, "romFilename")?;
        let guid = required(&mut header, "guid")?;
        let rom_checksum = required(&mut header, "romChecksum")?;

        // Input records; a non-negative length cuts the log short
        let limit = length.and_then(|n| usize::try_from(n).ok());
        let mut frames = Vec::new();
        for (number, line) in std::iter::once(first_record).chain(lines) {
            if limit.is_some_and(|limit| frames.len() >= limit) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            frames.push(parse_record(line, number, port0, port1)?);
        }

        Ok(Movie {
            version,
            emu_version,
            rerecord_count,
            rom_filename,
            guid,
            rom_checksum,
            comments,
            frames,
        })
    }

    /// Number of recorded frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

// ========================================
// Parsing helpers
// ========================================

fn parse_record(
    line: &str,
    number: usize,
    port0: PortDevice,
    port1: PortDevice,
) -> Result<MovieFrame, MovieError> {
    let fields: Vec<&str> = line.split('|').collect();
    // "", commands, port0, port1, port2, ""
    if fields.len() != 6 || !fields[0].is_empty() || !fields[5].is_empty() || !fields[4].is_empty()
    {
        return Err(MovieError::BadInputLine { line: number });
    }

    let commands = fields[1]
        .trim()
        .parse::<u8>()
        .map(MovieCommand::from_bits_truncate)
        .map_err(|_| MovieError::BadCommands { line: number })?;

    Ok(MovieFrame {
        commands,
        port0: parse_port(fields[2], port0, number, 0)?,
        port1: parse_port(fields[3], port1, number, 1)?,
    })
}

/// Decode a `RLDUTSBA` field; the first character is bit 7
fn parse_port(field: &str, device: PortDevice, line: usize, port: u8) -> Result<Buttons, MovieError> {
    match device {
        PortDevice::None if field.is_empty() => Ok(Buttons::empty()),
        PortDevice::Gamepad if field.chars().count() == 8 => {
            let bits = field
                .chars()
                .fold(0u8, |bits, c| (bits << 1) | u8::from(!matches!(c, '.' | ' ')));
            Ok(Buttons::from_bits_truncate(bits))
        }
        _ => Err(MovieError::BadGamepad { line, port }),
    }
}

fn required(header: &mut HashMap<String, String>, key: &'static str) -> Result<String, MovieError> {
    header.remove(key).ok_or(MovieError::MissingKey(key))
}

fn parse_int(key: &'static str, value: String) -> Result<i32, MovieError> {
    value
        .trim()
        .parse()
        .map_err(|_| MovieError::InvalidValue { key, value })
}

fn required_int(header: &mut HashMap<String, String>, key: &'static str) -> Result<i32, MovieError> {
    parse_int(key, required(header, key)?)
}

fn optional_int(
    header: &mut HashMap<String, String>,
    key: &'static str,
) -> Result<Option<i32>, MovieError> {
    header.remove(key).map(|value| parse_int(key, value)).transpose()
}

fn optional_bool(header: &mut HashMap<String, String>, key: &'static str) -> Result<bool, MovieError> {
    match optional_int(header, key)? {
        None | Some(0) => Ok(false),
        Some(1) => Ok(true),
        Some(other) => Err(MovieError::InvalidValue {
            key,
            value: other.to_string(),
        }),
    }
}

fn port_device(header: &mut HashMap<String, String>, key: &'static str) -> Result<PortDevice, MovieError> {
    match required_int(header, key)? {
        0 => Ok(PortDevice::None),
        1 => Ok(PortDevice::Gamepad),
        2 => Err(MovieError::Unsupported("Zapper")),
        other => Err(MovieError::InvalidValue {
            key,
            value: other.to_string(),
        }),
    }
}
