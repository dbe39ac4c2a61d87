// Save state functionality
//
// A `Snapshot` captures everything needed to resume bit-exact emulation:
// CPU registers and pipeline state, the PPU, console RAM, controller, DMA
// and mapper registers. It serializes to JSON with serde.

use crate::bus::BusState;
use crate::cpu::Cpu;
use serde::{Deserialize, Serialize};

/// Errors that can occur during save state operations
#[derive(Debug)]
pub enum SaveStateError {
    /// Serialization/deserialization error
    Serialization(serde_json::Error),

    /// Save state version mismatch
    VersionMismatch { expected: u32, found: u32 },

    /// The snapshot was taken with a different cartridge
    CartridgeMismatch,

    /// No ROM loaded
    NoRomLoaded,
}

impl std::fmt::Display for SaveStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStateError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SaveStateError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveStateError::CartridgeMismatch => {
                write!(f, "Snapshot belongs to a different cartridge")
            }
            SaveStateError::NoRomLoaded => write!(f, "No ROM loaded"),
        }
    }
}

impl std::error::Error for SaveStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveStateError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SaveStateError {
    fn from(e: serde_json::Error) -> Self {
        SaveStateError::Serialization(e)
    }
}

/// Current save state format version
pub const SAVE_STATE_VERSION: u32 = 1;

/// Complete emulator state at a CPU cycle boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Version number for compatibility checking
    pub(super) version: u32,

    /// Timestamp when the snapshot was created (RFC 3339)
    pub(super) timestamp: String,

    /// Cartridge identity: mapper number and PRG/CHR-ROM sizes
    pub(super) mapper_number: u8,
    pub(super) rom_sizes: (usize, usize),

    /// CPU cycles executed by the driver, DMA cycles included
    pub(super) total_cycles: u64,

    pub(super) cpu: Cpu,
    pub(super) bus: BusState,
}

impl Snapshot {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, SaveStateError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON, rejecting other format versions
    ///
    /// # Errors
    ///
    /// [`SaveStateError::Serialization`] for malformed input and
    /// [`SaveStateError::VersionMismatch`] for snapshots from another version
    pub fn from_json(json: &str) -> Result<Self, SaveStateError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: SAVE_STATE_VERSION,
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }

    /// Format version of this snapshot
    pub fn version(&self) -> u32 {
        self.version
    }

    /// When the snapshot was taken
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Mapper number of the cartridge the snapshot belongs to
    pub fn mapper_number(&self) -> u8 {
        self.mapper_number
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }
}
