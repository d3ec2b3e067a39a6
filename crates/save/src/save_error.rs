// ---------------------------------------------------------------------------
// SaveError: error types for save/load operations
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur during save/load operations.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (permission denied, disk full, etc.). A missing file is
    /// not an error and never reaches this variant.
    Io(std::io::Error),
    /// Encoding a record or store failed.
    Encode(String),
    /// Decoding a record or store failed.
    Decode(String),
    /// File header is damaged: bad magic, truncated, or checksum mismatch.
    Corrupt(String),
    /// Save file version is newer than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
    /// Slot index outside `0..SLOT_COUNT`.
    InvalidSlot(u8),
    /// Collectible index outside `0..COLLECTIBLE_COUNT`.
    InvalidCollectible(usize),
    /// A save was requested while another save or load was still running.
    SaveInProgress,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::Corrupt(msg) => write!(f, "Corrupt save file: {msg}"),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: save is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::InvalidSlot(slot) => write!(f, "Invalid save slot: {slot}"),
            SaveError::InvalidCollectible(index) => {
                write!(f, "Invalid collectible index: {index}")
            }
            SaveError::SaveInProgress => write!(f, "A save or load is already in progress"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}
