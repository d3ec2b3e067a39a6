// ---------------------------------------------------------------------------
// ProgressionError: failures while applying or registering object state
// ---------------------------------------------------------------------------

use std::fmt;

use crate::unique_id::UniqueId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    /// A stored state blob could not be parsed by the object it belongs to.
    MalformedState { id: UniqueId, reason: String },
    /// Two differently named objects produced the same unique ID.
    IdCollision {
        id: UniqueId,
        existing: String,
        incoming: String,
    },
}

impl fmt::Display for ProgressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressionError::MalformedState { id, reason } => {
                write!(f, "Malformed saved state for {id}: {reason}")
            }
            ProgressionError::IdCollision {
                id,
                existing,
                incoming,
            } => write!(
                f,
                "Unique ID collision on {id}: '{incoming}' hashes to the same ID as '{existing}'"
            ),
        }
    }
}

impl std::error::Error for ProgressionError {}

impl ProgressionError {
    pub(crate) fn malformed(id: UniqueId, err: serde_json::Error) -> Self {
        ProgressionError::MalformedState {
            id,
            reason: err.to_string(),
        }
    }
}
