// ---------------------------------------------------------------------------
// Progression block of the save record
// ---------------------------------------------------------------------------

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Flattened progression map. `serialized_states[i]` is the opaque blob
/// saved by the object whose unique ID is `ids[i]`.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgression {
    pub ids: Vec<u32>,
    pub serialized_states: Vec<String>,
}

impl SaveProgression {
    pub fn len(&self) -> usize {
        self.ids.len().min(self.serialized_states.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two parallel arrays disagree in length.
    pub fn is_mismatched(&self) -> bool {
        self.ids.len() != self.serialized_states.len()
    }
}
