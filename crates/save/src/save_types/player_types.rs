// ---------------------------------------------------------------------------
// Player and scene blocks of the save record
// ---------------------------------------------------------------------------

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavePlayerStatus {
    pub health: i32,
    pub max_health: i32,
    pub energy: f32,
    pub max_energy: f32,
    pub energy_regen_rate: f32,
}

impl Default for SavePlayerStatus {
    fn default() -> Self {
        Self {
            health: 100,
            max_health: 100,
            energy: 0.0,
            max_energy: 100.0,
            energy_regen_rate: 10.0,
        }
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SavePlayerRespawn {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub checkpoint_name: String,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavePlayerCurrency {
    pub currency: i32,
    pub max_currency: i32,
}

impl Default for SavePlayerCurrency {
    fn default() -> Self {
        Self {
            currency: 0,
            max_currency: 500,
        }
    }
}

/// Parallel arrays: `item_counts[i]` belongs to `item_names[i]`.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SavePlayerInventory {
    pub item_names: Vec<String>,
    pub item_counts: Vec<i32>,
    /// Empty when nothing is equipped.
    pub current_item_name: String,
    pub current_item_count: i32,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaveScene {
    pub scene_name: String,
}
