// ---------------------------------------------------------------------------
// SaveRecord: the top-level per-slot save struct
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::player_types::*;
use super::progression_types::*;
use super::version::CURRENT_SAVE_VERSION;

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq)]
pub struct SaveRecord {
    /// Save record version. Defaults to 0 for records that predate versioning.
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub status: SavePlayerStatus,
    #[serde(default)]
    pub respawn: SavePlayerRespawn,
    #[serde(default)]
    pub currency: SavePlayerCurrency,
    #[serde(default)]
    pub inventory: SavePlayerInventory,
    #[serde(default)]
    pub scene: SaveScene,
    #[serde(default)]
    pub progression: SaveProgression,
    /// Extension map for `Saveable` resources (ability wheel, unlock state).
    /// Keys are stable strings; values are bitcode bytes owned by each
    /// resource.
    #[serde(default)]
    pub extensions: BTreeMap<String, Vec<u8>>,
}

impl Default for SaveRecord {
    fn default() -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            status: SavePlayerStatus::default(),
            respawn: SavePlayerRespawn::default(),
            currency: SavePlayerCurrency::default(),
            inventory: SavePlayerInventory::default(),
            scene: SaveScene::default(),
            progression: SaveProgression::default(),
            extensions: BTreeMap::new(),
        }
    }
}

impl SaveRecord {
    pub fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bitcode::Error> {
        bitcode::decode(bytes)
    }

    /// Human-readable dump of the record, for debugging a slot by hand.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
