// ---------------------------------------------------------------------------
// Tutorial codex store: unlocked entry names shared by every save slot
// ---------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::save_error::SaveError;
use crate::store_file::{read_json_file, remove_store_file, PersistentStore};

pub const TUTORIALS_FILE: &str = "tutorials.sav";

/// On-disk shape: `{"unlockedEntryNames":["Dash","Parry"]}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TutorialCodexData {
    #[serde(default)]
    pub unlocked_entry_names: Vec<String>,
}

#[derive(Resource, Debug, Clone)]
pub struct TutorialCodexStore {
    path: PathBuf,
    data: TutorialCodexData,
}

impl TutorialCodexStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(TUTORIALS_FILE),
            data: TutorialCodexData::default(),
        }
    }

    pub fn load(dir: &Path) -> Self {
        let mut store = Self::new(dir);
        match read_json_file::<TutorialCodexData>(&store.path) {
            Ok(Some(data)) => store.data = data,
            Ok(None) => {}
            Err(e) => warn!(
                "Ignoring unreadable tutorial codex file {}: {e}",
                store.path.display()
            ),
        }
        store
    }

    /// Unlock `name`. Returns `false` if it was already unlocked.
    pub fn unlock(&mut self, name: &str) -> bool {
        if self.is_unlocked(name) {
            return false;
        }
        self.data.unlocked_entry_names.push(name.to_string());
        true
    }

    pub fn is_unlocked(&self, name: &str) -> bool {
        self.data.unlocked_entry_names.iter().any(|n| n == name)
    }

    /// Unlocked entries in unlock order.
    pub fn entries(&self) -> &[String] {
        &self.data.unlocked_entry_names
    }

    pub fn wipe(&mut self) -> Result<(), SaveError> {
        self.data = TutorialCodexData::default();
        remove_store_file(&self.path)
    }
}

impl PersistentStore for TutorialCodexStore {
    const NAME: &'static str = "tutorial codex";

    fn path(&self) -> &Path {
        &self.path
    }

    fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(&self.data).map_err(|e| SaveError::Encode(e.to_string()))
    }
}
