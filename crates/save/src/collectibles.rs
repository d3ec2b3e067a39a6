// ---------------------------------------------------------------------------
// Collectibles store: per-type flags shared by every save slot
// ---------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::save_error::SaveError;
use crate::store_file::{read_json_file, remove_store_file, PersistentStore};

/// Number of collectible types.
pub const COLLECTIBLE_COUNT: usize = 6;

pub const COLLECTIBLES_FILE: &str = "collectibles.sav";

/// On-disk shape: `{"flags":[0,0,1,0,0,0]}`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectiblesData {
    pub flags: [i32; COLLECTIBLE_COUNT],
}

/// Flags are loaded once at startup; `is_obtained` never touches disk.
#[derive(Resource, Debug, Clone)]
pub struct CollectiblesStore {
    path: PathBuf,
    data: CollectiblesData,
}

impl CollectiblesStore {
    /// Empty store backed by `dir/collectibles.sav`, without reading it.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(COLLECTIBLES_FILE),
            data: CollectiblesData::default(),
        }
    }

    /// Store backed by `dir/collectibles.sav`, filled from the file if it
    /// exists. A malformed file is logged and ignored.
    pub fn load(dir: &Path) -> Self {
        let mut store = Self::new(dir);
        match read_json_file::<CollectiblesData>(&store.path) {
            Ok(Some(data)) => store.data = data,
            Ok(None) => {}
            Err(e) => warn!(
                "Ignoring unreadable collectibles file {}: {e}",
                store.path.display()
            ),
        }
        store
    }

    /// Mark collectible `index` as obtained. Returns whether the flag
    /// changed (and so needs writing).
    pub fn obtain(&mut self, index: usize) -> Result<bool, SaveError> {
        let flag = self
            .data
            .flags
            .get_mut(index)
            .ok_or(SaveError::InvalidCollectible(index))?;
        let changed = *flag != 1;
        *flag = 1;
        Ok(changed)
    }

    /// Out-of-range indices are never obtained.
    pub fn is_obtained(&self, index: usize) -> bool {
        self.data.flags.get(index) == Some(&1)
    }

    pub fn flags(&self) -> [i32; COLLECTIBLE_COUNT] {
        self.data.flags
    }

    /// Clear every flag and delete the file.
    pub fn wipe(&mut self) -> Result<(), SaveError> {
        self.data = CollectiblesData::default();
        remove_store_file(&self.path)
    }
}

impl PersistentStore for CollectiblesStore {
    const NAME: &'static str = "collectibles";

    fn path(&self) -> &Path {
        &self.path
    }

    fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(&self.data).map_err(|e| SaveError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic_write::atomic_write;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("progression_collectibles_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_obtain_sets_only_that_flag() {
        let mut store = CollectiblesStore::new(Path::new("unused"));
        assert!(store.obtain(2).unwrap());
        assert!(!store.obtain(2).unwrap());
        assert_eq!(store.flags(), [0, 0, 1, 0, 0, 0]);
        assert!(store.is_obtained(2));
        assert!(!store.is_obtained(0));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut store = CollectiblesStore::new(Path::new("unused"));
        assert!(matches!(
            store.obtain(COLLECTIBLE_COUNT),
            Err(SaveError::InvalidCollectible(6))
        ));
        assert!(!store.is_obtained(99));
    }

    #[test]
    fn test_json_shape() {
        let mut store = CollectiblesStore::new(Path::new("unused"));
        store.obtain(5).unwrap();
        let value: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        assert_eq!(value["flags"], serde_json::json!([0, 0, 0, 0, 0, 1]));
    }

    #[test]
    fn test_persisted_flags_survive_reload() {
        let dir = test_dir("reload");
        let mut store = CollectiblesStore::load(&dir);
        store.obtain(2).unwrap();
        atomic_write(store.path(), store.to_json().unwrap().as_bytes()).unwrap();

        let reloaded = CollectiblesStore::load(&dir);
        assert!(reloaded.is_obtained(2));
        assert!((0..COLLECTIBLE_COUNT)
            .filter(|&i| i != 2)
            .all(|i| !reloaded.is_obtained(i)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = test_dir("malformed");
        std::fs::write(dir.join(COLLECTIBLES_FILE), "{\"flags\":[1,1]}").unwrap();
        let store = CollectiblesStore::load(&dir);
        assert_eq!(store.flags(), [0; COLLECTIBLE_COUNT]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_wipe_clears_flags_and_file() {
        let dir = test_dir("wipe");
        let mut store = CollectiblesStore::load(&dir);
        store.obtain(1).unwrap();
        atomic_write(store.path(), store.to_json().unwrap().as_bytes()).unwrap();

        store.wipe().unwrap();
        assert!(!store.is_obtained(1));
        assert!(!dir.join(COLLECTIBLES_FILE).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
