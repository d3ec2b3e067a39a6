// ---------------------------------------------------------------------------
// Save slots: per-slot records, file paths and the active-slot selector
// ---------------------------------------------------------------------------

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

use crate::save_error::SaveError;
use crate::save_types::SaveRecord;

/// Number of save slots.
pub const SLOT_COUNT: u8 = 3;

/// Slot files are `savefile{n}.sav` inside the save directory.
pub const SLOT_FILE_PREFIX: &str = "savefile";
pub const SAVE_FILE_EXTENSION: &str = "sav";

/// In-memory record for every slot plus the directory they live in.
///
/// Saving collects into `records[active_slot]`; loading replaces it.
#[derive(Resource, Debug, Clone)]
pub struct SaveSlots {
    dir: PathBuf,
    active_slot: u8,
    records: [SaveRecord; SLOT_COUNT as usize],
}

impl SaveSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            active_slot: 0,
            records: std::array::from_fn(|_| SaveRecord::default()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn check(slot: u8) -> Result<usize, SaveError> {
        if slot < SLOT_COUNT {
            Ok(slot as usize)
        } else {
            Err(SaveError::InvalidSlot(slot))
        }
    }

    pub fn active_slot(&self) -> u8 {
        self.active_slot
    }

    pub fn set_active_slot(&mut self, slot: u8) -> Result<(), SaveError> {
        Self::check(slot)?;
        self.active_slot = slot;
        Ok(())
    }

    pub fn slot_path(&self, slot: u8) -> Result<PathBuf, SaveError> {
        Self::check(slot)?;
        Ok(self
            .dir
            .join(format!("{SLOT_FILE_PREFIX}{slot}.{SAVE_FILE_EXTENSION}")))
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(format!(
            "{SLOT_FILE_PREFIX}{}.{SAVE_FILE_EXTENSION}",
            self.active_slot
        ))
    }

    pub fn record(&self, slot: u8) -> Result<&SaveRecord, SaveError> {
        Ok(&self.records[Self::check(slot)?])
    }

    pub fn record_mut(&mut self, slot: u8) -> Result<&mut SaveRecord, SaveError> {
        Ok(&mut self.records[Self::check(slot)?])
    }

    pub fn active_record(&self) -> &SaveRecord {
        &self.records[self.active_slot as usize]
    }

    pub fn active_record_mut(&mut self) -> &mut SaveRecord {
        &mut self.records[self.active_slot as usize]
    }

    /// Whether a file exists for `slot`. Invalid slots have no file.
    pub fn has_save(&self, slot: u8) -> bool {
        self.slot_path(slot).is_ok_and(|path| path.is_file())
    }

    pub fn any_save_exists(&self) -> bool {
        (0..SLOT_COUNT).any(|slot| self.has_save(slot))
    }

    /// Delete the file for `slot` and reset its in-memory record. Returns
    /// whether a file was actually removed.
    pub fn delete_slot(&mut self, slot: u8) -> Result<bool, SaveError> {
        let path = self.slot_path(slot)?;
        self.records[slot as usize] = SaveRecord::default();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Reset every record and the active slot, leaving files alone.
    pub fn reset_records(&mut self) {
        self.active_slot = 0;
        for record in &mut self.records {
            *record = SaveRecord::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("progression_slots_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_slot_paths_follow_pattern() {
        let slots = SaveSlots::new("saves");
        assert_eq!(
            slots.slot_path(2).unwrap(),
            PathBuf::from("saves/savefile2.sav")
        );
        assert_eq!(slots.active_path(), PathBuf::from("saves/savefile0.sav"));
        assert!(matches!(
            slots.slot_path(3),
            Err(SaveError::InvalidSlot(3))
        ));
    }

    #[test]
    fn test_set_active_slot_validates() {
        let mut slots = SaveSlots::new("saves");
        slots.set_active_slot(1).unwrap();
        assert_eq!(slots.active_slot(), 1);
        assert!(slots.set_active_slot(SLOT_COUNT).is_err());
        assert_eq!(slots.active_slot(), 1);
    }

    #[test]
    fn test_active_record_follows_selector() {
        let mut slots = SaveSlots::new("saves");
        slots.set_active_slot(2).unwrap();
        slots.active_record_mut().scene.scene_name = "Tower".to_string();
        assert_eq!(slots.record(2).unwrap().scene.scene_name, "Tower");
        assert!(slots.record(0).unwrap().scene.scene_name.is_empty());
    }

    #[test]
    fn test_has_save_and_delete() {
        let dir = test_dir("has_save");
        let mut slots = SaveSlots::new(&dir);
        assert!(!slots.any_save_exists());

        std::fs::write(slots.slot_path(1).unwrap(), b"x").unwrap();
        slots.record_mut(1).unwrap().status.health = 5;
        assert!(slots.has_save(1));
        assert!(!slots.has_save(0));
        assert!(!slots.has_save(9));
        assert!(slots.any_save_exists());

        assert!(slots.delete_slot(1).unwrap());
        assert!(!slots.has_save(1));
        assert_eq!(slots.record(1).unwrap().status.health, 100);
        assert!(!slots.delete_slot(1).unwrap());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_reset_records() {
        let mut slots = SaveSlots::new("saves");
        slots.set_active_slot(2).unwrap();
        slots.active_record_mut().currency.currency = 77;
        slots.reset_records();
        assert_eq!(slots.active_slot(), 0);
        assert_eq!(slots.record(2).unwrap().currency.currency, 0);
    }
}
