//! Startup crash recovery scan.
//!
//! An interrupted atomic write leaves a `.tmp` file next to its target. On
//! startup every known `.tmp` file in the save directory is removed, and the
//! slot files are checked against their header checksum. Corrupt slots are
//! left in place (loading them already degrades to "no save") but reported
//! through `CrashRecoveryState` so a menu can warn about them.

use std::path::{Path, PathBuf};

use bevy::prelude::*;

use crate::atomic_write::tmp_path;
use crate::collectibles::COLLECTIBLES_FILE;
use crate::file_header::unwrap_header;
use crate::save_slots::{SaveSlots, SLOT_COUNT};
use crate::tutorial_codex::TUTORIALS_FILE;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct CrashRecoveryState {
    /// Whether any `.tmp` leftovers were found.
    pub detected: bool,
    pub tmp_files_cleaned: usize,
    /// Slots whose file exists but fails header validation.
    pub corrupted_slots: Vec<u8>,
}

// =============================================================================
// Core Logic
// =============================================================================

/// Every file in `dir` an atomic write could have been interrupted on.
fn write_targets(slots: &SaveSlots) -> Vec<PathBuf> {
    let mut targets: Vec<PathBuf> = (0..SLOT_COUNT)
        .filter_map(|slot| slots.slot_path(slot).ok())
        .collect();
    targets.push(slots.dir().join(COLLECTIBLES_FILE));
    targets.push(slots.dir().join(TUTORIALS_FILE));
    targets
}

/// Leftover `.tmp` files for the slots and stores in `slots.dir()`.
pub fn find_tmp_files(slots: &SaveSlots) -> Vec<PathBuf> {
    write_targets(slots)
        .iter()
        .map(|target| tmp_path(target))
        .filter(|tmp| tmp.is_file())
        .collect()
}

/// Removes the given files. Returns how many were removed.
pub fn clean_tmp_files(tmp_files: &[PathBuf]) -> usize {
    let mut cleaned = 0;
    for path in tmp_files {
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("Crash recovery: cleaned up tmp file: {}", path.display());
                cleaned += 1;
            }
            Err(e) => warn!(
                "Crash recovery: failed to remove tmp file {}: {e}",
                path.display()
            ),
        }
    }
    cleaned
}

/// Whether `path` holds a slot file with an intact header and checksum.
pub fn validate_save_file(path: &Path) -> bool {
    match std::fs::read(path) {
        Ok(bytes) => unwrap_header(&bytes).is_ok(),
        Err(_) => false,
    }
}

pub fn perform_crash_recovery_scan(slots: &SaveSlots) -> CrashRecoveryState {
    let tmp_files = find_tmp_files(slots);
    let tmp_files_cleaned = clean_tmp_files(&tmp_files);

    let corrupted_slots: Vec<u8> = (0..SLOT_COUNT)
        .filter(|&slot| slots.has_save(slot))
        .filter(|&slot| {
            slots
                .slot_path(slot)
                .is_ok_and(|path| !validate_save_file(&path))
        })
        .collect();
    for slot in &corrupted_slots {
        warn!("Crash recovery: save slot {slot} fails validation");
    }

    CrashRecoveryState {
        detected: !tmp_files.is_empty(),
        tmp_files_cleaned,
        corrupted_slots,
    }
}

// =============================================================================
// Bevy Systems
// =============================================================================

pub(crate) fn detect_crash_artifacts(mut commands: Commands, slots: Res<SaveSlots>) {
    let state = perform_crash_recovery_scan(&slots);
    if state.detected {
        info!(
            "Crash recovery: removed {} interrupted write(s) in {}",
            state.tmp_files_cleaned,
            slots.dir().display()
        );
    }
    commands.insert_resource(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_header::wrap_with_header;
    use std::fs;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("progression_crash_recovery_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_validate_save_file() {
        let dir = test_dir("validate");
        let good = dir.join("good.sav");
        let bad = dir.join("bad.sav");
        let wrapped = wrap_with_header(b"payload", 0, 7);
        fs::write(&good, &wrapped).unwrap();
        let mut corrupted = wrapped.clone();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0xFF;
        fs::write(&bad, &corrupted).unwrap();

        assert!(validate_save_file(&good));
        assert!(!validate_save_file(&bad));
        assert!(!validate_save_file(&dir.join("missing.sav")));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_scan_cleans_tmp_and_reports_corrupt_slots() {
        let dir = test_dir("scan");
        let slots = SaveSlots::new(&dir);
        let slot0 = slots.slot_path(0).unwrap();
        let slot2 = slots.slot_path(2).unwrap();
        fs::write(&slot0, wrap_with_header(b"ok", 0, 2)).unwrap();
        fs::write(&slot2, b"definitely not a save").unwrap();
        fs::write(tmp_path(&slot0), b"half written").unwrap();
        fs::write(tmp_path(&dir.join(COLLECTIBLES_FILE)), b"{").unwrap();
        fs::write(dir.join("unrelated.tmp"), b"keep").unwrap();

        let state = perform_crash_recovery_scan(&slots);

        assert!(state.detected);
        assert_eq!(state.tmp_files_cleaned, 2);
        assert_eq!(state.corrupted_slots, vec![2]);
        assert!(!tmp_path(&slot0).exists());
        assert!(dir.join("unrelated.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_clean_scan_detects_nothing() {
        let dir = test_dir("clean");
        let state = perform_crash_recovery_scan(&SaveSlots::new(&dir));
        assert_eq!(state, CrashRecoveryState::default());
        let _ = fs::remove_dir_all(&dir);
    }
}
