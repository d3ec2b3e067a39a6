// ---------------------------------------------------------------------------
// ProgressionManager: per-scene map of unique ID -> serialized object state
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap};

use bevy::prelude::*;

use crate::error::ProgressionError;
use crate::progression_object::ProgressionObject;
use crate::unique_id::UniqueId;

/// Authoritative record of every progression object that asked to be saved
/// in the current scene.
///
/// Entries appear when an object changes state (`save_me`), are overwritten
/// by later saves of the same ID, and disappear on `unsave_me` or `wipe`.
/// The map is ordered by ID so the flattened block written to disk is
/// deterministic.
#[derive(Resource, Debug, Default)]
pub struct ProgressionManager {
    saved: BTreeMap<UniqueId, String>,
    /// Which key name claimed each ID in the live scene.
    owners: HashMap<UniqueId, String>,
}

impl ProgressionManager {
    /// Stores `obj`'s current state, replacing any earlier entry for its ID.
    ///
    /// Returns `false` (and stores nothing) for objects that are not
    /// saveable.
    pub fn save_me<T: ProgressionObject + ?Sized>(&mut self, obj: &T) -> bool {
        if !obj.is_saveable() {
            debug!(
                "Progression: {} '{}' is not saveable, skipping",
                obj.object_type().name(),
                obj.key_name()
            );
            return false;
        }
        let id = obj.unique_id();
        self.saved.remove(&id);
        self.saved.insert(id, obj.save_action());
        true
    }

    /// Drops `obj`'s entry. Returns whether one existed.
    pub fn unsave_me<T: ProgressionObject + ?Sized>(&mut self, obj: &T) -> bool {
        self.saved.remove(&obj.unique_id()).is_some()
    }

    pub fn get(&self, id: UniqueId) -> Option<&str> {
        self.saved.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: UniqueId) -> bool {
        self.saved.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Entries in ascending ID order.
    pub fn entries(&self) -> impl Iterator<Item = (UniqueId, &str)> {
        self.saved.iter().map(|(id, s)| (*id, s.as_str()))
    }

    /// Flattens the map into parallel `(ids, states)` arrays.
    pub fn to_block(&self) -> (Vec<u32>, Vec<String>) {
        self.saved
            .iter()
            .map(|(id, s)| (id.raw(), s.clone()))
            .unzip()
    }

    /// Merges parallel `(ids, states)` arrays into the map, overwriting any
    /// entry already present for the same ID.
    ///
    /// Arrays of different length are merged up to the shorter one.
    pub fn merge(&mut self, ids: &[u32], states: &[String]) {
        if ids.len() != states.len() {
            warn!(
                "Progression: saved block has {} ids but {} states, merging the first {}",
                ids.len(),
                states.len(),
                ids.len().min(states.len())
            );
        }
        for (id, state) in ids.iter().zip(states) {
            self.saved.insert(UniqueId(*id), state.clone());
        }
    }

    /// Pushes the stored state (if any) into a live object.
    ///
    /// Returns `Ok(false)` when there is no entry for the object, which
    /// leaves it in its default state.
    pub fn restore<T: ProgressionObject + ?Sized>(
        &self,
        obj: &mut T,
    ) -> Result<bool, ProgressionError> {
        match self.saved.get(&obj.unique_id()) {
            Some(data) => {
                obj.load_action(data)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Records that `owner` uses `id` in the live scene.
    ///
    /// Claiming the same ID again under the same name is fine; a different
    /// name means two objects would share one saved entry.
    pub fn claim_id(&mut self, id: UniqueId, owner: &str) -> Result<(), ProgressionError> {
        match self.owners.get(&id) {
            Some(existing) if existing != owner => Err(ProgressionError::IdCollision {
                id,
                existing: existing.clone(),
                incoming: owner.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.owners.insert(id, owner.to_string());
                Ok(())
            }
        }
    }

    /// Clears every entry and claim. Used on new game, scene change and
    /// before loading a save.
    pub fn wipe(&mut self) {
        self.saved.clear();
        self.owners.clear();
    }
}
