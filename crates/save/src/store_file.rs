// ---------------------------------------------------------------------------
// Always-on JSON stores and their coalescing background writer
// ---------------------------------------------------------------------------
//
// Collectibles and the tutorial codex live outside the save slots. Each is a
// small pretty-printed JSON file that is written immediately after every
// change. Writes run on the IoTaskPool; a change made while a write is still
// in flight marks the store dirty and is flushed by one follow-up write.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy::tasks::{block_on, IoTaskPool, Task};
use futures_lite::future;
use serde::de::DeserializeOwned;

use crate::atomic_write::atomic_write;
use crate::save_error::SaveError;

/// A resource persisted to its own JSON file.
pub trait PersistentStore: Resource {
    /// Short name used in log lines.
    const NAME: &'static str;

    fn path(&self) -> &Path;

    fn to_json(&self) -> Result<String, SaveError>;
}

/// Parse a JSON store file. A missing file is `Ok(None)`.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SaveError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

/// Remove a store file, treating "already gone" as success.
pub fn remove_store_file(path: &Path) -> Result<(), SaveError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Pending write state for store `S`.
#[derive(Resource)]
pub struct StoreWriter<S: PersistentStore> {
    task: Option<Task<Result<PathBuf, SaveError>>>,
    dirty: bool,
    _store: PhantomData<fn() -> S>,
}

impl<S: PersistentStore> Default for StoreWriter<S> {
    fn default() -> Self {
        Self {
            task: None,
            dirty: false,
            _store: PhantomData,
        }
    }
}

impl<S: PersistentStore> StoreWriter<S> {
    /// Request a write of the current store contents.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_writing(&self) -> bool {
        self.task.is_some()
    }

    /// Whether nothing is in flight and nothing is queued.
    pub fn is_idle(&self) -> bool {
        self.task.is_none() && !self.dirty
    }

    /// Drop a queued write. An in-flight write still completes.
    pub fn cancel_pending(&mut self) {
        self.dirty = false;
    }
}

/// Polls the in-flight write and starts a new one when the store is dirty.
pub fn flush_store<S: PersistentStore>(store: Res<S>, mut writer: ResMut<StoreWriter<S>>) {
    if let Some(task) = writer.task.as_mut() {
        let Some(result) = block_on(future::poll_once(task)) else {
            return;
        };
        writer.task = None;
        match result {
            Ok(path) => debug!("Saved {} to {}", S::NAME, path.display()),
            Err(e) => error!("Failed to save {}: {e}", S::NAME),
        }
    }

    if !writer.dirty {
        return;
    }
    writer.dirty = false;

    let json = match store.to_json() {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to encode {}: {e}", S::NAME);
            return;
        }
    };
    let path = store.path().to_path_buf();
    writer.task = Some(IoTaskPool::get().spawn(async move {
        atomic_write(&path, json.as_bytes())?;
        Ok(path)
    }));
}
