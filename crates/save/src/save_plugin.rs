use std::path::PathBuf;

use bevy::prelude::*;
use bevy::tasks::{block_on, IoTaskPool, Task};
use futures_lite::future;
use progression::{ProgressionPlugin, SaveLoadState};

use crate::collectibles::CollectiblesStore;
use crate::restore_resources::RestoreScope;
use crate::save_codec::read_record_file;
use crate::save_error::SaveError;
use crate::save_slots::{SaveSlots, SLOT_COUNT};
use crate::save_types::SaveRecord;
use crate::store_file::{flush_store, StoreWriter};
use crate::tutorial_codex::TutorialCodexStore;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Resource, Debug, Clone)]
pub struct SaveSettings {
    /// lz4-compress slot files.
    pub compress: bool,
}

// ---------------------------------------------------------------------------
// In-flight work
// ---------------------------------------------------------------------------

/// Slot write running on the IoTaskPool.
pub(crate) struct SlotWrite {
    pub(crate) slot: u8,
    pub(crate) path: PathBuf,
    pub(crate) task: Task<Result<usize, SaveError>>,
}

#[derive(Resource, Default)]
pub(crate) struct PendingSave(pub(crate) Option<SlotWrite>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoadMode {
    Full,
    NewLevel { scene_name: String },
}

/// Slot read + decode running on the IoTaskPool.
pub(crate) struct SlotRead {
    pub(crate) slot: u8,
    pub(crate) mode: LoadMode,
    pub(crate) task: Task<Result<Option<SaveRecord>, SaveError>>,
}

#[derive(Resource, Default)]
pub(crate) struct PendingLoad(pub(crate) Option<SlotRead>);

/// A decoded record waiting for its scene before it is applied.
#[derive(Debug, Clone)]
pub(crate) struct RestoreRequest {
    pub(crate) slot: u8,
    pub(crate) scope: RestoreScope,
    pub(crate) scene_name: String,
}

#[derive(Resource, Default)]
pub(crate) struct PendingRestore(pub(crate) Option<RestoreRequest>);

/// Set by `WipeGameDataEvent`; applied once no write is in flight.
#[derive(Resource, Default)]
pub(crate) struct WipeRequested(pub(crate) bool);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Save the active slot.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveGameEvent;

/// Load the active slot, including its scene and progression objects.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct LoadGameEvent;

/// Move to another scene, carrying player stats over from the active slot.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct LoadNewLevelEvent {
    pub scene_name: String,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct NewGameEvent;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteSaveEvent {
    pub slot: u8,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectibleObtainedEvent(pub usize);

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct TutorialUnlockedEvent(pub String);

/// Delete every slot file and both stores.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct WipeGameDataEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written { bytes: usize },
    Failed(String),
    /// Another save or load was still running.
    Rejected,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcomeEvent {
    pub slot: u8,
    pub outcome: SaveOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Restored,
    /// No file for the slot; the record was reset to defaults.
    NoSaveFile,
    /// The file could not be read or decoded and was treated as absent.
    Corrupt(String),
    /// Another save or load was still running.
    Rejected,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcomeEvent {
    pub slot: u8,
    pub outcome: LoadOutcome,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Persistence for the progression stack: three save slots plus the
/// collectibles and tutorial-codex stores, all under `save_dir`.
pub struct SavePlugin {
    pub save_dir: PathBuf,
    pub compress: bool,
}

impl Default for SavePlugin {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            compress: true,
        }
    }
}

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<ProgressionPlugin>() {
            app.add_plugins(ProgressionPlugin);
        }

        app.insert_resource(SaveSlots::new(self.save_dir.clone()))
            .insert_resource(SaveSettings {
                compress: self.compress,
            })
            .insert_resource(CollectiblesStore::load(&self.save_dir))
            .insert_resource(TutorialCodexStore::load(&self.save_dir))
            .init_resource::<StoreWriter<CollectiblesStore>>()
            .init_resource::<StoreWriter<TutorialCodexStore>>()
            .init_resource::<PendingSave>()
            .init_resource::<PendingLoad>()
            .init_resource::<PendingRestore>()
            .init_resource::<WipeRequested>()
            .add_event::<SaveGameEvent>()
            .add_event::<LoadGameEvent>()
            .add_event::<LoadNewLevelEvent>()
            .add_event::<NewGameEvent>()
            .add_event::<DeleteSaveEvent>()
            .add_event::<CollectibleObtainedEvent>()
            .add_event::<TutorialUnlockedEvent>()
            .add_event::<WipeGameDataEvent>()
            .add_event::<SaveOutcomeEvent>()
            .add_event::<LoadOutcomeEvent>();

        app.add_systems(Startup, crate::crash_recovery::detect_crash_artifacts);

        // Request detection and background I/O polling. Loads are detected
        // first so a load and a save in the same frame resolve to the load.
        app.add_systems(
            Update,
            (
                detect_wipe_event,
                detect_load_events,
                detect_save_event,
                detect_new_game_event,
                poll_save_task,
                handle_delete_events,
                handle_collectible_events,
                handle_tutorial_events,
                apply_pending_wipe,
                flush_store::<CollectiblesStore>,
                flush_store::<TutorialCodexStore>,
            )
                .chain(),
        );
        app.add_systems(
            Update,
            (
                crate::exclusive_load::poll_load_task.run_if(in_state(SaveLoadState::Loading)),
                crate::exclusive_load::await_scene_loaded
                    .run_if(in_state(SaveLoadState::AwaitingScene)),
            ),
        );

        // Exclusive systems run on state entry, do their work with full
        // world access, and move the state machine on.
        app.add_systems(
            OnEnter(SaveLoadState::Saving),
            crate::exclusive_save::exclusive_save,
        );
        app.add_systems(
            OnEnter(SaveLoadState::Restoring),
            crate::exclusive_load::exclusive_restore,
        );
        app.add_systems(
            OnEnter(SaveLoadState::NewGame),
            crate::exclusive_new_game::exclusive_new_game,
        );

        app.add_plugins(crate::checkpoint_bridge::CheckpointBridgePlugin);
    }
}

// ---------------------------------------------------------------------------
// Request detection
// ---------------------------------------------------------------------------

/// Whether a save, load or new game must be refused this frame. A
/// requested wipe counts as busy until it has been applied.
pub(crate) fn save_system_busy(
    state: &State<SaveLoadState>,
    next_state: &NextState<SaveLoadState>,
    pending_save: &PendingSave,
    pending_load: &PendingLoad,
    wipe: &WipeRequested,
) -> bool {
    *state.get() != SaveLoadState::Idle
        || matches!(next_state, NextState::Pending(_))
        || pending_save.0.is_some()
        || pending_load.0.is_some()
        || wipe.0
}

/// Detects `SaveGameEvent` and moves to `Saving`, or rejects the request
/// while another operation is running. Several requests in one frame
/// collapse into one save.
#[allow(clippy::too_many_arguments)]
pub(crate) fn detect_save_event(
    mut events: EventReader<SaveGameEvent>,
    state: Res<State<SaveLoadState>>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
    pending_save: Res<PendingSave>,
    pending_load: Res<PendingLoad>,
    wipe: Res<WipeRequested>,
    slots: Res<SaveSlots>,
    mut outcomes: EventWriter<SaveOutcomeEvent>,
) {
    if events.read().next().is_none() {
        return;
    }
    events.read().for_each(drop);

    if save_system_busy(&state, &next_state, &pending_save, &pending_load, &wipe) {
        warn!("Save rejected: {}", SaveError::SaveInProgress);
        outcomes.send(SaveOutcomeEvent {
            slot: slots.active_slot(),
            outcome: SaveOutcome::Rejected,
        });
        return;
    }
    next_state.set(SaveLoadState::Saving);
}

/// Detects `NewGameEvent` and moves to `NewGame`.
fn detect_new_game_event(
    mut events: EventReader<NewGameEvent>,
    state: Res<State<SaveLoadState>>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
    pending_save: Res<PendingSave>,
    pending_load: Res<PendingLoad>,
    wipe: Res<WipeRequested>,
) {
    if events.read().next().is_none() {
        return;
    }
    events.read().for_each(drop);

    if save_system_busy(&state, &next_state, &pending_save, &pending_load, &wipe) {
        warn!("New game ignored: {}", SaveError::SaveInProgress);
        return;
    }
    next_state.set(SaveLoadState::NewGame);
}

/// Detects `LoadGameEvent` / `LoadNewLevelEvent`, starts reading the active
/// slot on the IoTaskPool and moves to `Loading`. A full load wins over a
/// level transition requested in the same frame.
#[allow(clippy::too_many_arguments)]
fn detect_load_events(
    mut loads: EventReader<LoadGameEvent>,
    mut new_levels: EventReader<LoadNewLevelEvent>,
    state: Res<State<SaveLoadState>>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
    pending_save: Res<PendingSave>,
    mut pending_load: ResMut<PendingLoad>,
    wipe: Res<WipeRequested>,
    slots: Res<SaveSlots>,
    mut outcomes: EventWriter<LoadOutcomeEvent>,
) {
    let full = loads.read().count() > 0;
    let new_level = new_levels.read().last().map(|e| e.scene_name.clone());
    let mode = match (full, new_level) {
        (true, _) => LoadMode::Full,
        (false, Some(scene_name)) => LoadMode::NewLevel { scene_name },
        (false, None) => return,
    };

    let slot = slots.active_slot();
    if save_system_busy(&state, &next_state, &pending_save, &pending_load, &wipe) {
        warn!("Load rejected: {}", SaveError::SaveInProgress);
        outcomes.send(LoadOutcomeEvent {
            slot,
            outcome: LoadOutcome::Rejected,
        });
        return;
    }

    let path = slots.active_path();
    info!("Loading slot {slot} from {} ({mode:?})", path.display());
    let task = IoTaskPool::get().spawn(async move { read_record_file(&path) });
    pending_load.0 = Some(SlotRead { slot, mode, task });
    next_state.set(SaveLoadState::Loading);
}

// ---------------------------------------------------------------------------
// Background I/O
// ---------------------------------------------------------------------------

/// Reports a finished slot write.
fn poll_save_task(mut pending: ResMut<PendingSave>, mut outcomes: EventWriter<SaveOutcomeEvent>) {
    let Some(write) = pending.0.as_mut() else {
        return;
    };
    let Some(result) = block_on(future::poll_once(&mut write.task)) else {
        return;
    };
    let slot = write.slot;
    let outcome = match result {
        Ok(bytes) => {
            info!("Saved slot {slot} ({bytes} bytes) to {}", write.path.display());
            SaveOutcome::Written { bytes }
        }
        Err(e) => {
            error!("Save failed for slot {slot} ({}): {e}", write.path.display());
            SaveOutcome::Failed(e.to_string())
        }
    };
    pending.0 = None;
    outcomes.send(SaveOutcomeEvent { slot, outcome });
}

// ---------------------------------------------------------------------------
// Slot and store management
// ---------------------------------------------------------------------------

fn handle_delete_events(
    mut events: EventReader<DeleteSaveEvent>,
    mut slots: ResMut<SaveSlots>,
    pending_save: Res<PendingSave>,
) {
    for ev in events.read() {
        if pending_save.0.as_ref().is_some_and(|w| w.slot == ev.slot) {
            warn!("Not deleting slot {} while it is being written", ev.slot);
            continue;
        }
        match slots.delete_slot(ev.slot) {
            Ok(true) => info!("Deleted save slot {}", ev.slot),
            Ok(false) => debug!("Save slot {} had no file to delete", ev.slot),
            Err(e) => warn!("Failed to delete save slot {}: {e}", ev.slot),
        }
    }
}

fn handle_collectible_events(
    mut events: EventReader<CollectibleObtainedEvent>,
    mut store: ResMut<CollectiblesStore>,
    mut writer: ResMut<StoreWriter<CollectiblesStore>>,
) {
    for CollectibleObtainedEvent(index) in events.read() {
        match store.obtain(*index) {
            Ok(true) => writer.mark_dirty(),
            Ok(false) => {}
            Err(e) => warn!("Ignoring collectible event: {e}"),
        }
    }
}

fn handle_tutorial_events(
    mut events: EventReader<TutorialUnlockedEvent>,
    mut codex: ResMut<TutorialCodexStore>,
    mut writer: ResMut<StoreWriter<TutorialCodexStore>>,
) {
    for TutorialUnlockedEvent(name) in events.read() {
        if codex.unlock(name) {
            writer.mark_dirty();
        }
    }
}

/// Records a `WipeGameDataEvent` before any save, load or new game request
/// of the same frame is looked at, so those are refused until the wipe is
/// done. Queued store writes are dropped.
fn detect_wipe_event(
    mut events: EventReader<WipeGameDataEvent>,
    mut requested: ResMut<WipeRequested>,
    mut collectibles_writer: ResMut<StoreWriter<CollectiblesStore>>,
    mut codex_writer: ResMut<StoreWriter<TutorialCodexStore>>,
) {
    if events.read().count() == 0 {
        return;
    }
    requested.0 = true;
    collectibles_writer.cancel_pending();
    codex_writer.cancel_pending();
}

/// Wipes every slot and store once no slot or store write is in flight, so
/// a finishing write cannot recreate a deleted file.
fn apply_pending_wipe(
    mut requested: ResMut<WipeRequested>,
    pending_save: Res<PendingSave>,
    mut slots: ResMut<SaveSlots>,
    mut collectibles: ResMut<CollectiblesStore>,
    mut codex: ResMut<TutorialCodexStore>,
    collectibles_writer: Res<StoreWriter<CollectiblesStore>>,
    codex_writer: Res<StoreWriter<TutorialCodexStore>>,
) {
    if !requested.0
        || pending_save.0.is_some()
        || collectibles_writer.is_writing()
        || codex_writer.is_writing()
    {
        return;
    }
    requested.0 = false;

    if let Err(e) = collectibles.wipe() {
        warn!("Failed to delete collectibles file: {e}");
    }
    if let Err(e) = codex.wipe() {
        warn!("Failed to delete tutorial codex file: {e}");
    }
    for slot in 0..SLOT_COUNT {
        if let Err(e) = slots.delete_slot(slot) {
            warn!("Failed to delete save slot {slot}: {e}");
        }
    }
    slots.reset_records();
    info!("Wiped all game data in {}", slots.dir().display());
}
