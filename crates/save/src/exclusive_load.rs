use bevy::prelude::*;
use bevy::tasks::block_on;
use futures_lite::future;
use progression::scene::{SceneLoadRequest, SceneLoaded};
use progression::{ProgressionManager, SaveLoadState};

use crate::restore_resources::{restore_resources_from_save, RestoreScope};
use crate::save_plugin::{
    LoadMode, LoadOutcome, LoadOutcomeEvent, PendingLoad, PendingRestore, RestoreRequest,
};
use crate::save_slots::SaveSlots;
use crate::save_types::SaveRecord;

/// Polls the slot read started by `detect_load_events`. Runs while
/// `Loading`.
///
/// A missing or unreadable file resets the slot's record and goes back to
/// `Idle`. A decoded record replaces the slot's record, wipes the
/// progression map and asks the host for the target scene.
pub(crate) fn poll_load_task(
    mut pending: ResMut<PendingLoad>,
    mut slots: ResMut<SaveSlots>,
    mut manager: ResMut<ProgressionManager>,
    mut restore: ResMut<PendingRestore>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
    mut scene_requests: EventWriter<SceneLoadRequest>,
    mut outcomes: EventWriter<LoadOutcomeEvent>,
) {
    let Some(read) = pending.0.as_mut() else {
        // Nothing in flight; never stay stuck in Loading.
        next_state.set(SaveLoadState::Idle);
        return;
    };
    let Some(result) = block_on(future::poll_once(&mut read.task)) else {
        return;
    };
    let slot = read.slot;
    let mode = read.mode.clone();
    pending.0 = None;

    let record = match result {
        Ok(Some(record)) => record,
        Ok(None) => {
            info!("No save file for slot {slot}, nothing to load");
            reset_slot_record(&mut slots, slot);
            outcomes.send(LoadOutcomeEvent {
                slot,
                outcome: LoadOutcome::NoSaveFile,
            });
            next_state.set(SaveLoadState::Idle);
            return;
        }
        Err(e) => {
            warn!("Treating slot {slot} as empty, save file unreadable: {e}");
            reset_slot_record(&mut slots, slot);
            outcomes.send(LoadOutcomeEvent {
                slot,
                outcome: LoadOutcome::Corrupt(e.to_string()),
            });
            next_state.set(SaveLoadState::Idle);
            return;
        }
    };

    let (scope, scene_name) = match mode {
        LoadMode::Full => (RestoreScope::Full, record.scene.scene_name.clone()),
        LoadMode::NewLevel { scene_name } => (RestoreScope::NewLevel, scene_name),
    };
    if let Ok(stored) = slots.record_mut(slot) {
        *stored = record;
    }
    manager.wipe();

    if scene_name.is_empty() {
        // Saved before any scene was loaded: restore in place.
        restore.0 = Some(RestoreRequest {
            slot,
            scope,
            scene_name,
        });
        next_state.set(SaveLoadState::Restoring);
        return;
    }

    info!("Requesting scene '{scene_name}' for slot {slot}");
    scene_requests.send(SceneLoadRequest {
        scene_name: scene_name.clone(),
    });
    restore.0 = Some(RestoreRequest {
        slot,
        scope,
        scene_name,
    });
    next_state.set(SaveLoadState::AwaitingScene);
}

fn reset_slot_record(slots: &mut SaveSlots, slot: u8) {
    if let Ok(record) = slots.record_mut(slot) {
        *record = SaveRecord::default();
    }
}

/// Moves on to `Restoring` once the host reports the requested scene.
/// Runs while `AwaitingScene`.
pub(crate) fn await_scene_loaded(
    mut loaded: EventReader<SceneLoaded>,
    restore: Res<PendingRestore>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
) {
    let Some(request) = restore.0.as_ref() else {
        loaded.read().for_each(drop);
        next_state.set(SaveLoadState::Idle);
        return;
    };
    if loaded
        .read()
        .any(|ev| ev.scene_name == request.scene_name)
    {
        next_state.set(SaveLoadState::Restoring);
    }
}

/// Exclusive system that applies the loaded record to the freshly loaded
/// scene. Runs on `OnEnter(SaveLoadState::Restoring)`, then transitions back
/// to `Idle`.
pub(crate) fn exclusive_restore(world: &mut World) {
    if let Some(request) = world.resource_mut::<PendingRestore>().0.take() {
        let scope = RestoreScope::for_scene(request.scope, &request.scene_name);
        let record = world
            .resource::<SaveSlots>()
            .record(request.slot)
            .cloned()
            .unwrap_or_default();

        restore_resources_from_save(world, &record, scope);
        info!(
            "Restored slot {} into '{}' ({scope:?})",
            request.slot, request.scene_name
        );
        world.send_event(LoadOutcomeEvent {
            slot: request.slot,
            outcome: LoadOutcome::Restored,
        });
    } else {
        warn!("Entered Restoring with no pending restore");
    }

    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}
