//! Bridge between checkpoints and the save system.
//!
//! Reaching a checkpoint moves the respawn point there and saves the active
//! slot. If the save system is busy the save is held back and fired on the
//! first idle frame, so a checkpoint is never silently dropped.

use bevy::prelude::*;
use progression::player::PlayerRespawn;
use progression::scene::CheckpointReached;
use progression::SaveLoadState;

use crate::save_plugin::{PendingSave, SaveGameEvent};

/// Set when a checkpoint still needs its save.
#[derive(Resource, Default)]
struct CheckpointSavePending(bool);

/// Records the latest checkpoint as the respawn point.
fn record_checkpoint(
    mut checkpoints: EventReader<CheckpointReached>,
    mut respawn: ResMut<PlayerRespawn>,
    mut pending: ResMut<CheckpointSavePending>,
) {
    let Some(latest) = checkpoints.read().last() else {
        return;
    };
    respawn.position = latest.position;
    respawn.rotation = latest.rotation;
    respawn.checkpoint_name = latest.name.clone();
    pending.0 = true;
    debug!("Checkpoint '{}' reached", latest.name);
}

/// Fires the held-back save once nothing else is running.
fn trigger_checkpoint_save(
    mut pending: ResMut<CheckpointSavePending>,
    mut save_events: EventWriter<SaveGameEvent>,
    state: Res<State<SaveLoadState>>,
    pending_save: Res<PendingSave>,
) {
    if !pending.0 {
        return;
    }
    if *state.get() != SaveLoadState::Idle || pending_save.0.is_some() {
        return;
    }
    pending.0 = false;
    save_events.send(SaveGameEvent);
}

pub(crate) struct CheckpointBridgePlugin;

impl Plugin for CheckpointBridgePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CheckpointSavePending>().add_systems(
            Update,
            (record_checkpoint, trigger_checkpoint_save)
                .chain()
                .before(crate::save_plugin::detect_save_event),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    fn bridge_app() -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<SaveLoadState>()
            .init_resource::<PlayerRespawn>()
            .init_resource::<PendingSave>()
            .add_event::<CheckpointReached>()
            .add_event::<SaveGameEvent>()
            .init_resource::<CheckpointSavePending>()
            .add_systems(Update, (record_checkpoint, trigger_checkpoint_save).chain());
        app
    }

    fn save_requests(app: &App) -> usize {
        app.world()
            .resource::<Events<SaveGameEvent>>()
            .iter_current_update_events()
            .count()
    }

    #[test]
    fn test_checkpoint_updates_respawn_and_requests_save() {
        let mut app = bridge_app();
        app.world_mut().send_event(CheckpointReached {
            name: "Bridge".to_string(),
            position: Vec3::new(3.0, 1.0, -7.0),
            rotation: Vec3::new(0.0, 45.0, 0.0),
        });
        app.update();

        let respawn = app.world().resource::<PlayerRespawn>();
        assert_eq!(respawn.checkpoint_name, "Bridge");
        assert_eq!(respawn.position, Vec3::new(3.0, 1.0, -7.0));
        assert_eq!(save_requests(&app), 1);
    }

    #[test]
    fn test_save_held_while_busy() {
        let mut app = bridge_app();
        app.world_mut()
            .resource_mut::<NextState<SaveLoadState>>()
            .set(SaveLoadState::Saving);
        app.update();

        app.world_mut().send_event(CheckpointReached {
            name: "Gate".to_string(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        });
        app.update();
        assert_eq!(save_requests(&app), 0);
        assert!(app.world().resource::<CheckpointSavePending>().0);

        app.world_mut()
            .resource_mut::<NextState<SaveLoadState>>()
            .set(SaveLoadState::Idle);
        app.update();
        assert_eq!(save_requests(&app), 1);
        assert!(!app.world().resource::<CheckpointSavePending>().0);
    }
}
