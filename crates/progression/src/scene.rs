// ---------------------------------------------------------------------------
// Scene pointer and scene hand-off with the host game
// ---------------------------------------------------------------------------
//
// The save system never loads scenes itself. It asks the host with
// `SceneLoadRequest` and waits for the matching `SceneLoaded` before any
// state that lives on scene objects is restored.

use bevy::prelude::*;

use crate::manager::ProgressionManager;
use crate::save_load_state::SaveLoadState;

/// Scene name used by the title screen. Loading it never restores player
/// state.
pub const MAIN_MENU_SCENE: &str = "mainMenu";

/// Unique name of the scene the player is in.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Default)]
pub struct CurrentScene {
    pub name: String,
}

/// Asks the host to load a scene.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SceneLoadRequest {
    pub scene_name: String,
}

/// Sent by the host once a scene has finished loading and its objects are
/// spawned.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SceneLoaded {
    pub scene_name: String,
}

/// The player touched a checkpoint. Updates the respawn point and saves.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CheckpointReached {
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
}

/// Keeps `CurrentScene` in step with what the host reports.
///
/// A scene change while `Idle` (one the host drove itself) also wipes the
/// progression map so the previous scene's entries never reach the new
/// scene's save. Loads wipe the map themselves before restoring into it.
pub fn track_current_scene(
    mut loaded: EventReader<SceneLoaded>,
    mut current: ResMut<CurrentScene>,
    mut manager: ResMut<ProgressionManager>,
    state: Res<State<SaveLoadState>>,
) {
    let Some(ev) = loaded.read().last() else {
        return;
    };
    if ev.scene_name == current.name {
        return;
    }
    if *state.get() == SaveLoadState::Idle {
        if !manager.is_empty() {
            debug!(
                "Scene changed from '{}' to '{}', dropping {} progression entries",
                current.name,
                ev.scene_name,
                manager.len()
            );
        }
        manager.wipe();
    }
    current.name = ev.scene_name.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression_object::ProgressionObject;
    use crate::triggers::GameEvent;
    use bevy::state::app::StatesPlugin;

    fn scene_app() -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<SaveLoadState>()
            .init_resource::<CurrentScene>()
            .init_resource::<ProgressionManager>()
            .add_event::<SceneLoaded>()
            .add_systems(Update, track_current_scene);
        app
    }

    fn enter_scene(app: &mut App, name: &str) {
        app.world_mut().send_event(SceneLoaded {
            scene_name: name.to_string(),
        });
        app.update();
    }

    fn remember_triggered_event(app: &mut App, name: &str) {
        let mut event = GameEvent::story(name);
        event.fire();
        app.world_mut()
            .resource_mut::<ProgressionManager>()
            .save_me(&event);
    }

    #[test]
    fn test_host_scene_change_starts_with_empty_map() {
        let mut app = scene_app();
        enter_scene(&mut app, "Forest");
        remember_triggered_event(&mut app, "Door1");

        enter_scene(&mut app, "Caves");

        assert_eq!(app.world().resource::<CurrentScene>().name, "Caves");
        assert!(app.world().resource::<ProgressionManager>().is_empty());
    }

    #[test]
    fn test_scene_change_releases_id_claims() {
        let mut app = scene_app();
        enter_scene(&mut app, "Forest");
        let id = GameEvent::story("Door1").unique_id();
        app.world_mut()
            .resource_mut::<ProgressionManager>()
            .claim_id(id, "Door1")
            .unwrap();

        enter_scene(&mut app, "Caves");

        // A different object may reuse the ID in the new scene.
        assert!(app
            .world_mut()
            .resource_mut::<ProgressionManager>()
            .claim_id(id, "CaveGate")
            .is_ok());
    }

    #[test]
    fn test_same_scene_reload_keeps_map() {
        let mut app = scene_app();
        enter_scene(&mut app, "Forest");
        remember_triggered_event(&mut app, "Door1");

        enter_scene(&mut app, "Forest");

        assert_eq!(app.world().resource::<ProgressionManager>().len(), 1);
    }

    #[test]
    fn test_scene_change_during_load_keeps_map() {
        let mut app = scene_app();
        enter_scene(&mut app, "Forest");
        app.world_mut()
            .resource_mut::<NextState<SaveLoadState>>()
            .set(SaveLoadState::Restoring);
        app.update();
        remember_triggered_event(&mut app, "Door1");

        enter_scene(&mut app, "Caves");

        assert_eq!(app.world().resource::<CurrentScene>().name, "Caves");
        assert_eq!(app.world().resource::<ProgressionManager>().len(), 1);
    }
}
