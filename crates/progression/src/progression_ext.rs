// ---------------------------------------------------------------------------
// App extension for registering progression object component types
// ---------------------------------------------------------------------------

use bevy::prelude::*;

use crate::manager::ProgressionManager;
use crate::progression_object::{ProgressionEffect, ProgressionObject};

/// Asks every registered progression object type to pull its saved state
/// out of the [`ProgressionManager`]. Sent by the save system once the
/// manager map has been merged from a loaded record.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RestoreProgressionEvent;

/// Extension trait on `App` for one-line progression object registration.
///
/// ```ignore
/// use progression::ProgressionAppExt;
///
/// app.register_progression_object::<DoorState>();
/// ```
pub trait ProgressionAppExt {
    fn register_progression_object<T>(&mut self) -> &mut Self
    where
        T: Component + ProgressionObject;
}

impl ProgressionAppExt for App {
    fn register_progression_object<T>(&mut self) -> &mut Self
    where
        T: Component + ProgressionObject,
    {
        self.init_resource::<ProgressionManager>()
            .add_event::<RestoreProgressionEvent>()
            .add_event::<ProgressionEffect>()
            .add_systems(
                Update,
                (claim_progression_ids::<T>, restore_progression_objects::<T>),
            )
    }
}

/// Claims the unique ID of every newly spawned `T`, warning when two
/// differently named objects share an ID.
pub fn claim_progression_ids<T: Component + ProgressionObject>(
    spawned: Query<&T, Added<T>>,
    mut manager: ResMut<ProgressionManager>,
) {
    for obj in &spawned {
        if let Err(e) = manager.claim_id(obj.unique_id(), obj.key_name()) {
            warn!("Progression: {e}; their saved states will overwrite each other");
        }
    }
}

/// Applies saved state to every live `T` with an entry in the manager.
/// Objects without an entry keep their default state; objects whose blob
/// fails to parse are logged and also keep their default state.
pub fn restore_progression_objects<T: Component + ProgressionObject>(
    mut requests: EventReader<RestoreProgressionEvent>,
    manager: Res<ProgressionManager>,
    mut objects: Query<(Entity, &mut T)>,
    mut effects: EventWriter<ProgressionEffect>,
) {
    if requests.read().next().is_none() {
        return;
    }
    // Drain duplicates; one restore per frame is enough.
    requests.read().for_each(drop);

    for (entity, mut obj) in &mut objects {
        match manager.restore(&mut *obj) {
            Ok(true) => {
                let id = obj.unique_id();
                for kind in obj.restored_effects() {
                    effects.send(ProgressionEffect {
                        entity,
                        id,
                        kind,
                        from_load: true,
                    });
                }
            }
            Ok(false) => {}
            Err(e) => warn!("Progression: {e}; keeping default state"),
        }
    }
}
