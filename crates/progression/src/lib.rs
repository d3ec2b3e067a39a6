pub mod abilities;
pub mod error;
pub mod manager;
pub mod object_type;
pub mod player;
pub mod progression_ext;
pub mod progression_object;
pub mod save_load_state;
pub mod scene;
pub mod triggers;
pub mod unique_id;

use std::collections::BTreeMap;

use bevy::prelude::*;

pub use error::ProgressionError;
pub use manager::ProgressionManager;
pub use object_type::ObjectType;
pub use progression_ext::{ProgressionAppExt, RestoreProgressionEvent};
pub use progression_object::{EffectKind, ProgressionEffect, ProgressionObject};
pub use save_load_state::SaveLoadState;
pub use unique_id::{generate_id, IdKey, UniqueId};

/// A player-wide resource persisted as one blob in the record's extension map.
///
/// Unlocks, the ability wheel and similar blocks live here instead of as
/// fixed record fields, so the record format does not change when one is added.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Extension-map key. Renaming it orphans every existing save.
    const SAVE_KEY: &'static str;

    /// `None` leaves the key out of the record.
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Bitcode decode for `Saveable::load_from_bytes`. A blob that does not
/// decode is logged and replaced by `T::default()`.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    bitcode::decode(bytes).unwrap_or_else(|e| {
        warn!(
            "Extension block '{key}' ({} bytes) is unreadable, using defaults: {e}",
            bytes.len()
        );
        T::default()
    })
}

pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;
pub type ResetFn = Box<dyn Fn(&mut World) + Send + Sync>;

/// One registered `Saveable`, with its type erased.
pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
    pub reset_fn: ResetFn,
}

/// Every `Saveable` known to the app, in registration order.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Keys must be unique: a repeated `SAVE_KEY` keeps the first entry,
    /// warns, and fails a debug assertion.
    pub fn register<T: Saveable>(&mut self) {
        if self.entries.iter().any(|e| e.key == T::SAVE_KEY) {
            warn!("Extension key '{}' registered twice, keeping the first", T::SAVE_KEY);
            debug_assert!(false, "extension key '{}' registered twice", T::SAVE_KEY);
            return;
        }
        self.entries.push(SaveableEntry {
            key: T::SAVE_KEY.to_string(),
            save_fn: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(T::save_to_bytes)
            }),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                world.insert_resource(T::load_from_bytes(bytes))
            }),
            reset_fn: Box::new(|world: &mut World| world.insert_resource(T::default())),
        });
    }

    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        self.entries
            .iter()
            .filter_map(|entry| Some((entry.key.clone(), (entry.save_fn)(world)?)))
            .collect()
    }

    /// Resources whose key is absent are reset to their default, so one
    /// slot's unlocks never leak into another slot's load.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            match extensions.get(&entry.key) {
                Some(bytes) => (entry.load_fn)(world, bytes),
                None => (entry.reset_fn)(world),
            }
        }
    }

    /// New game: every registered resource goes back to `Default`.
    pub fn reset_all(&self, world: &mut World) {
        for entry in &self.entries {
            (entry.reset_fn)(world);
        }
    }
}

/// Extension trait on `App` for one-line saveable registration.
pub trait SaveableAppExt {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self;
}

impl SaveableAppExt for App {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self {
        self.init_resource::<T>();
        self.init_resource::<SaveableRegistry>();
        self.world_mut()
            .resource_mut::<SaveableRegistry>()
            .register::<T>();
        self
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Game-side progression state: player resources, trigger objects, the
/// progression manager and the save/load state machine.
pub struct ProgressionPlugin;

impl Plugin for ProgressionPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SaveLoadState>()
            .init_resource::<player::PlayerStatus>()
            .init_resource::<player::PlayerRespawn>()
            .init_resource::<player::PlayerCurrency>()
            .init_resource::<player::PlayerInventory>()
            .init_resource::<player::ConsumableCatalog>()
            .init_resource::<scene::CurrentScene>()
            .add_event::<triggers::TriggerEntered>()
            .add_event::<triggers::ActivateTrigger>()
            .add_event::<triggers::BossDefeated>()
            .add_event::<triggers::PickupCollected>()
            .add_event::<scene::SceneLoadRequest>()
            .add_event::<scene::SceneLoaded>()
            .add_event::<scene::CheckpointReached>()
            .register_saveable::<abilities::UnlockState>()
            .register_saveable::<abilities::AbilityWheel>()
            .register_progression_object::<triggers::GameEvent>()
            .register_progression_object::<triggers::BossTrigger>()
            .register_progression_object::<triggers::Pickup>()
            .add_systems(
                Update,
                (
                    triggers::fire_game_events,
                    triggers::run_boss_triggers,
                    triggers::collect_pickups,
                )
                    .run_if(in_state(SaveLoadState::Idle)),
            )
            .add_systems(Update, scene::track_current_scene);
    }
}
