use bevy::prelude::*;
use progression::player::{PlayerCurrency, PlayerInventory, PlayerRespawn, PlayerStatus};
use progression::{ProgressionManager, SaveLoadState, SaveableRegistry};

use crate::save_slots::SaveSlots;
use crate::save_types::SaveRecord;

/// Exclusive system that resets progression and player state for a new
/// game. Slot files are left alone; only the active slot's in-memory record
/// is cleared. Runs on `OnEnter(SaveLoadState::NewGame)`, then transitions
/// back to `Idle`.
pub(crate) fn exclusive_new_game(world: &mut World) {
    // -- Stage 1: Progression map --
    world.resource_mut::<ProgressionManager>().wipe();

    // -- Stage 2: Player resources --
    world.insert_resource(PlayerStatus::default());
    world.insert_resource(PlayerRespawn::default());
    world.insert_resource(PlayerCurrency::default());
    world.insert_resource(PlayerInventory::default());

    // -- Stage 3: Extension-registered resources via SaveableRegistry --
    match world.remove_resource::<SaveableRegistry>() {
        Some(registry) => {
            registry.reset_all(world);
            world.insert_resource(registry);
        }
        None => warn!("SaveableRegistry missing, extension resources not reset"),
    }

    // -- Stage 4: Active slot record --
    let slot = {
        let mut slots = world.resource_mut::<SaveSlots>();
        *slots.active_record_mut() = SaveRecord::default();
        slots.active_slot()
    };

    info!("New game started in slot {slot}");

    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}
