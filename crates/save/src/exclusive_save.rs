use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use progression::player::{PlayerCurrency, PlayerInventory, PlayerRespawn, PlayerStatus};
use progression::scene::CurrentScene;
use progression::{ProgressionManager, SaveLoadState, SaveableRegistry};

use crate::save_codec::{encode_record, write_record_file};
use crate::save_plugin::{PendingSave, SaveOutcome, SaveOutcomeEvent, SaveSettings, SlotWrite};
use crate::save_slots::SaveSlots;
use crate::save_stages::{assemble_save_record, collect_player_stage, collect_world_stage};

/// Exclusive system that collects the save record with full world access
/// and hands the encoded bytes to the IoTaskPool.
/// Runs on `OnEnter(SaveLoadState::Saving)`, then transitions back to `Idle`.
pub(crate) fn exclusive_save(world: &mut World) {
    // -- Stage 1: Player blocks --
    let player = collect_player_stage(
        world.resource::<PlayerStatus>(),
        world.resource::<PlayerRespawn>(),
        world.resource::<PlayerCurrency>(),
        world.resource::<PlayerInventory>(),
    );

    // -- Stage 2: Scene pointer and progression map --
    let stage = collect_world_stage(
        world.resource::<CurrentScene>(),
        world.resource::<ProgressionManager>(),
    );

    // -- Stage 3: Extension map via SaveableRegistry --
    let extensions = match world.get_resource::<SaveableRegistry>() {
        Some(registry) => registry.save_all(world),
        None => {
            warn!("SaveableRegistry missing, extension blocks not saved");
            Default::default()
        }
    };

    let record = assemble_save_record(player, stage, extensions);
    let compress = world.resource::<SaveSettings>().compress;

    // -- Stage 4: Store into the active slot and encode --
    let (slot, path) = {
        let mut slots = world.resource_mut::<SaveSlots>();
        *slots.active_record_mut() = record.clone();
        (slots.active_slot(), slots.active_path())
    };

    match encode_record(&record, compress) {
        Ok(bytes) => {
            debug!(
                "Encoded slot {slot}: {} progression entries, {} extension blocks, {} bytes",
                record.progression.len(),
                record.extensions.len(),
                bytes.len()
            );
            let task_path = path.clone();
            let task = IoTaskPool::get().spawn(async move { write_record_file(&task_path, &bytes) });
            world.resource_mut::<PendingSave>().0 = Some(SlotWrite { slot, path, task });
        }
        Err(e) => {
            error!("Save failed for slot {slot}: {e}");
            world.send_event(SaveOutcomeEvent {
                slot,
                outcome: SaveOutcome::Failed(e.to_string()),
            });
        }
    }

    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}
