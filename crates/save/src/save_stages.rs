// ---------------------------------------------------------------------------
// Save Stages: collecting game state into the save record
// ---------------------------------------------------------------------------
//
// Blocks are collected in a fixed order:
//
// ```text
//   World
//     |
//     +-- collect_player_stage       -> PlayerStageOutput (status, respawn, currency, inventory)
//     +-- SaveableRegistry::save_all -> extensions        (ability wheel, unlock state)
//     +-- collect_world_stage        -> WorldStageOutput  (scene pointer, progression map)
//     |
//     +---> assemble_save_record(stages...) -> SaveRecord
// ```
//
// Each `collect_*` function takes only the references it needs.

use std::collections::BTreeMap;

use progression::player::{PlayerCurrency, PlayerInventory, PlayerRespawn, PlayerStatus};
use progression::scene::CurrentScene;
use progression::ProgressionManager;

use crate::save_types::*;

pub struct PlayerStageOutput {
    pub status: SavePlayerStatus,
    pub respawn: SavePlayerRespawn,
    pub currency: SavePlayerCurrency,
    pub inventory: SavePlayerInventory,
}

pub struct WorldStageOutput {
    pub scene: SaveScene,
    pub progression: SaveProgression,
}

pub fn collect_player_stage(
    status: &PlayerStatus,
    respawn: &PlayerRespawn,
    currency: &PlayerCurrency,
    inventory: &PlayerInventory,
) -> PlayerStageOutput {
    let (item_names, item_counts) = inventory
        .consumables
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .unzip();

    PlayerStageOutput {
        status: SavePlayerStatus {
            health: status.health,
            max_health: status.max_health,
            energy: status.energy,
            max_energy: status.max_energy,
            energy_regen_rate: status.energy_regen_rate,
        },
        respawn: SavePlayerRespawn {
            position: respawn.position.to_array(),
            rotation: respawn.rotation.to_array(),
            checkpoint_name: respawn.checkpoint_name.clone(),
        },
        currency: SavePlayerCurrency {
            currency: currency.currency,
            max_currency: currency.max_currency,
        },
        inventory: SavePlayerInventory {
            item_names,
            item_counts,
            current_item_name: inventory.current.clone().unwrap_or_default(),
            current_item_count: inventory.current_count(),
        },
    }
}

pub fn collect_world_stage(scene: &CurrentScene, manager: &ProgressionManager) -> WorldStageOutput {
    let (ids, serialized_states) = manager.to_block();
    WorldStageOutput {
        scene: SaveScene {
            scene_name: scene.name.clone(),
        },
        progression: SaveProgression {
            ids,
            serialized_states,
        },
    }
}

pub fn assemble_save_record(
    player: PlayerStageOutput,
    world: WorldStageOutput,
    extensions: BTreeMap<String, Vec<u8>>,
) -> SaveRecord {
    SaveRecord {
        version: CURRENT_SAVE_VERSION,
        status: player.status,
        respawn: player.respawn,
        currency: player.currency,
        inventory: player.inventory,
        scene: world.scene,
        progression: world.progression,
        extensions,
    }
}
