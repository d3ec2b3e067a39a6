use bevy::prelude::*;
use progression::player::{
    ConsumableCatalog, PlayerCurrency, PlayerInventory, PlayerRespawn, PlayerStatus,
};
use progression::scene::MAIN_MENU_SCENE;
use progression::{ProgressionManager, RestoreProgressionEvent, SaveableRegistry};

use crate::save_types::*;

/// Which blocks of a loaded record are pushed back into the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreScope {
    /// Continue from a save: everything, including respawn point and
    /// progression objects.
    Full,
    /// Level transition: player stats, inventory and abilities carry over;
    /// the new scene starts with default trigger states.
    NewLevel,
    /// Returning to the title screen restores nothing.
    MainMenu,
}

impl RestoreScope {
    /// The main menu overrides whatever scope was requested.
    pub fn for_scene(requested: RestoreScope, scene_name: &str) -> RestoreScope {
        if scene_name == MAIN_MENU_SCENE {
            RestoreScope::MainMenu
        } else {
            requested
        }
    }
}

pub fn restore_player_status(status: &mut PlayerStatus, save: &SavePlayerStatus) {
    status.max_health = save.max_health;
    status.health = save.health;
    status.max_energy = save.max_energy;
    status.energy = save.energy;
    status.energy_regen_rate = save.energy_regen_rate;
}

pub fn restore_respawn(respawn: &mut PlayerRespawn, save: &SavePlayerRespawn) {
    respawn.position = Vec3::from_array(save.position);
    respawn.rotation = Vec3::from_array(save.rotation);
    respawn.checkpoint_name = save.checkpoint_name.clone();
}

pub fn restore_currency(currency: &mut PlayerCurrency, save: &SavePlayerCurrency) {
    currency.max_currency = save.max_currency;
    currency.currency = save.currency;
}

/// Rebuilds the inventory from the parallel arrays, dropping items this
/// build no longer knows about.
pub fn restore_inventory(
    inventory: &mut PlayerInventory,
    save: &SavePlayerInventory,
    catalog: &ConsumableCatalog,
) {
    inventory.consumables.clear();
    inventory.current = None;

    for (name, count) in save.item_names.iter().zip(&save.item_counts) {
        if catalog.accepts(name) {
            inventory.consumables.insert(name.clone(), *count);
        } else {
            warn!("Dropping unknown consumable '{name}' from saved inventory");
        }
    }

    if !save.current_item_name.is_empty() && catalog.accepts(&save.current_item_name) {
        inventory
            .consumables
            .entry(save.current_item_name.clone())
            .or_insert(save.current_item_count);
        inventory.current = Some(save.current_item_name.clone());
    }
}

/// Pushes the blocks selected by `scope` into the world, in the fixed order
/// progression, status, respawn, currency, inventory, extensions.
///
/// Progression objects are restored by their own systems once
/// `RestoreProgressionEvent` is read.
pub(crate) fn restore_resources_from_save(
    world: &mut World,
    record: &SaveRecord,
    scope: RestoreScope,
) {
    if scope == RestoreScope::MainMenu {
        return;
    }

    if scope == RestoreScope::Full {
        world
            .resource_mut::<ProgressionManager>()
            .merge(&record.progression.ids, &record.progression.serialized_states);
        world.send_event(RestoreProgressionEvent);
    }

    restore_player_status(&mut world.resource_mut::<PlayerStatus>(), &record.status);

    if scope == RestoreScope::Full {
        restore_respawn(&mut world.resource_mut::<PlayerRespawn>(), &record.respawn);
    }

    restore_currency(&mut world.resource_mut::<PlayerCurrency>(), &record.currency);

    let catalog = world.resource::<ConsumableCatalog>().clone();
    restore_inventory(
        &mut world.resource_mut::<PlayerInventory>(),
        &record.inventory,
        &catalog,
    );

    match world.remove_resource::<SaveableRegistry>() {
        Some(registry) => {
            registry.load_all(world, &record.extensions);
            world.insert_resource(registry);
        }
        None => warn!("SaveableRegistry missing, extension blocks not restored"),
    }
}
