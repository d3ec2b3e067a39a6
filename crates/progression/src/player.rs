// ---------------------------------------------------------------------------
// Player state that travels with a save slot
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;

/// Health and energy pools.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub health: i32,
    pub max_health: i32,
    pub energy: f32,
    pub max_energy: f32,
    pub energy_regen_rate: f32,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self {
            health: 100,
            max_health: 100,
            energy: 0.0,
            max_energy: 100.0,
            energy_regen_rate: 10.0,
        }
    }
}

impl PlayerStatus {
    /// Health back to max, energy emptied.
    pub fn reset(&mut self) {
        self.health = self.max_health;
        self.energy = 0.0;
    }

    pub fn modify_health(&mut self, change: i32) {
        self.health = self.health.saturating_add(change).clamp(0, self.max_health);
    }

    pub fn modify_energy(&mut self, change: f32) {
        self.energy = (self.energy + change).clamp(0.0, self.max_energy);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// Where the player comes back after death or on load.
#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub struct PlayerRespawn {
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub checkpoint_name: String,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerCurrency {
    pub currency: i32,
    pub max_currency: i32,
}

impl Default for PlayerCurrency {
    fn default() -> Self {
        Self {
            currency: 0,
            max_currency: 500,
        }
    }
}

impl PlayerCurrency {
    pub fn add(&mut self, amount: i32) {
        self.currency = self.currency.saturating_add(amount).clamp(0, self.max_currency);
    }

    /// Spends `price` if affordable. Returns whether the purchase went
    /// through. Negative prices are refused.
    pub fn spend(&mut self, price: i32) -> bool {
        if price < 0 || price > self.currency {
            return false;
        }
        self.currency -= price;
        true
    }
}

/// Names of every consumable this build knows about. Saved inventories are
/// filtered through it so renamed or removed items do not resurrect.
#[derive(Resource, Debug, Clone, Default)]
pub struct ConsumableCatalog {
    names: BTreeSet<String>,
}

impl ConsumableCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// An empty catalog accepts every item name.
    pub fn accepts(&self, name: &str) -> bool {
        self.names.is_empty() || self.contains(name)
    }
}

/// Consumables carried by the player, plus the one equipped in the quick
/// slot.
#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub struct PlayerInventory {
    pub consumables: BTreeMap<String, i32>,
    pub current: Option<String>,
}

impl PlayerInventory {
    pub fn add(&mut self, name: &str, count: i32) {
        let entry = self.consumables.entry(name.to_string()).or_insert(0);
        *entry = entry.saturating_add(count).max(0);
        if self.current.is_none() {
            self.current = Some(name.to_string());
        }
    }

    pub fn count(&self, name: &str) -> i32 {
        self.consumables.get(name).copied().unwrap_or(0)
    }

    pub fn current_count(&self) -> i32 {
        self.current.as_deref().map_or(0, |name| self.count(name))
    }

    /// Equips `name` if the player carries it.
    pub fn select(&mut self, name: &str) -> bool {
        if self.consumables.contains_key(name) {
            self.current = Some(name.to_string());
            true
        } else {
            false
        }
    }

    /// Uses one of the equipped consumable. Returns its name on success.
    pub fn use_current(&mut self) -> Option<String> {
        let name = self.current.clone()?;
        let count = self.consumables.get_mut(&name)?;
        if *count <= 0 {
            return None;
        }
        *count -= 1;
        Some(name)
    }
}
