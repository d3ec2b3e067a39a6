// ---------------------------------------------------------------------------
// Ability unlocks and the ability wheel
// ---------------------------------------------------------------------------
//
// Both resources persist through the save record's extension map, so the
// record layout does not change when abilities are added.

use bevy::prelude::*;

use crate::Saveable;

/// Abilities the player has earned, in unlock order.
#[derive(Resource, Debug, Clone, Default, PartialEq, bitcode::Encode, bitcode::Decode)]
pub struct UnlockState {
    pub unlocked: Vec<String>,
}

impl UnlockState {
    /// Returns `false` if the ability was already unlocked.
    pub fn unlock(&mut self, ability: &str) -> bool {
        if self.is_unlocked(ability) {
            return false;
        }
        self.unlocked.push(ability.to_string());
        true
    }

    pub fn is_unlocked(&self, ability: &str) -> bool {
        self.unlocked.iter().any(|a| a == ability)
    }
}

impl Saveable for UnlockState {
    const SAVE_KEY: &'static str = "unlock_state";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.unlocked.is_empty() {
            return None;
        }
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

/// Abilities slotted on the radial wheel and the one currently selected.
#[derive(Resource, Debug, Clone, Default, PartialEq, bitcode::Encode, bitcode::Decode)]
pub struct AbilityWheel {
    pub slots: Vec<String>,
    pub selected: u32,
}

impl AbilityWheel {
    pub fn equip(&mut self, ability: &str) {
        if !self.slots.iter().any(|a| a == ability) {
            self.slots.push(ability.to_string());
        }
    }

    pub fn selected_ability(&self) -> Option<&str> {
        self.slots.get(self.selected as usize).map(String::as_str)
    }

    /// Advances the selection, wrapping around.
    pub fn cycle(&mut self) {
        if !self.slots.is_empty() {
            self.selected = (self.selected + 1) % self.slots.len() as u32;
        }
    }
}

impl Saveable for AbilityWheel {
    const SAVE_KEY: &'static str = "ability_wheel";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.slots.is_empty() {
            return None;
        }
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_is_idempotent() {
        let mut unlocks = UnlockState::default();
        assert!(unlocks.unlock("Grapple"));
        assert!(!unlocks.unlock("Grapple"));
        assert_eq!(unlocks.unlocked.len(), 1);
    }

    #[test]
    fn test_default_unlocks_skip_saving() {
        assert!(UnlockState::default().save_to_bytes().is_none());
        assert!(AbilityWheel::default().save_to_bytes().is_none());
    }

    #[test]
    fn test_unlock_saveable_roundtrip() {
        let mut unlocks = UnlockState::default();
        unlocks.unlock("Grapple");
        unlocks.unlock("Dash");
        let bytes = unlocks.save_to_bytes().unwrap();
        assert_eq!(UnlockState::load_from_bytes(&bytes), unlocks);
    }

    #[test]
    fn test_wheel_cycle_wraps() {
        let mut wheel = AbilityWheel::default();
        wheel.cycle();
        assert_eq!(wheel.selected_ability(), None);
        wheel.equip("Grapple");
        wheel.equip("Dash");
        wheel.equip("Dash");
        assert_eq!(wheel.slots.len(), 2);
        wheel.cycle();
        assert_eq!(wheel.selected_ability(), Some("Dash"));
        wheel.cycle();
        assert_eq!(wheel.selected_ability(), Some("Grapple"));
    }

    #[test]
    fn test_wheel_garbage_bytes_fall_back_to_default() {
        let wheel = AbilityWheel::load_from_bytes(&[]);
        assert_eq!(wheel, AbilityWheel::default());
    }
}
