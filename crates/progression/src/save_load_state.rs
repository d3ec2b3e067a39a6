//! Global save/load state machine.
//!
//! Defines [`SaveLoadState`], a Bevy [`States`] enum that isolates save/load
//! work from gameplay. Trigger systems only run while the state is
//! [`SaveLoadState::Idle`]; the save crate walks through the other variants
//! while an operation is in progress.
//!
//! The state lives in this crate rather than in `save` so gameplay systems
//! can add `run_if(in_state(SaveLoadState::Idle))` without depending on the
//! persistence layer.

use bevy::prelude::*;

/// ```text
/// Idle -> Saving -> Idle
/// Idle -> Loading -> AwaitingScene -> Restoring -> Idle
/// Idle -> NewGame -> Idle
/// ```
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SaveLoadState {
    /// Normal gameplay.
    #[default]
    Idle,
    /// Collecting the save record.
    Saving,
    /// Reading and decoding the active slot file in the background.
    Loading,
    /// Waiting for the host to finish loading the saved scene.
    AwaitingScene,
    /// Applying the loaded record to the freshly loaded scene.
    Restoring,
    /// Resetting everything for a new game.
    NewGame,
}
