// ---------------------------------------------------------------------------
// ProgressionObject: capability implemented by every saveable scene object
// ---------------------------------------------------------------------------

use bevy::prelude::*;

use crate::error::ProgressionError;
use crate::object_type::ObjectType;
use crate::unique_id::UniqueId;

/// A scene object whose state survives checkpoints and reloads.
///
/// The object owns its serialized form: `save_action` produces an opaque
/// string (a small JSON blob for the built-in objects) and `load_action`
/// consumes the same string. The [`ProgressionManager`] never looks inside.
///
/// Loading jumps straight to the restored end state. Intermediate
/// transitions are not replayed; instead the object reports, through
/// `restored_effects`, which end-state side effects the host should fire
/// again (e.g. opening a gate behind an already-triggered story trigger).
///
/// [`ProgressionManager`]: crate::manager::ProgressionManager
pub trait ProgressionObject {
    fn unique_id(&self) -> UniqueId;

    fn object_type(&self) -> ObjectType;

    /// Designer-facing name the ID was derived from. Used to report
    /// collisions between differently named objects.
    fn key_name(&self) -> &str;

    fn is_saveable(&self) -> bool {
        true
    }

    fn save_action(&self) -> String;

    fn load_action(&mut self, data: &str) -> Result<(), ProgressionError>;

    /// Side effects to fire after a successful `load_action`.
    fn restored_effects(&self) -> Vec<EffectKind> {
        Vec::new()
    }
}

/// Host-visible side effects of a progression object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Fired on first trigger and again on load for objects that replay it.
    OnTrigger,
    /// Fired on first trigger only, never on load.
    OnlyOnce,
    /// The host should spawn the boss for a `BossTrigger`.
    SpawnBoss,
    /// Boss died during play.
    Defeated,
    /// Post-defeat setup; fired on defeat and again on load.
    AfterDefeated,
    /// Pickup was taken; fired on collection and on load.
    Collected,
}

/// Emitted whenever a progression object wants its side effects applied.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct ProgressionEffect {
    pub entity: Entity,
    pub id: UniqueId,
    pub kind: EffectKind,
    /// `true` when produced by restoring saved state rather than by play.
    pub from_load: bool,
}
