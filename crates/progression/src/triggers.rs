// ---------------------------------------------------------------------------
// Trigger objects: game events, story/cutscene triggers, boss triggers,
// pickups
// ---------------------------------------------------------------------------
//
// Every object here is a one-way state machine:
//
//   GameEvent     Untriggered -> Triggered
//   BossTrigger   Untriggered -> Triggered -> Defeated
//   Pickup        Present     -> Collected
//
// A transition during play registers the object with the
// `ProgressionManager` and emits `ProgressionEffect`s. Loading restores the
// flags directly and only re-emits end-state effects.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ProgressionError;
use crate::manager::ProgressionManager;
use crate::object_type::ObjectType;
use crate::progression_object::{EffectKind, ProgressionEffect, ProgressionObject};
use crate::unique_id::{generate_id, UniqueId};

// =============================================================================
// Input events (sent by the host game)
// =============================================================================

/// The player entered the trigger volume of `entity`.
#[derive(Event, Debug, Clone, Copy)]
pub struct TriggerEntered {
    pub entity: Entity,
}

/// Scripted activation of a trigger, regardless of its volume settings.
#[derive(Event, Debug, Clone, Copy)]
pub struct ActivateTrigger {
    pub entity: Entity,
}

/// The boss spawned by the `BossTrigger` on `trigger` reached zero health.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossDefeated {
    pub trigger: Entity,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct PickupCollected {
    pub entity: Entity,
}

// =============================================================================
// Saved state blobs
// =============================================================================

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
struct TriggerSaveData {
    was_triggered: bool,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
struct BossTriggerSaveData {
    was_triggered: bool,
    #[serde(default)]
    was_defeated: bool,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
struct PickupSaveData {
    collected: bool,
}

fn to_blob<T: Serialize>(data: &T) -> String {
    // Plain structs of bools always serialize.
    serde_json::to_string(data).unwrap_or_default()
}

// =============================================================================
// GameEvent
// =============================================================================

/// Flavor of a [`GameEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerKind {
    /// Bare flag with no replay on load.
    #[default]
    GameEvent,
    /// Plays once; never replays on load.
    Cutscene,
    /// Fires `OnTrigger` + `OnlyOnce` when entered and replays `OnTrigger`
    /// on load.
    Story,
}

impl TriggerKind {
    pub fn object_type(self) -> ObjectType {
        match self {
            TriggerKind::GameEvent => ObjectType::GameEvent,
            TriggerKind::Cutscene => ObjectType::Cutscene,
            TriggerKind::Story => ObjectType::StoryTrigger,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct GameEvent {
    name: String,
    kind: TriggerKind,
    id: UniqueId,
    was_triggered: bool,
    /// When `false`, only `ActivateTrigger` fires this event.
    pub fire_on_enter: bool,
}

impl GameEvent {
    pub fn new(name: impl Into<String>, kind: TriggerKind) -> Self {
        let name = name.into();
        let id = generate_id(kind.object_type(), name.as_str());
        Self {
            name,
            kind,
            id,
            was_triggered: false,
            fire_on_enter: true,
        }
    }

    pub fn story(name: impl Into<String>) -> Self {
        Self::new(name, TriggerKind::Story)
    }

    pub fn cutscene(name: impl Into<String>) -> Self {
        Self::new(name, TriggerKind::Cutscene)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    pub fn was_triggered(&self) -> bool {
        self.was_triggered
    }

    /// Fires the event. Returns `None` if it had already fired.
    pub fn fire(&mut self) -> Option<Vec<EffectKind>> {
        if self.was_triggered {
            return None;
        }
        self.was_triggered = true;
        Some(match self.kind {
            TriggerKind::GameEvent | TriggerKind::Cutscene => vec![EffectKind::OnTrigger],
            TriggerKind::Story => vec![EffectKind::OnTrigger, EffectKind::OnlyOnce],
        })
    }
}

impl ProgressionObject for GameEvent {
    fn unique_id(&self) -> UniqueId {
        self.id
    }

    fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    fn key_name(&self) -> &str {
        &self.name
    }

    fn save_action(&self) -> String {
        to_blob(&TriggerSaveData {
            was_triggered: self.was_triggered,
        })
    }

    fn load_action(&mut self, data: &str) -> Result<(), ProgressionError> {
        let load: TriggerSaveData =
            serde_json::from_str(data).map_err(|e| ProgressionError::malformed(self.id, e))?;
        self.was_triggered = load.was_triggered;
        Ok(())
    }

    fn restored_effects(&self) -> Vec<EffectKind> {
        match self.kind {
            TriggerKind::Story if self.was_triggered => vec![EffectKind::OnTrigger],
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// BossTrigger
// =============================================================================

/// Story trigger that starts a boss fight and remembers the outcome.
#[derive(Component, Debug, Clone)]
pub struct BossTrigger {
    name: String,
    id: UniqueId,
    was_triggered: bool,
    was_defeated: bool,
    /// A boss spawned by this trigger is currently alive. Not saved.
    fight_active: bool,
}

impl BossTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = generate_id(ObjectType::BossTrigger, name.as_str());
        Self {
            name,
            id,
            was_triggered: false,
            was_defeated: false,
            fight_active: false,
        }
    }

    pub fn was_triggered(&self) -> bool {
        self.was_triggered
    }

    pub fn was_defeated(&self) -> bool {
        self.was_defeated
    }

    pub fn fight_active(&self) -> bool {
        self.fight_active
    }

    /// Player entered the arena. Starts a fight unless the boss is already
    /// dead or alive. Only the first entry counts as the trigger firing.
    pub fn enter(&mut self) -> Option<Vec<EffectKind>> {
        if self.was_defeated || self.fight_active {
            return None;
        }
        self.fight_active = true;
        let mut effects = vec![EffectKind::SpawnBoss];
        if !self.was_triggered {
            self.was_triggered = true;
            effects.push(EffectKind::OnTrigger);
            effects.push(EffectKind::OnlyOnce);
        }
        Some(effects)
    }

    /// The spawned boss died.
    pub fn defeat(&mut self) -> Option<Vec<EffectKind>> {
        if self.was_defeated || !self.was_triggered {
            return None;
        }
        self.was_defeated = true;
        self.fight_active = false;
        Some(vec![EffectKind::Defeated, EffectKind::AfterDefeated])
    }
}

impl ProgressionObject for BossTrigger {
    fn unique_id(&self) -> UniqueId {
        self.id
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::BossTrigger
    }

    fn key_name(&self) -> &str {
        &self.name
    }

    fn save_action(&self) -> String {
        to_blob(&BossTriggerSaveData {
            was_triggered: self.was_triggered,
            was_defeated: self.was_defeated,
        })
    }

    fn load_action(&mut self, data: &str) -> Result<(), ProgressionError> {
        let load: BossTriggerSaveData =
            serde_json::from_str(data).map_err(|e| ProgressionError::malformed(self.id, e))?;
        self.was_triggered = load.was_triggered;
        self.was_defeated = load.was_defeated;
        self.fight_active = false;
        Ok(())
    }

    fn restored_effects(&self) -> Vec<EffectKind> {
        let mut effects = Vec::new();
        if self.was_triggered {
            effects.push(EffectKind::OnTrigger);
            if self.was_defeated {
                effects.push(EffectKind::AfterDefeated);
            }
        }
        effects
    }
}

// =============================================================================
// Pickup
// =============================================================================

/// A one-time pickup (key, upgrade) that stays gone once taken.
#[derive(Component, Debug, Clone)]
pub struct Pickup {
    name: String,
    id: UniqueId,
    collected: bool,
}

impl Pickup {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = generate_id(ObjectType::Pickup, name.as_str());
        Self {
            name,
            id,
            collected: false,
        }
    }

    pub fn collected(&self) -> bool {
        self.collected
    }

    pub fn collect(&mut self) -> Option<Vec<EffectKind>> {
        if self.collected {
            return None;
        }
        self.collected = true;
        Some(vec![EffectKind::Collected])
    }
}

impl ProgressionObject for Pickup {
    fn unique_id(&self) -> UniqueId {
        self.id
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Pickup
    }

    fn key_name(&self) -> &str {
        &self.name
    }

    fn save_action(&self) -> String {
        to_blob(&PickupSaveData {
            collected: self.collected,
        })
    }

    fn load_action(&mut self, data: &str) -> Result<(), ProgressionError> {
        let load: PickupSaveData =
            serde_json::from_str(data).map_err(|e| ProgressionError::malformed(self.id, e))?;
        self.collected = load.collected;
        Ok(())
    }

    fn restored_effects(&self) -> Vec<EffectKind> {
        if self.collected {
            vec![EffectKind::Collected]
        } else {
            Vec::new()
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

fn send_effects(
    writer: &mut EventWriter<ProgressionEffect>,
    entity: Entity,
    id: UniqueId,
    effects: Vec<EffectKind>,
) {
    for kind in effects {
        writer.send(ProgressionEffect {
            entity,
            id,
            kind,
            from_load: false,
        });
    }
}

/// Fires `GameEvent`s from volume entries and scripted activations.
pub fn fire_game_events(
    mut entered: EventReader<TriggerEntered>,
    mut activated: EventReader<ActivateTrigger>,
    mut events: Query<&mut GameEvent>,
    mut manager: ResMut<ProgressionManager>,
    mut effects: EventWriter<ProgressionEffect>,
) {
    let from_volume = entered.read().map(|e| (e.entity, true));
    let scripted = activated.read().map(|e| (e.entity, false));
    for (entity, via_volume) in from_volume.chain(scripted) {
        let Ok(mut event) = events.get_mut(entity) else {
            continue;
        };
        if via_volume && !event.fire_on_enter {
            continue;
        }
        if let Some(fired) = event.fire() {
            manager.save_me(&*event);
            send_effects(&mut effects, entity, event.unique_id(), fired);
        }
    }
}

/// Starts boss fights on entry and records defeats.
pub fn run_boss_triggers(
    mut entered: EventReader<TriggerEntered>,
    mut defeated: EventReader<BossDefeated>,
    mut triggers: Query<&mut BossTrigger>,
    mut manager: ResMut<ProgressionManager>,
    mut effects: EventWriter<ProgressionEffect>,
) {
    for ev in entered.read() {
        let Ok(mut trigger) = triggers.get_mut(ev.entity) else {
            continue;
        };
        if let Some(fired) = trigger.enter() {
            if fired.contains(&EffectKind::OnTrigger) {
                manager.save_me(&*trigger);
            }
            send_effects(&mut effects, ev.entity, trigger.unique_id(), fired);
        }
    }

    for ev in defeated.read() {
        let Ok(mut trigger) = triggers.get_mut(ev.trigger) else {
            continue;
        };
        if let Some(fired) = trigger.defeat() {
            info!("Progression: boss '{}' defeated", trigger.name);
            manager.save_me(&*trigger);
            send_effects(&mut effects, ev.trigger, trigger.unique_id(), fired);
        }
    }
}

pub fn collect_pickups(
    mut collected: EventReader<PickupCollected>,
    mut pickups: Query<&mut Pickup>,
    mut manager: ResMut<ProgressionManager>,
    mut effects: EventWriter<ProgressionEffect>,
) {
    for ev in collected.read() {
        let Ok(mut pickup) = pickups.get_mut(ev.entity) else {
            continue;
        };
        if let Some(fired) = pickup.collect() {
            manager.save_me(&*pickup);
            send_effects(&mut effects, ev.entity, pickup.unique_id(), fired);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_trigger_fires_once() {
        let mut t = GameEvent::story("OpeningCutscene");
        assert_eq!(
            t.fire(),
            Some(vec![EffectKind::OnTrigger, EffectKind::OnlyOnce])
        );
        assert!(t.was_triggered());
        assert_eq!(t.fire(), None);
    }

    #[test]
    fn test_trigger_ids_follow_object_type() {
        assert_eq!(
            GameEvent::story("A").unique_id(),
            generate_id(ObjectType::StoryTrigger, "A")
        );
        assert_eq!(
            GameEvent::cutscene("A").unique_id(),
            generate_id(ObjectType::Cutscene, "A")
        );
        assert_eq!(
            BossTrigger::new("A").unique_id(),
            generate_id(ObjectType::BossTrigger, "A")
        );
    }

    #[test]
    fn test_game_event_blob_format() {
        let mut t = GameEvent::story("OpeningCutscene");
        assert_eq!(t.save_action(), r#"{"wasTriggered":false}"#);
        t.fire();
        assert_eq!(t.save_action(), r#"{"wasTriggered":true}"#);
    }

    #[test]
    fn test_game_event_save_load_roundtrip() {
        let mut original = GameEvent::story("Gate");
        original.fire();
        let mut restored = GameEvent::story("Gate");
        restored.load_action(&original.save_action()).unwrap();
        assert!(restored.was_triggered());
        assert_eq!(restored.restored_effects(), vec![EffectKind::OnTrigger]);
    }

    #[test]
    fn test_cutscene_does_not_replay_on_load() {
        let mut restored = GameEvent::cutscene("Intro");
        restored.load_action(r#"{"wasTriggered":true}"#).unwrap();
        assert!(restored.was_triggered());
        assert!(restored.restored_effects().is_empty());
    }

    #[test]
    fn test_untriggered_load_has_no_effects() {
        let mut restored = GameEvent::story("Gate");
        restored.load_action(r#"{"wasTriggered":false}"#).unwrap();
        assert!(restored.restored_effects().is_empty());
    }

    #[test]
    fn test_malformed_blob_keeps_default_state() {
        let mut t = GameEvent::story("Gate");
        let err = t.load_action("{not json").unwrap_err();
        assert!(matches!(err, ProgressionError::MalformedState { .. }));
        assert!(!t.was_triggered());
    }

    #[test]
    fn test_boss_trigger_lifecycle() {
        let mut boss = BossTrigger::new("CapyMiniBoss");
        assert_eq!(boss.defeat(), None, "cannot defeat an untriggered boss");

        let first = boss.enter().unwrap();
        assert_eq!(
            first,
            vec![
                EffectKind::SpawnBoss,
                EffectKind::OnTrigger,
                EffectKind::OnlyOnce
            ]
        );
        assert_eq!(boss.enter(), None, "fight already running");

        let defeat = boss.defeat().unwrap();
        assert_eq!(defeat, vec![EffectKind::Defeated, EffectKind::AfterDefeated]);
        assert!(boss.was_defeated());
        assert_eq!(boss.enter(), None, "defeated bosses stay dead");
    }

    #[test]
    fn test_boss_retry_after_player_death_does_not_refire_once_effects() {
        let mut boss = BossTrigger::new("Boss");
        boss.enter();
        // Reloading a checkpoint clears the live fight but not the trigger.
        let blob = boss.save_action();
        let mut reloaded = BossTrigger::new("Boss");
        reloaded.load_action(&blob).unwrap();
        assert_eq!(reloaded.enter(), Some(vec![EffectKind::SpawnBoss]));
    }

    #[test]
    fn test_boss_restore_effects() {
        let mut boss = BossTrigger::new("Boss");
        boss.load_action(r#"{"wasTriggered":true,"wasDefeated":true}"#)
            .unwrap();
        assert_eq!(
            boss.restored_effects(),
            vec![EffectKind::OnTrigger, EffectKind::AfterDefeated]
        );
        assert!(!boss.fight_active());
    }

    #[test]
    fn test_boss_blob_without_defeat_flag_defaults_false() {
        let mut boss = BossTrigger::new("Boss");
        boss.load_action(r#"{"wasTriggered":true}"#).unwrap();
        assert!(boss.was_triggered());
        assert!(!boss.was_defeated());
    }

    #[test]
    fn test_pickup_roundtrip() {
        let mut key = Pickup::new("Key1");
        assert_eq!(key.collect(), Some(vec![EffectKind::Collected]));
        assert_eq!(key.collect(), None);
        let mut restored = Pickup::new("Key1");
        restored.load_action(&key.save_action()).unwrap();
        assert!(restored.collected());
        assert_eq!(restored.restored_effects(), vec![EffectKind::Collected]);
    }

    #[test]
    fn test_firing_registers_with_manager() {
        let mut app = App::new();
        app.add_event::<TriggerEntered>()
            .add_event::<ActivateTrigger>()
            .add_event::<ProgressionEffect>()
            .init_resource::<ProgressionManager>()
            .add_systems(Update, fire_game_events);

        let story = app.world_mut().spawn(GameEvent::story("OpeningCutscene")).id();
        let mut scripted_only = GameEvent::story("GrappleTree");
        scripted_only.fire_on_enter = false;
        let scripted = app.world_mut().spawn(scripted_only).id();

        app.world_mut().send_event(TriggerEntered { entity: story });
        app.world_mut().send_event(TriggerEntered { entity: scripted });
        app.update();

        let manager = app.world().resource::<ProgressionManager>();
        assert_eq!(manager.len(), 1);
        let id = generate_id(ObjectType::StoryTrigger, "OpeningCutscene");
        assert_eq!(manager.get(id), Some(r#"{"wasTriggered":true}"#));

        app.world_mut().send_event(ActivateTrigger { entity: scripted });
        app.update();
        assert_eq!(app.world().resource::<ProgressionManager>().len(), 2);
    }

    #[test]
    fn test_two_pickups_make_two_entries() {
        let mut app = App::new();
        app.add_event::<PickupCollected>()
            .add_event::<ProgressionEffect>()
            .init_resource::<ProgressionManager>()
            .add_systems(Update, collect_pickups);

        let a = app.world_mut().spawn(Pickup::new("Key1")).id();
        let b = app.world_mut().spawn(Pickup::new("Key2")).id();
        app.world_mut().send_event(PickupCollected { entity: a });
        app.world_mut().send_event(PickupCollected { entity: b });
        app.update();

        let manager = app.world().resource::<ProgressionManager>();
        assert_eq!(manager.len(), 2);
        let (ids, _) = manager.to_block();
        assert_ne!(ids[0], ids[1]);
        assert!(manager.contains(generate_id(ObjectType::Pickup, "Key1")));
        assert!(manager.contains(generate_id(ObjectType::Pickup, "Key2")));
    }
}
