//! Global events used for cross-system communication.
//!
//! Damage and animation cues flow into the enemy state machine through these
//! events, and deaths flow back out. Systems stay decoupled and the state
//! machine never reaches into other systems directly.

use bevy::prelude::*;

use crate::enemies::AnimTrigger;

/// Sent when an entity takes damage.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: Entity,
    /// Entity that caused the damage (if any)
    pub source: Option<Entity>,
    /// Hit points removed
    pub amount: f32,
    /// Amount added to the target's stun gauge
    pub stun: f32,
}

/// Sent exactly once when an enemy enters its dying state.
#[derive(Event, Debug, Clone, Copy)]
pub struct DeathEvent {
    /// Entity that died
    pub entity: Entity,
}

/// Sent by an external stun rule to break an enemy's guard outright.
#[derive(Event, Debug, Clone, Copy)]
pub struct StunEvent {
    pub target: Entity,
}

/// Moments in an attack animation that drive the attack state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationCue {
    /// Swing begins; damage window opens.
    AttackStarted,
    /// The swing can now be parried.
    ParryWindowOpened,
    /// Damage window closes; recovery begins.
    AttackDamageEnded,
    /// Swing animation is over; pick the next action.
    AttackFinished,
    /// Animation asks for the entity to be removed.
    DespawnRequested,
}

/// Sent by the presentation layer when an animation reaches a cue.
#[derive(Event, Debug, Clone, Copy)]
pub struct AnimationCueEvent {
    pub entity: Entity,
    pub cue: AnimationCue,
}

/// One-shot animation trigger raised by an enemy, for the presentation layer.
#[derive(Event, Debug, Clone, Copy)]
pub struct AnimationTriggerEvent {
    pub entity: Entity,
    pub trigger: AnimTrigger,
}
