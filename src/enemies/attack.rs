//! Attack patterns layered on top of the crowd state machine.
//!
//! The state machine only knows that it is attacking. What the swing looks
//! like is up to an [`AttackPattern`]; the swing ends through animation cues
//! (see [`crate::core::AnimationCue`]), not through a timer.

use super::animator::{AnimFlag, Animator};
use super::components::Facing;
use super::ports::{CombatSense, EffectSink, Perception};
use crate::combat::CombatGate;

/// What a pattern may look at and touch during one tick.
pub struct AttackContext<'a> {
    pub facing: Facing,
    pub gate: &'a CombatGate,
    pub perception: &'a dyn Perception,
    pub combat: &'a dyn CombatSense,
    pub animator: &'a mut Animator,
    pub effects: &'a mut dyn EffectSink,
}

/// Behavior run every tick while an enemy is in the attack state.
pub trait AttackPattern: Send + Sync {
    fn update(&mut self, ctx: &mut AttackContext<'_>);
}

/// Plants its feet and plays the basic attack animation.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicAttack;

impl AttackPattern for BasicAttack {
    fn update(&mut self, ctx: &mut AttackContext<'_>) {
        if !ctx.animator.get(AnimFlag::BasicAttack) {
            ctx.animator.set(AnimFlag::BasicAttack, true);
        }
    }
}
