//! Crowd enemy state machine.
//!
//! One [`CrowdEnemy::tick`] per simulation step. Within a tick the order is
//! fixed:
//!
//! 1. Advance timers and fire the due ones, oldest first
//! 2. Death check: no hit points left forces [`EnemyState::Dying`]
//! 3. Stun check: a full gauge forces [`EnemyState::Stunned`]
//! 4. Run the handler of the current state
//!
//! Damage and animation cues arrive between ticks through the `on_*` methods.
//! Every state change goes through one transition routine, and leaving a
//! state cancels the timer that state started, so a timer can only ever fire
//! in the state that scheduled it.

use std::time::Duration;

use bevy::prelude::*;

use super::animator::{AnimFlag, AnimTrigger, Animator};
use super::attack::{AttackContext, AttackPattern};
use super::components::{EnemyState, Facing};
use super::data::EnemyConfig;
use super::ports::{CombatSense, EffectSink, LifecycleSink, Perception, Senses, WallSensor};
use crate::combat::{CombatGate, HitPoints, StunGauge};
use crate::core::{BehaviorError, ConfigError};
use crate::timer::{Scheduler, TimerHandle};

/// Logical purpose of a timer. At most one of each is pending at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    Patrol,
    Idle,
    Stun,
    PostAttackDelay,
}

impl TimerPurpose {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }
}

/// A ground crowd enemy: state, combat data, timers and facing.
#[derive(Component)]
pub struct CrowdEnemy {
    config: EnemyConfig,
    state: EnemyState,
    facing: Facing,
    patrol_direction: Vec2,
    health: HitPoints,
    stun: StunGauge,
    gate: CombatGate,
    animator: Animator,
    scheduler: Scheduler<TimerPurpose>,
    timers: [Option<TimerHandle>; TimerPurpose::COUNT],
    attack: Option<Box<dyn AttackPattern>>,
    death_handled: bool,
    despawn_requested: bool,
}

impl CrowdEnemy {
    pub fn new(config: EnemyConfig, facing: Facing) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            state: EnemyState::Patrol,
            facing,
            patrol_direction: Vec2::new(facing.sign() * config.patrol_speed, 0.0),
            health: HitPoints::new(config.max_health),
            stun: StunGauge::new(config.max_stun_gauge),
            gate: CombatGate::default(),
            animator: Animator::default(),
            scheduler: Scheduler::new(),
            timers: [None; TimerPurpose::COUNT],
            attack: None,
            death_handled: false,
            despawn_requested: false,
            config,
        })
    }

    /// Attach the behavior run while attacking. Without one, entering the
    /// attack state makes [`CrowdEnemy::tick`] fail.
    pub fn with_attack_pattern(mut self, pattern: impl AttackPattern + 'static) -> Self {
        self.attack = Some(Box::new(pattern));
        self
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn patrol_direction(&self) -> Vec2 {
        self.patrol_direction
    }

    pub fn health(&self) -> &HitPoints {
        &self.health
    }

    pub fn stun_gauge(&self) -> &StunGauge {
        &self.stun
    }

    pub fn gate(&self) -> &CombatGate {
        &self.gate
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    pub fn is_timer_pending(&self, purpose: TimerPurpose) -> bool {
        self.timers[purpose.index()].is_some()
    }

    pub fn pending_timer_count(&self) -> usize {
        self.scheduler.len()
    }

    /// Advance the machine by one simulation step.
    pub fn tick(
        &mut self,
        dt: Duration,
        senses: Senses<'_>,
        effects: &mut dyn EffectSink,
    ) -> Result<(), BehaviorError> {
        self.fire_due_timers(dt, senses, effects);

        // A lethal hit still plays its reaction; the Hit handler resolves death.
        if self.health.is_dead() {
            if self.state != EnemyState::Hit {
                self.transition(EnemyState::Dying);
            }
        } else if self.stun.is_full() && self.state != EnemyState::Stunned {
            self.transition(EnemyState::Stunned);
        }

        match self.state {
            EnemyState::Patrol => self.update_patrol(senses, effects),
            EnemyState::Idle => self.update_idle(senses),
            EnemyState::Chase => self.update_chase(senses, effects),
            EnemyState::Attack => return self.update_attack(senses, effects),
            EnemyState::Hit => self.update_hit(senses, effects),
            EnemyState::Stunned => self.update_stunned(),
            EnemyState::Dying => self.update_dying(effects),
        }
        Ok(())
    }

    /// Damage landed: lose hit points, build stun and react.
    pub fn on_damaged(&mut self, amount: f32, stun_delta: f32) {
        if !self.state.is_alive() {
            debug!("Ignoring damage on a dying crowd enemy");
            return;
        }
        self.health.take_damage(amount);
        self.stun.accumulate(stun_delta);
        self.transition(EnemyState::Hit);
    }

    /// External stun rule decided the guard is broken.
    pub fn on_stun_threshold_reached(&mut self) {
        match self.state {
            EnemyState::Dying | EnemyState::Stunned => {}
            _ => self.transition(EnemyState::Stunned),
        }
    }

    pub fn on_attack_started(&mut self) {
        if self.state != EnemyState::Attack {
            debug!("Ignoring attack start cue in {:?}", self.state);
            return;
        }
        self.gate.begin_attack();
    }

    pub fn on_parry_window_opened(&mut self) {
        if self.state == EnemyState::Attack {
            self.gate.open_parry_window();
        }
    }

    /// Damage window closed: recovery starts now.
    pub fn on_attack_damage_ended(&mut self) {
        if self.gate.end_damage_window() {
            self.start_timer(TimerPurpose::PostAttackDelay, self.config.recovery_delay);
        }
    }

    /// Swing animation over: pick what to do next.
    pub fn on_attack_finished(&mut self, senses: Senses<'_>) {
        if self.state != EnemyState::Attack {
            debug!("Ignoring attack finish cue in {:?}", self.state);
            return;
        }
        self.next_action(senses);
    }

    /// Animation asked for removal. Only the first request counts.
    pub fn on_despawn_requested(&mut self, lifecycle: &mut dyn LifecycleSink) {
        if std::mem::replace(&mut self.despawn_requested, true) {
            return;
        }
        lifecycle.schedule_destruction(self.config.despawn_delay);
    }

    /// Turn around and patrol the other way.
    pub fn flip(&mut self, effects: &mut dyn EffectSink) {
        self.facing = self.facing.flipped();
        self.patrol_direction = Vec2::new(self.facing.sign() * self.config.patrol_speed, 0.0);
        effects.facing_changed(self.facing);
    }

    fn fire_due_timers(&mut self, dt: Duration, senses: Senses<'_>, effects: &mut dyn EffectSink) {
        self.scheduler.advance(dt);

        // A handler may cancel timers that are due in this same tick; those
        // are already out of the queue when the loop gets to them.
        while let Some((handle, purpose)) = self.scheduler.pop_due() {
            if self.timers[purpose.index()] != Some(handle) {
                warn!("Dropping stale {:?} timer", purpose);
                continue;
            }
            self.timers[purpose.index()] = None;
            self.on_timer(purpose, senses, effects);
        }
    }

    fn on_timer(&mut self, purpose: TimerPurpose, senses: Senses<'_>, effects: &mut dyn EffectSink) {
        match purpose {
            TimerPurpose::Patrol => {
                if self.state == EnemyState::Patrol {
                    self.transition(EnemyState::Idle);
                }
            }
            TimerPurpose::Idle => {
                if self.state == EnemyState::Idle {
                    self.flip(effects);
                    self.transition(EnemyState::Patrol);
                }
            }
            TimerPurpose::Stun => {
                if self.state == EnemyState::Stunned {
                    self.next_action(senses);
                }
            }
            TimerPurpose::PostAttackDelay => self.gate.recover(),
        }
    }

    fn start_timer(&mut self, purpose: TimerPurpose, duration: Duration) {
        if let Some(previous) = self.timers[purpose.index()].take() {
            if self.scheduler.cancel(previous) {
                warn!("Replacing pending {:?} timer", purpose);
            }
        }
        let handle = self.scheduler.schedule(purpose, duration);
        self.timers[purpose.index()] = Some(handle);
        debug_assert_eq!(self.scheduler.pending_for(purpose), 1);
    }

    fn cancel_timer(&mut self, purpose: TimerPurpose) {
        if let Some(handle) = self.timers[purpose.index()].take() {
            self.scheduler.cancel(handle);
        }
    }

    fn transition(&mut self, to: EnemyState) {
        let from = self.state;
        if from == to {
            return;
        }
        if !from.is_alive() {
            if cfg!(debug_assertions) {
                panic!("crowd enemy cannot leave Dying (requested {:?})", to);
            }
            error!("Refusing transition out of Dying into {:?}", to);
            return;
        }

        self.exit_state(from);
        debug!("Crowd enemy {:?} -> {:?}", from, to);
        self.state = to;
        self.enter_state(to);
    }

    fn exit_state(&mut self, from: EnemyState) {
        match from {
            EnemyState::Patrol => {
                self.cancel_timer(TimerPurpose::Patrol);
                self.animator.set(AnimFlag::Patrol, false);
            }
            EnemyState::Idle => {
                self.cancel_timer(TimerPurpose::Idle);
                self.animator.set(AnimFlag::Idle, false);
            }
            EnemyState::Chase => self.animator.set(AnimFlag::Chase, false),
            EnemyState::Attack => {
                self.gate.clear_swing();
                self.clear_attack_flags();
                // A swing cut short never reached its damage-end cue.
                if !self.gate.attackable() && !self.is_timer_pending(TimerPurpose::PostAttackDelay) {
                    self.start_timer(TimerPurpose::PostAttackDelay, self.config.recovery_delay);
                }
            }
            EnemyState::Hit => {}
            EnemyState::Stunned => {
                self.cancel_timer(TimerPurpose::Stun);
                self.animator.set(AnimFlag::Stun, false);
                self.stun.reset();
            }
            EnemyState::Dying => {}
        }
    }

    fn enter_state(&mut self, to: EnemyState) {
        match to {
            EnemyState::Stunned => {
                self.stun.reset();
                self.cancel_timer(TimerPurpose::Patrol);
                self.cancel_timer(TimerPurpose::Idle);
                self.gate.clear_swing();
                self.clear_attack_flags();
            }
            EnemyState::Dying => {
                self.cancel_timer(TimerPurpose::Patrol);
                self.cancel_timer(TimerPurpose::Idle);
                self.cancel_timer(TimerPurpose::Stun);
                self.gate.clear_swing();
            }
            _ => {}
        }
    }

    fn clear_attack_flags(&mut self) {
        self.animator.set(AnimFlag::BasicAttack, false);
        self.animator.set(AnimFlag::SkillAttack, false);
    }

    fn can_attack(&self, senses: Senses<'_>) -> bool {
        self.gate.attackable() && senses.combat.is_attack_executable()
    }

    /// Recovery after an interruption: attack, else chase, else patrol.
    fn next_action(&mut self, senses: Senses<'_>) {
        let next = if self.can_attack(senses) {
            EnemyState::Attack
        } else if senses.perception.is_target_visible() {
            EnemyState::Chase
        } else {
            EnemyState::Patrol
        };
        self.transition(next);
    }

    fn update_patrol(&mut self, senses: Senses<'_>, effects: &mut dyn EffectSink) {
        if senses.perception.is_target_visible() {
            self.transition(EnemyState::Chase);
            return;
        }

        if senses.walls.is_blocked(self.facing) {
            self.transition(EnemyState::Idle);
            return;
        }

        if !self.is_timer_pending(TimerPurpose::Patrol) {
            self.animator.set(AnimFlag::Patrol, true);
            self.start_timer(TimerPurpose::Patrol, self.config.patrol_time);
        }

        effects.request_move(self.patrol_direction);
    }

    fn update_idle(&mut self, senses: Senses<'_>) {
        if senses.perception.is_target_visible() {
            self.transition(EnemyState::Chase);
            return;
        }

        if !self.is_timer_pending(TimerPurpose::Idle) {
            self.start_timer(TimerPurpose::Idle, self.config.idle_time);
            self.animator.set(AnimFlag::Idle, true);
        }
    }

    fn update_chase(&mut self, senses: Senses<'_>, effects: &mut dyn EffectSink) {
        self.animator.set(AnimFlag::Chase, true);

        if senses.perception.has_lost_target() {
            self.transition(EnemyState::Patrol);
            return;
        }

        if self.can_attack(senses) {
            self.transition(EnemyState::Attack);
            return;
        }

        let toward = senses.perception.vector_toward_target();
        if toward.x * self.facing.sign() < 0.0 {
            self.flip(effects);
        }
        effects.request_move(toward * self.config.run_speed);
    }

    fn update_attack(
        &mut self,
        senses: Senses<'_>,
        effects: &mut dyn EffectSink,
    ) -> Result<(), BehaviorError> {
        let Some(pattern) = self.attack.as_mut() else {
            return Err(BehaviorError::Unimplemented {
                state: EnemyState::Attack,
            });
        };

        let mut ctx = AttackContext {
            facing: self.facing,
            gate: &self.gate,
            perception: senses.perception,
            combat: senses.combat,
            animator: &mut self.animator,
            effects: &mut *effects,
        };
        pattern.update(&mut ctx);
        Ok(())
    }

    fn update_hit(&mut self, senses: Senses<'_>, effects: &mut dyn EffectSink) {
        self.animator.fire(AnimTrigger::Hurt);

        if self.health.is_dead() {
            self.transition(EnemyState::Dying);
            self.update_dying(effects);
            return;
        }

        self.next_action(senses);
    }

    fn update_stunned(&mut self) {
        if !self.is_timer_pending(TimerPurpose::Stun) {
            self.animator.set(AnimFlag::Stun, true);
            self.clear_attack_flags();
            self.start_timer(TimerPurpose::Stun, self.config.stun_time);
        }
    }

    fn update_dying(&mut self, effects: &mut dyn EffectSink) {
        if std::mem::replace(&mut self.death_handled, true) {
            return;
        }

        effects.set_collision_layer(self.config.dead_collision_layer);
        if !self.animator.get(AnimFlag::Dead) {
            self.animator.fire(AnimTrigger::PlayDead);
            self.animator.set(AnimFlag::Dead, true);
        }
        effects.notify_death();
        effects.schedule_destruction(self.config.destroy_delay);
        info!("Crowd enemy died, removal in {:?}", self.config.destroy_delay);
    }
}
