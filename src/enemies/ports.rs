//! Collaborator ports of the crowd state machine.
//!
//! Queries (perception, combat sense, walls) are read every tick through
//! [`Senses`]. Side effects (movement, orientation, death, removal) are
//! written to an [`EffectSink`]. Both are handed in by the caller, so the
//! state machine never looks anything up on its own.

use std::time::Duration;

use bevy::prelude::*;

use super::components::{Facing, PatrolBounds};
use super::data::EnemyConfig;

/// What the enemy knows about its target.
pub trait Perception {
    /// Target is inside sensing range.
    fn is_target_visible(&self) -> bool;
    /// Target escaped. Not the same as "not visible": loss uses its own,
    /// wider threshold so a chase does not flicker at the sensing edge.
    fn has_lost_target(&self) -> bool;
    /// Unit direction toward the target, zero when there is none.
    fn vector_toward_target(&self) -> Vec2;
}

/// Whether an attack could land right now.
pub trait CombatSense {
    fn is_attack_executable(&self) -> bool;
}

/// Wall or ledge check ahead of the enemy.
pub trait WallSensor {
    fn is_blocked(&self, facing: Facing) -> bool;
}

/// Query ports bundled for one tick.
#[derive(Clone, Copy)]
pub struct Senses<'a> {
    pub perception: &'a dyn Perception,
    pub combat: &'a dyn CombatSense,
    pub walls: &'a dyn WallSensor,
}

pub trait MovementActuator {
    /// Request locomotion for this tick. `velocity` is in units per second.
    fn request_move(&mut self, velocity: Vec2);
}

pub trait OrientationSink {
    /// Sprite and attached UI must now face `facing`.
    fn facing_changed(&mut self, facing: Facing);
}

pub trait LifecycleSink {
    fn set_collision_layer(&mut self, layer: u32);
    fn notify_death(&mut self);
    fn schedule_destruction(&mut self, delay: Duration);
}

/// Every outbound port at once.
pub trait EffectSink: MovementActuator + OrientationSink + LifecycleSink {}

impl<T: MovementActuator + OrientationSink + LifecycleSink> EffectSink for T {}

/// One recorded side effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Move(Vec2),
    Faced(Facing),
    CollisionLayer(u32),
    Died,
    DestroyAfter(Duration),
}

/// Effect sink that records everything for the caller to apply.
#[derive(Debug, Default, Clone)]
pub struct EffectBuffer {
    effects: Vec<Effect>,
}

impl EffectBuffer {
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Effect> + '_ {
        self.effects.drain(..)
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

impl MovementActuator for EffectBuffer {
    fn request_move(&mut self, velocity: Vec2) {
        self.effects.push(Effect::Move(velocity));
    }
}

impl OrientationSink for EffectBuffer {
    fn facing_changed(&mut self, facing: Facing) {
        self.effects.push(Effect::Faced(facing));
    }
}

impl LifecycleSink for EffectBuffer {
    fn set_collision_layer(&mut self, layer: u32) {
        self.effects.push(Effect::CollisionLayer(layer));
    }

    fn notify_death(&mut self) {
        self.effects.push(Effect::Died);
    }

    fn schedule_destruction(&mut self, delay: Duration) {
        self.effects.push(Effect::DestroyAfter(delay));
    }
}

/// Distance-based perception and combat sense.
#[derive(Debug, Clone, Copy)]
pub struct RangeSensor {
    /// Target position relative to the enemy
    offset: Option<Vec2>,
    sensing_range: f32,
    lose_range: f32,
    attack_range: f32,
}

impl RangeSensor {
    pub fn new(config: &EnemyConfig, origin: Vec2, target: Option<Vec2>) -> Self {
        Self {
            offset: target.map(|t| t - origin),
            sensing_range: config.sensing_range,
            lose_range: config.lose_range,
            attack_range: config.attack_range,
        }
    }

    fn distance(&self) -> Option<f32> {
        self.offset.map(Vec2::length)
    }
}

impl Perception for RangeSensor {
    fn is_target_visible(&self) -> bool {
        self.distance().is_some_and(|d| d <= self.sensing_range)
    }

    fn has_lost_target(&self) -> bool {
        self.distance().map_or(true, |d| d > self.lose_range)
    }

    fn vector_toward_target(&self) -> Vec2 {
        // Ground enemy: only the horizontal component matters.
        self.offset
            .map_or(Vec2::ZERO, |o| Vec2::new(o.x, 0.0).normalize_or_zero())
    }
}

impl CombatSense for RangeSensor {
    fn is_attack_executable(&self) -> bool {
        self.distance().is_some_and(|d| d <= self.attack_range)
    }
}

/// Wall check against [`PatrolBounds`].
#[derive(Debug, Clone, Copy)]
pub struct BoundsSensor {
    pub x: f32,
    pub bounds: Option<PatrolBounds>,
}

impl WallSensor for BoundsSensor {
    fn is_blocked(&self, facing: Facing) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        let ahead_x = self.x + facing.sign() * bounds.lookahead;
        ahead_x < bounds.min_x || ahead_x > bounds.max_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(target: Option<Vec2>) -> RangeSensor {
        let config = EnemyConfig {
            sensing_range: 5.0,
            lose_range: 7.5,
            attack_range: 1.0,
            ..Default::default()
        };
        RangeSensor::new(&config, Vec2::new(10.0, 0.0), target)
    }

    #[test]
    fn loss_has_hysteresis() {
        // Between sensing and lose range: neither visible nor lost.
        let s = sensor(Some(Vec2::new(16.0, 0.0)));
        assert!(!s.is_target_visible());
        assert!(!s.has_lost_target());

        assert!(sensor(Some(Vec2::new(14.0, 0.0))).is_target_visible());
        assert!(sensor(Some(Vec2::new(18.0, 0.0))).has_lost_target());
    }

    #[test]
    fn no_target_is_lost_and_invisible() {
        let s = sensor(None);
        assert!(!s.is_target_visible());
        assert!(s.has_lost_target());
        assert!(!s.is_attack_executable());
        assert_eq!(s.vector_toward_target(), Vec2::ZERO);
    }

    #[test]
    fn direction_is_horizontal() {
        let s = sensor(Some(Vec2::new(7.0, 3.0)));
        assert_eq!(s.vector_toward_target(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn attack_range() {
        assert!(sensor(Some(Vec2::new(10.8, 0.0))).is_attack_executable());
        assert!(!sensor(Some(Vec2::new(11.5, 0.0))).is_attack_executable());
    }

    #[test]
    fn bounds_sensor_checks_ahead() {
        let bounds = PatrolBounds {
            min_x: -4.0,
            max_x: 4.0,
            lookahead: 0.5,
        };
        let walls = BoundsSensor {
            x: 3.7,
            bounds: Some(bounds),
        };
        assert!(walls.is_blocked(Facing::Right));
        assert!(!walls.is_blocked(Facing::Left));

        let open = BoundsSensor { x: 100.0, bounds: None };
        assert!(!open.is_blocked(Facing::Right));
    }

    #[test]
    fn buffer_records_effects_in_order() {
        let mut buffer = EffectBuffer::default();
        buffer.request_move(Vec2::X);
        buffer.notify_death();
        buffer.schedule_destruction(Duration::from_secs(3));

        let drained: Vec<_> = buffer.drain().collect();
        assert_eq!(
            drained,
            vec![
                Effect::Move(Vec2::X),
                Effect::Died,
                Effect::DestroyAfter(Duration::from_secs(3)),
            ]
        );
        assert!(buffer.effects().is_empty());
    }
}
