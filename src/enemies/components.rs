//! Enemy-related components and small value types.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

/// Enemy type identifier (matches RON file name).
#[derive(Component, Clone, Debug)]
pub struct EnemyType(pub String);

/// Marker for the entity crowd enemies perceive and chase.
#[derive(Component, Default)]
pub struct CrowdTarget;

/// Behavioral mode of a crowd enemy.
#[derive(Default, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum EnemyState {
    /// Walking in the facing direction for a while.
    #[default]
    Patrol,
    /// Standing still before turning around.
    Idle,
    /// Moving toward the target.
    Chase,
    /// Swinging at the target; driven by animation cues.
    Attack,
    /// Reacting to a hit for one tick.
    Hit,
    /// Guard broken; frozen until the stun wears off.
    Stunned,
    /// Playing the death animation before removal.
    Dying,
}

impl EnemyState {
    pub fn is_alive(self) -> bool {
        self != EnemyState::Dying
    }
}

/// Horizontal orientation in the side view.
#[derive(Default, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// `1.0` facing right, `-1.0` facing left.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Pick a spawn facing; right is slightly less likely than left.
    pub fn random(rng: &mut impl Rng) -> Self {
        if rng.gen_range(0..100) > 50 {
            Facing::Right
        } else {
            Facing::Left
        }
    }
}

/// Horizontal walls around a patrol area, checked ahead of the enemy.
#[derive(Component, Clone, Copy, Debug)]
pub struct PatrolBounds {
    pub min_x: f32,
    pub max_x: f32,
    /// How far ahead of the enemy the wall check reaches
    pub lookahead: f32,
}

/// Collision layer assigned to an entity by the state machine.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionLayer(pub u32);

/// Timer before a requested despawn.
#[derive(Component)]
pub struct DespawnTimer(pub Timer);

impl DespawnTimer {
    pub fn new(delay: Duration) -> Self {
        Self(Timer::new(delay, TimerMode::Once))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn facing_sign_and_flip() {
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Right.flipped(), Facing::Left);
        assert_eq!(Facing::Left.flipped().flipped(), Facing::Left);
    }

    #[test]
    fn random_facing_covers_both_sides() {
        let mut rng = rand::thread_rng();
        let picks: Vec<Facing> = (0..200).map(|_| Facing::random(&mut rng)).collect();
        assert!(picks.contains(&Facing::Left));
        assert!(picks.contains(&Facing::Right));
    }

    #[test]
    fn low_roll_faces_left() {
        let mut rng = StepRng::new(0, 0);
        assert_eq!(Facing::random(&mut rng), Facing::Left);
    }

    #[test]
    fn only_dying_is_dead() {
        assert!(EnemyState::Stunned.is_alive());
        assert!(!EnemyState::Dying.is_alive());
    }
}
