//! Crowd Enemy - a side-view melee crowd enemy for Bevy.
//!
//! Each enemy is a small state machine that patrols, idles at walls and
//! timeouts, chases and attacks a target, reacts to hits and stuns, and dies.
//!
//! # Architecture
//!
//! The crate is organized into plugins and supporting modules:
//!
//! - **Core**: Global events and error types
//! - **Timer**: Tick-driven one-shot scheduler
//! - **Combat**: Hit points, stun gauge, attack gate
//! - **Enemies**: The state machine, its ports, data files and systems
//!
//! The state machine itself ([`enemies::CrowdEnemy`]) has no ECS
//! dependencies beyond being a component; it reads its surroundings through
//! [`enemies::ports`] and can be driven directly in tests.

pub mod combat;
pub mod core;
pub mod enemies;
pub mod timer;

use bevy::prelude::*;

/// Adds everything crowd enemies need.
pub struct CrowdEnemyPlugin;

impl Plugin for CrowdEnemyPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Enemy systems
            .add_plugins(enemies::EnemyPlugin);
    }
}
