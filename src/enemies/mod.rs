//! Enemies module - crowd enemy state machine, its ports and systems.

mod ai;
pub mod animator;
pub mod attack;
mod components;
pub mod data;
mod machine;
mod plugin;
pub mod ports;
mod spawning;

pub use animator::{AnimFlag, AnimTrigger, Animator};
pub use attack::{AttackContext, AttackPattern, BasicAttack};
pub use components::*;
pub use data::{EnemyConfig, EnemyDefinition, EnemyRegistry};
pub use machine::{CrowdEnemy, TimerPurpose};
pub use plugin::{CrowdEnemySystems, EnemyPlugin};
pub use spawning::spawn_crowd_enemy;
