//! Enemy plugin - registers all crowd enemy systems.

use bevy::prelude::*;

use super::ai;
use super::data::{load_enemy_definitions, EnemyRegistry};

/// Crowd enemy simulation systems, all in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrowdEnemySystems;

/// Enemy plugin - handles definitions, ticking, death and removal.
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<EnemyRegistry>()
            .add_systems(Startup, load_enemy_definitions)
            // Inputs first, then one tick per enemy, then removal
            .add_systems(
                FixedUpdate,
                (
                    ai::apply_damage_events,
                    ai::apply_stun_events,
                    ai::apply_animation_cues,
                    ai::tick_crowd_enemies,
                    ai::despawn_expired,
                )
                    .chain()
                    .in_set(CrowdEnemySystems),
            );
    }
}
