//! Crowd enemy spawning.

use bevy::prelude::*;
use rand::Rng;

use super::attack::BasicAttack;
use super::components::{EnemyType, Facing, PatrolBounds};
use super::data::EnemyRegistry;
use super::machine::CrowdEnemy;
use crate::core::SpawnError;

/// Spawn one crowd enemy of `enemy_type` at `position`, facing a random side.
pub fn spawn_crowd_enemy(
    commands: &mut Commands,
    registry: &EnemyRegistry,
    enemy_type: &str,
    position: Vec2,
    bounds: Option<PatrolBounds>,
    rng: &mut impl Rng,
) -> Result<Entity, SpawnError> {
    let definition = registry
        .get(enemy_type)
        .ok_or_else(|| SpawnError::UnknownType(enemy_type.to_string()))?;

    let invalid = |source| SpawnError::InvalidDefinition {
        enemy_type: enemy_type.to_string(),
        source,
    };
    let config = definition.to_config().map_err(invalid)?;

    let facing = Facing::random(rng);
    let enemy = CrowdEnemy::new(config, facing)
        .map_err(invalid)?
        .with_attack_pattern(BasicAttack);

    let mut entity = commands.spawn((
        enemy,
        EnemyType(enemy_type.to_string()),
        Transform::from_translation(position.extend(0.0))
            .with_scale(Vec3::new(facing.sign(), 1.0, 1.0)),
    ));
    if let Some(bounds) = bounds {
        entity.insert(bounds);
    }

    info!(
        "Spawned {} at ({:.1}, {:.1}) facing {:?}",
        definition.name, position.x, position.y, facing
    );
    Ok(entity.id())
}
