//! Enemy data loading from RON files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;

use crate::core::{ConfigError, DataLoadError};

/// Directory scanned for enemy definitions at startup.
pub const ENEMY_DATA_DIR: &str = "assets/data/enemies";

fn default_lose_range_factor() -> f32 {
    1.5
}

fn default_idle_time() -> f32 {
    1.0
}

fn default_max_stun_gauge() -> f32 {
    10.0
}

fn default_recovery_delay() -> f32 {
    0.3
}

fn default_destroy_delay() -> f32 {
    3.0
}

fn default_despawn_delay() -> f32 {
    1.0
}

fn default_dead_collision_layer() -> u32 {
    16
}

/// Enemy definition loaded from RON file. Times are in seconds.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct EnemyDefinition {
    pub name: String,
    pub max_health: f32,
    /// Walking speed while patrolling
    pub patrol_speed: f32,
    /// Running speed while chasing
    pub run_speed: f32,
    pub sensing_range: f32,
    /// Target counts as lost beyond `sensing_range * lose_range_factor`
    #[serde(default = "default_lose_range_factor")]
    pub lose_range_factor: f32,
    pub attack_range: f32,
    pub patrol_time: f32,
    #[serde(default = "default_idle_time")]
    pub idle_time: f32,
    pub stun_time: f32,
    #[serde(default = "default_max_stun_gauge")]
    pub max_stun_gauge: f32,
    /// Delay after the damage window closes before the next attack
    #[serde(default = "default_recovery_delay")]
    pub recovery_delay: f32,
    /// Delay between entering the dying state and removal
    #[serde(default = "default_destroy_delay")]
    pub destroy_delay: f32,
    /// Delay used when an animation requests removal
    #[serde(default = "default_despawn_delay")]
    pub despawn_delay: f32,
    #[serde(default = "default_dead_collision_layer")]
    pub dead_collision_layer: u32,
}

impl EnemyDefinition {
    /// Validate and convert to the runtime configuration.
    pub fn to_config(&self) -> Result<EnemyConfig, ConfigError> {
        if !(self.lose_range_factor >= 1.0) {
            return Err(ConfigError::LoseRangeInsideSensing(self.lose_range_factor));
        }

        let config = EnemyConfig {
            max_health: self.max_health,
            patrol_speed: self.patrol_speed,
            run_speed: self.run_speed,
            sensing_range: self.sensing_range,
            lose_range: self.sensing_range * self.lose_range_factor,
            attack_range: self.attack_range,
            patrol_time: seconds("patrol_time", self.patrol_time)?,
            idle_time: seconds("idle_time", self.idle_time)?,
            stun_time: seconds("stun_time", self.stun_time)?,
            max_stun_gauge: self.max_stun_gauge,
            recovery_delay: seconds("recovery_delay", self.recovery_delay)?,
            destroy_delay: seconds("destroy_delay", self.destroy_delay)?,
            despawn_delay: seconds("despawn_delay", self.despawn_delay)?,
            dead_collision_layer: self.dead_collision_layer,
        };
        config.validate()?;
        Ok(config)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn seconds(field: &'static str, value: f32) -> Result<Duration, ConfigError> {
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Duration::try_from_secs_f32(value).map_err(|_| ConfigError::InvalidDuration { field, value })
}

/// Validated runtime parameters of one crowd enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyConfig {
    pub max_health: f32,
    pub patrol_speed: f32,
    pub run_speed: f32,
    pub sensing_range: f32,
    pub lose_range: f32,
    pub attack_range: f32,
    pub patrol_time: Duration,
    pub idle_time: Duration,
    pub stun_time: Duration,
    pub max_stun_gauge: f32,
    pub recovery_delay: Duration,
    pub destroy_delay: Duration,
    pub despawn_delay: Duration,
    pub dead_collision_layer: u32,
}

impl EnemyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_health", self.max_health)?;
        positive("patrol_speed", self.patrol_speed)?;
        positive("run_speed", self.run_speed)?;
        positive("sensing_range", self.sensing_range)?;
        positive("attack_range", self.attack_range)?;
        positive("max_stun_gauge", self.max_stun_gauge)?;
        if !(self.lose_range >= self.sensing_range) {
            return Err(ConfigError::LoseRangeTooShort {
                lose_range: self.lose_range,
                sensing_range: self.sensing_range,
            });
        }
        Ok(())
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 50.0,
            patrol_speed: 2.0,
            run_speed: 4.0,
            sensing_range: 8.0,
            lose_range: 12.0,
            attack_range: 1.5,
            patrol_time: Duration::from_secs(3),
            idle_time: Duration::from_secs(1),
            stun_time: Duration::from_secs(2),
            max_stun_gauge: 10.0,
            recovery_delay: Duration::from_millis(300),
            destroy_delay: Duration::from_secs(3),
            despawn_delay: Duration::from_secs(1),
            dead_collision_layer: 16,
        }
    }
}

/// Resource holding all loaded enemy definitions.
#[derive(Resource, Default)]
pub struct EnemyRegistry {
    pub definitions: HashMap<String, EnemyDefinition>,
}

impl EnemyRegistry {
    /// Get an enemy definition by type name.
    pub fn get(&self, enemy_type: &str) -> Option<&EnemyDefinition> {
        self.definitions.get(enemy_type)
    }

    /// Load every `.ron` file in `dir`, keyed by file stem.
    ///
    /// Files that fail to load are logged and skipped. Returns how many
    /// definitions were added.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, DataLoadError> {
        if !dir.exists() {
            return Err(DataLoadError::FileNotFound(dir.display().to_string()));
        }

        let entries = fs::read_dir(dir).map_err(|e| DataLoadError::ReadError {
            path: dir.display().to_string(),
            details: e.to_string(),
        })?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "ron") {
                continue;
            }

            let enemy_type = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();

            match load_definition_file(&path) {
                Ok(definition) => {
                    info!("Loaded enemy definition: {} ({})", definition.name, enemy_type);
                    self.definitions.insert(enemy_type, definition);
                    loaded += 1;
                }
                Err(e) => error!("{}", e),
            }
        }

        Ok(loaded)
    }
}

/// Read, parse and validate one definition file.
pub fn load_definition_file(path: &Path) -> Result<EnemyDefinition, DataLoadError> {
    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    parse_definition(&path.display().to_string(), &contents)
}

/// Parse and validate a definition from RON text.
pub fn parse_definition(path: &str, contents: &str) -> Result<EnemyDefinition, DataLoadError> {
    let definition =
        ron::from_str::<EnemyDefinition>(contents).map_err(|e| DataLoadError::ParseError {
            path: path.to_string(),
            details: e.to_string(),
        })?;

    definition
        .to_config()
        .map_err(|source| DataLoadError::Invalid {
            path: path.to_string(),
            source,
        })?;

    Ok(definition)
}

/// Load all enemy definitions from the assets/data/enemies/ directory.
pub fn load_enemy_definitions(mut registry: ResMut<EnemyRegistry>) {
    match registry.load_dir(Path::new(ENEMY_DATA_DIR)) {
        Ok(count) => info!("Loaded {} enemy definitions", count),
        Err(e) => warn!("Enemy definitions unavailable: {}", e),
    }
}
