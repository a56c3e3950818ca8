//! Error types for enemy configuration, data loading and behavior faults.

use thiserror::Error;

use crate::enemies::EnemyState;

/// A state handler was invoked but no behavior exists for it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorError {
    #[error("no behavior is implemented for state {state:?}")]
    Unimplemented { state: EnemyState },
}

/// Invalid enemy configuration, caught when the enemy is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Value must be strictly positive.
    #[error("'{field}' must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    /// Value must be zero or greater.
    #[error("'{field}' must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    /// Value is not finite or does not fit in a duration.
    #[error("'{field}' is not a usable duration in seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f32 },

    /// Loss hysteresis must not sit inside the sensing range.
    #[error("'lose_range_factor' must be at least 1.0, got {0}")]
    LoseRangeInsideSensing(f32),

    #[error("lose range {lose_range} is shorter than sensing range {sensing_range}")]
    LoseRangeTooShort { lose_range: f32, sensing_range: f32 },
}

/// Why a spawn request could not be honoured.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("unknown enemy type '{0}'")]
    UnknownType(String),

    #[error("enemy type '{enemy_type}' has an invalid definition: {source}")]
    InvalidDefinition {
        enemy_type: String,
        #[source]
        source: ConfigError,
    },
}

/// Errors that can occur when loading enemy definition files.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// Definition parsed but holds unusable values.
    #[error("Invalid definition in '{path}': {source}")]
    Invalid {
        path: String,
        #[source]
        source: ConfigError,
    },
}
