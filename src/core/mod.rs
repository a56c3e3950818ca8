//! Core module - events, errors and the plugin that registers them.
//!
//! This module provides the foundation the enemy systems build upon.

mod error;
mod events;
mod plugin;

pub use error::*;
pub use events::*;
pub use plugin::CorePlugin;
