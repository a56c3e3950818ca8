//! Core plugin that registers the global events.

use bevy::prelude::*;

use super::events::*;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - The fixed simulation timestep, if the app has none yet
/// - Global events (DamageEvent, DeathEvent, etc.)
pub struct CorePlugin;

/// Simulation rate used when the app did not configure one.
pub const DEFAULT_TICK_HZ: f64 = 60.0;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Time<Fixed>>() {
            app.insert_resource(Time::<Fixed>::from_hz(DEFAULT_TICK_HZ));
        }

        app
            // Register global events
            .add_event::<DamageEvent>()
            .add_event::<DeathEvent>()
            .add_event::<StunEvent>()
            .add_event::<AnimationCueEvent>()
            .add_event::<AnimationTriggerEvent>();
    }
}
