//! Combat module - hit points, stun gauge and the attack gate.

mod components;

pub use components::*;
