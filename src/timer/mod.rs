//! Timer module - cancellable one-shot timers checked once per simulation tick.

mod scheduler;

pub use scheduler::{Scheduler, TimerHandle};
