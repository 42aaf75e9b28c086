//! Pomocycle - a Pomodoro cycle timer.
//!
//! The [`engine::Engine`] counts down work and break intervals, switches
//! between them and keeps durable cycle statistics. Displays drive it through
//! its control methods and follow it through an [`engine::EngineObserver`].

pub mod clock;
pub mod display;
pub mod engine;
pub mod models;
pub mod notifications;
pub mod persistence;
pub mod stats;
pub mod timer;

#[cfg(test)]
mod testing;

pub use engine::{Engine, EngineEvent, EngineObserver, EngineParts};
pub use models::{ConfigError, CycleProgress, TimerConfiguration, TimerMode, TimerRunState};
