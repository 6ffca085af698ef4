//! Core: configuration, state wiring, background tasks

pub mod config;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use state::StationState;
pub use tasks::{BackgroundTasks, TaskKind};
