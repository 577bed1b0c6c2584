// File: questdeck-core/src/tasks/mod.rs

pub mod rotation;

pub use rotation::{spawn_rotation_task, RotationConfig, RotationScheduler, TickOutcome};
