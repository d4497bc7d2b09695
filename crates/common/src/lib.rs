//! Shared types and scene configuration.

mod config;
mod types;

pub use config::{ConfigError, MAX_TERRAIN_SEGMENTS, SceneConfig};
pub use types::Pose;
