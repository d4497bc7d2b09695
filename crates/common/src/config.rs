use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::Pose;

/// Upper bound on quads per terrain edge. Keeps the vertex count well inside
/// the `u32` index range.
pub const MAX_TERRAIN_SEGMENTS: u32 = 4096;

/// Errors raised while loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Scene construction parameters.
///
/// Everything here is consumed once when the scene is built. The per-frame
/// smoothing rates are fixed constants of the camera rig and are not
/// configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of particles in the field.
    pub particle_count: usize,
    /// Edge length of the cube particle offsets are scattered in.
    pub particle_spread: f32,
    /// Seed for the particle scatter.
    pub seed: u64,
    /// Edge length of the square terrain patch.
    pub terrain_size: f32,
    /// Quads per terrain edge.
    pub terrain_segments: u32,
    /// Vertical offset applied to the terrain patch.
    pub terrain_elevation: f32,
    /// Initial (and rest) camera pose.
    pub camera: Pose,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: 600,
            particle_spread: 30.0,
            seed: 42,
            terrain_size: 60.0,
            terrain_segments: 96,
            terrain_elevation: -4.0,
            camera: Pose::new(Vec3::new(0.0, 3.0, 14.0), Vec3::new(-0.15, 0.0, 0.0)),
        }
    }
}

impl SceneConfig {
    /// Load a config file, picking the parser from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let data = std::fs::read_to_string(path)?;
        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&data),
            "json" => Self::from_json_str(&data),
            _ => Err(ConfigError::UnsupportedFormat(ext)),
        }
    }

    pub fn from_yaml_str(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the config describes a buildable scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(invalid("particle_count", "must be at least 1"));
        }
        if !(self.particle_spread.is_finite() && self.particle_spread > 0.0) {
            return Err(invalid(
                "particle_spread",
                format!("must be positive and finite, got {}", self.particle_spread),
            ));
        }
        if !(self.terrain_size.is_finite() && self.terrain_size > 0.0) {
            return Err(invalid(
                "terrain_size",
                format!("must be positive and finite, got {}", self.terrain_size),
            ));
        }
        if self.terrain_segments == 0 {
            return Err(invalid("terrain_segments", "must be at least 1"));
        }
        if self.terrain_segments > MAX_TERRAIN_SEGMENTS {
            return Err(invalid(
                "terrain_segments",
                format!(
                    "must be at most {MAX_TERRAIN_SEGMENTS}, got {}",
                    self.terrain_segments
                ),
            ));
        }
        if !self.terrain_elevation.is_finite() {
            return Err(invalid("terrain_elevation", "must be finite"));
        }
        if !self.camera.is_finite() {
            return Err(invalid("camera", "pose must be finite"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn yaml_overrides_defaults() {
        let config = SceneConfig::from_yaml_str(
            "particle_count: 10\nterrain_segments: 4\ncamera:\n  position: [1.0, 2.0, 3.0]\n  rotation: [0.0, 0.5, 0.0]\n",
        )
        .unwrap();
        assert_eq!(config.particle_count, 10);
        assert_eq!(config.terrain_segments, 4);
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.seed, SceneConfig::default().seed);
    }

    #[test]
    fn json_round_trip() {
        let saved = SceneConfig {
            particle_count: 3,
            seed: 9,
            ..SceneConfig::default()
        };
        let text = serde_json::to_string(&saved).unwrap();
        let parsed = SceneConfig::from_json_str(&text).unwrap();
        assert_eq!(parsed, saved);
    }

    #[test]
    fn rejects_empty_particle_field() {
        let err = SceneConfig::from_yaml_str("particle_count: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "particle_count",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_positive_size() {
        let config = SceneConfig {
            terrain_size: -1.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "terrain_size",
                ..
            })
        ));

        let config = SceneConfig {
            particle_spread: f32::NAN,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_terrain() {
        let config = SceneConfig {
            terrain_segments: 65_536,
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "terrain_segments",
                ..
            })
        ));

        let err = SceneConfig::from_yaml_str("terrain_segments: 4097\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "terrain_segments",
                ..
            }
        ));

        let config = SceneConfig {
            terrain_segments: MAX_TERRAIN_SEGMENTS,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("scene.yaml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        writeln!(f, "seed: 7").unwrap();
        assert_eq!(SceneConfig::load(&yaml_path).unwrap().seed, 7);

        let json_path = dir.path().join("scene.json");
        std::fs::write(&json_path, r#"{"terrain_segments": 8}"#).unwrap();
        assert_eq!(SceneConfig::load(&json_path).unwrap().terrain_segments, 8);

        let toml_path = dir.path().join("scene.toml");
        std::fs::write(&toml_path, "seed = 1").unwrap();
        assert!(matches!(
            SceneConfig::load(&toml_path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
