//! Configuration system
//!
//! Scene, physics and debug settings, loadable from TOML or RON files.

pub use serde::{Serialize, Deserialize};

use crate::foundation::math::{colors, Color};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value was parsed but is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Broadphase settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Side length of a spatial hash cell in world units
    pub cell_size: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { cell_size: 100.0 }
    }
}

/// Debug rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Master switch for `Scene::debug_render`
    pub enabled: bool,
    /// Color of collider bounds rectangles
    pub collider_color: Color,
    /// Also outline the actual shapes (circles, compound parts)
    pub draw_shapes: bool,
    /// Color used for shape outlines
    pub shape_color: Color,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            collider_color: colors::indian_red(),
            draw_shapes: false,
            shape_color: colors::light_green(),
        }
    }
}

/// Top-level scene configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Physics/broadphase settings
    pub physics: PhysicsConfig,
    /// Debug rendering settings
    pub debug: DebugConfig,
}

impl SceneConfig {
    /// Validate value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cell_size = self.physics.cell_size;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "physics.cell_size must be a positive finite number, got {cell_size}"
            )));
        }
        Ok(())
    }
}

impl Config for SceneConfig {}
