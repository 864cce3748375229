//! Configuration for button controls.
//!
//! Loaded from TOML. Every field has a default, so a missing file or a
//! partial file is fine.
//!
//! ```toml
//! [animation]
//! pressed_scale = 0.96
//! press_duration_ms = 80
//! release_duration_ms = 160
//! easing = "linear"
//!
//! [defaults]
//! variant = "secondary"
//! size = "small"
//! ```

use crate::animation::Easing;
use crate::types::{Size, Variant};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Press feedback settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Scale while pressed (0 < scale <= 1)
    pub pressed_scale: f32,
    /// Duration of the press-in transition
    pub press_duration_ms: u64,
    /// Duration of the release transition
    pub release_duration_ms: u64,
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            pressed_scale: 0.98,
            press_duration_ms: 100,
            release_duration_ms: 150,
            easing: Easing::EaseOut,
        }
    }
}

/// Declared props used when a control does not set them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub variant: Variant,
    pub size: Size,
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub animation: AnimationConfig,
    pub defaults: DefaultsConfig,
}

impl ButtonConfig {
    /// Get the default config file path.
    ///
    /// Can be overridden with the `BUTTON_CORE_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("BUTTON_CORE_CONFIG") {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "button-core")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("button-core.toml"))
    }

    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load configuration from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let anim = &self.animation;

        if !(anim.pressed_scale > 0.0 && anim.pressed_scale <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "pressed_scale must be in (0, 1], got {}",
                anim.pressed_scale
            )));
        }
        if anim.press_duration_ms == 0 || anim.release_duration_ms == 0 {
            return Err(Error::InvalidConfig(
                "animation durations must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
