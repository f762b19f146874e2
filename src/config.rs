//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/balance/balance.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `BALANCE_*` prefix, `__` between section and key
//!    (e.g. `BALANCE_CHECK__TOLERANCE=0.001`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{LayoutParams, DEFAULT_LAYOUT_SCALE};
use crate::domain::layout::PROVISIONAL_SCALE;

/// Balance check settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckConfig {
    /// Largest net torque still counted as equilibrium
    pub tolerance: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

/// Layout sizing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Scale every beam starts with
    pub default_scale: f64,
    /// Base unit of the packing computation
    pub provisional_scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_scale: DEFAULT_LAYOUT_SCALE,
            provisional_scale: PROVISIONAL_SCALE,
        }
    }
}

/// Raw check config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCheckConfig {
    pub tolerance: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub default_scale: Option<f64>,
    pub provisional_scale: Option<f64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub check: RawCheckConfig,
    pub layout: RawLayoutConfig,
}

/// Unified configuration for balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub check: CheckConfig,
    pub layout: LayoutConfig,
}

/// Get the XDG config directory for balance.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "balance").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("balance.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            check: CheckConfig {
                tolerance: overlay.check.tolerance.unwrap_or(self.check.tolerance),
            },
            layout: LayoutConfig {
                default_scale: overlay
                    .layout
                    .default_scale
                    .unwrap_or(self.layout.default_scale),
                provisional_scale: overlay
                    .layout
                    .provisional_scale
                    .unwrap_or(self.layout.provisional_scale),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            debug!("loading config {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply BALANCE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("BALANCE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_float("check.tolerance") {
            settings.check.tolerance = val;
        }
        if let Ok(val) = config.get_float("layout.default_scale") {
            settings.layout.default_scale = val;
        }
        if let Ok(val) = config.get_float("layout.provisional_scale") {
            settings.layout.provisional_scale = val;
        }

        Ok(settings)
    }

    /// Reject values the passes cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if !self.check.tolerance.is_finite() || self.check.tolerance < 0.0 {
            return Err(ApplicationError::Config {
                message: format!("check.tolerance must be >= 0, got {}", self.check.tolerance),
            });
        }
        for (key, value) in [
            ("layout.default_scale", self.layout.default_scale),
            ("layout.provisional_scale", self.layout.provisional_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ApplicationError::Config {
                    message: format!("{} must be > 0, got {}", key, value),
                });
            }
        }
        Ok(())
    }

    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            provisional_scale: self.layout.provisional_scale,
        }
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unspecified_values() {
        let overlay: RawSettings = toml::from_str("[layout]\ndefault_scale = 25.0\n").unwrap();
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.layout.default_scale, 25.0);
        assert_eq!(merged.layout.provisional_scale, PROVISIONAL_SCALE);
        assert_eq!(merged.check.tolerance, 1e-9);
    }

    #[test]
    fn test_validate_rejects_negative_tolerance() {
        let mut settings = Settings::default();
        settings.check.tolerance = -1.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let mut settings = Settings::default();
        settings.layout.provisional_scale = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let settings = Settings::default();
        let parsed: Settings = toml::from_str(&settings.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, settings);
    }
}
