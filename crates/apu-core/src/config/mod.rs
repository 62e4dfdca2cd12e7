//! Engine configuration
//!
//! Defaults for new APUs and the tolerances used when comparing values,
//! parsed from TOML. Every section is optional.

use std::path::Path;

use apu_model::apu::{DEFAULT_JORNADA, DEFAULT_RENDIMIENTO};
use apu_model::ApuParams;
use serde::{Deserialize, Serialize};

use crate::broadcast::BROADCAST_TOLERANCE;
use crate::{Error, Result};

/// Smallest difference that makes a persisted field count as changed
pub const DEFAULT_CHANGE_TOLERANCE: f64 = 0.0001;

fn default_rendimiento() -> f64 {
    DEFAULT_RENDIMIENTO
}

fn default_jornada() -> f64 {
    DEFAULT_JORNADA
}

fn default_change() -> f64 {
    DEFAULT_CHANGE_TOLERANCE
}

fn default_broadcast() -> f64 {
    BROADCAST_TOLERANCE
}

/// Parameters given to an APU that has none yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default = "default_rendimiento")]
    pub rendimiento: f64,
    #[serde(default = "default_jornada")]
    pub jornada: f64,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            rendimiento: default_rendimiento(),
            jornada: default_jornada(),
        }
    }
}

/// Comparison thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSection {
    /// Reconciliation change detection
    #[serde(default = "default_change")]
    pub change: f64,
    /// Minimum difference for a broadcast price to be applied
    #[serde(default = "default_broadcast")]
    pub broadcast: f64,
}

impl Default for ToleranceSection {
    fn default() -> Self {
        Self {
            change: default_change(),
            broadcast: default_broadcast(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub tolerance: ToleranceSection,
}

impl EngineConfig {
    /// Parse a configuration from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use apu_core::config::EngineConfig;
    ///
    /// let config = EngineConfig::parse(r#"
    /// [defaults]
    /// jornada = 9.5
    /// "#).unwrap();
    ///
    /// assert_eq!(config.defaults.jornada, 9.5);
    /// assert_eq!(config.defaults.rendimiento, 1.0);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] when the file does not exist, or a
    /// parse or validation error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Overlay another configuration on this one.
    ///
    /// Values in `other` that differ from the defaults take precedence.
    pub fn merge(&mut self, other: &EngineConfig) {
        let base = EngineConfig::default();
        let overlay = |target: &mut f64, value: f64, default: f64| {
            if value != default {
                *target = value;
            }
        };

        overlay(
            &mut self.defaults.rendimiento,
            other.defaults.rendimiento,
            base.defaults.rendimiento,
        );
        overlay(&mut self.defaults.jornada, other.defaults.jornada, base.defaults.jornada);
        overlay(&mut self.tolerance.change, other.tolerance.change, base.tolerance.change);
        overlay(
            &mut self.tolerance.broadcast,
            other.tolerance.broadcast,
            base.tolerance.broadcast,
        );
    }

    /// Reject non-positive or non-finite values
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("defaults.rendimiento", self.defaults.rendimiento),
            ("defaults.jornada", self.defaults.jornada),
            ("tolerance.change", self.tolerance.change),
            ("tolerance.broadcast", self.tolerance.broadcast),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("{} must be a positive number, got {}", name, value),
                });
            }
        }
        Ok(())
    }

    /// Parameters for an APU created from scratch
    pub fn default_params(&self) -> ApuParams {
        ApuParams {
            rendimiento: self.defaults.rendimiento,
            jornada: self.defaults.jornada,
        }
    }
}
