//! Engine configuration
//!
//! One file carries the toolpath expansion settings, the machine envelope,
//! and the optimizer defaults. JSON and TOML are both accepted; the format
//! follows the file extension.
//!
//! Sections:
//! - `toolpath`: arc resolution and back-boring geometry
//! - `machine`: working envelope and an optional feed ceiling
//! - `optimizer`: default controller, preset, and per-flag overrides

use cncforge_core::{Controller, Envelope, OptionsError};
use cncforge_optimizer::{OptimizationOptions, OptionsBuilder, Preset};
use cncforge_toolpath::ToolpathConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Directory under the platform config dir
pub const CONFIG_DIR_NAME: &str = "cncforge";

/// File name of the default config
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Machine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineSettings {
    /// Working volume checked by the safety pass
    #[serde(default)]
    pub envelope: Envelope,
    /// Feed ceiling below the controller's own limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_feed_rate: Option<f64>,
}

/// Per-flag overrides applied on top of the selected preset
///
/// Unset fields keep the preset's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_redundant: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_rapids: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_modal_codes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize_feed_rates: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simplify_arcs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc_tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_rounding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contour_smoothing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nano_smoothing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact_format: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_format: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversational: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_definitions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,
}

impl OptionOverrides {
    /// Apply every set field to a builder
    pub fn apply(&self, builder: OptionsBuilder) -> OptionsBuilder {
        let mut builder = builder;
        if let Some(value) = self.strip_comments {
            builder = builder.strip_comments(value);
        }
        if let Some(value) = self.remove_redundant {
            builder = builder.remove_redundant(value);
        }
        if let Some(value) = self.merge_rapids {
            builder = builder.merge_rapids(value);
        }
        if let Some(value) = self.merge_modal_codes {
            builder = builder.merge_modal_codes(value);
        }
        if let Some(value) = self.optimize_feed_rates {
            builder = builder.optimize_feed_rates(value);
        }
        if let Some(value) = self.simplify_arcs {
            builder = builder.simplify_arcs(value);
        }
        if let Some(value) = self.safety_check {
            builder = builder.safety_check(value);
        }
        if let Some(value) = self.decimal_places {
            builder = builder.decimal_places(value);
        }
        if let Some(value) = self.arc_tolerance {
            builder = builder.arc_tolerance(value);
        }
        if let Some(value) = self.corner_rounding {
            builder = builder.corner_rounding(value);
        }
        if let Some(value) = self.corner_radius {
            builder = builder.corner_radius(value);
        }
        if let Some(value) = self.contour_smoothing {
            builder = builder.contour_smoothing(value);
        }
        if let Some(value) = self.nano_smoothing {
            builder = builder.nano_smoothing(value);
        }
        if let Some(value) = self.compact_format {
            builder = builder.compact_format(value);
        }
        if let Some(value) = self.decimal_format {
            builder = builder.decimal_format(value);
        }
        if let Some(value) = self.conversational {
            builder = builder.conversational(value);
        }
        if let Some(value) = self.cycle_definitions {
            builder = builder.cycle_definitions(value);
        }
        if let Some(name) = &self.program_name {
            builder = builder.program_name(name.clone());
        }
        builder
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Optimizer defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Controller used when the caller names none
    #[serde(default = "default_controller")]
    pub controller: Controller,
    #[serde(default)]
    pub preset: Preset,
    #[serde(default, skip_serializing_if = "OptionOverrides::is_empty")]
    pub overrides: OptionOverrides,
}

fn default_controller() -> Controller {
    Controller::Generic
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            controller: default_controller(),
            preset: Preset::default(),
            overrides: OptionOverrides::default(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub toolpath: ToolpathConfig,
    #[serde(default)]
    pub machine: MachineSettings,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<platform config dir>/cncforge/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory(
                    "no configuration directory on this platform".to_string(),
                )
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = Format::of(path)?;

        let content = match format {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if let Err(err) = self.toolpath.validate() {
            return Err(match err {
                OptionsError::OutOfRange { name, .. } => SettingsError::InvalidSetting {
                    key: format!("toolpath.{name}"),
                    reason: "must be finite and > 0".to_string(),
                },
                other => other.into(),
            });
        }

        if !self.machine.envelope.is_valid() {
            return Err(SettingsError::InvalidSetting {
                key: "machine.envelope".to_string(),
                reason: "minimum exceeds maximum".to_string(),
            });
        }

        if let Some(max) = self.machine.max_feed_rate {
            if !(max.is_finite() && max > 0.0) {
                return Err(SettingsError::InvalidSetting {
                    key: "machine.max_feed_rate".to_string(),
                    reason: "must be finite and > 0".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Optimization options for the configured controller and preset
    pub fn to_options(&self) -> SettingsResult<OptimizationOptions> {
        self.options_for(self.optimizer.controller, self.optimizer.preset)
    }

    /// Optimization options for an explicit controller and preset
    ///
    /// The preset is the base, the overrides come next, and the machine and
    /// toolpath sections are applied last. The builder rejects overrides
    /// that do not belong to the controller.
    pub fn options_for(
        &self,
        controller: Controller,
        preset: Preset,
    ) -> SettingsResult<OptimizationOptions> {
        let builder = OptionsBuilder::from_preset(preset, controller);
        let options = self
            .optimizer
            .overrides
            .apply(builder)
            .envelope(self.machine.envelope)
            .max_feed_rate(self.machine.max_feed_rate)
            .toolpath(self.toolpath)
            .build()?;
        Ok(options)
    }
}
