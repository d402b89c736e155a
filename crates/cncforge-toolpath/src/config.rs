//! Expansion settings shared by the arc, cycle, and shape expanders

use cncforge_core::constants::{
    DEFAULT_ARC_RESOLUTION, DEFAULT_BACK_BORING_CUT, DEFAULT_BACK_BORING_SHIFT,
};
use cncforge_core::OptionsError;
use serde::{Deserialize, Serialize};

/// Settings for one toolpath pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolpathConfig {
    /// Target length of one interpolated segment (arcs and shape rings).
    /// Smaller values trade point volume for fidelity.
    pub arc_resolution: f64,
    /// Lateral shift for back boring when the line has no Q word
    pub back_boring_shift: f64,
    /// Upward cutting distance of the back boring phase
    pub back_boring_cut: f64,
}

impl Default for ToolpathConfig {
    fn default() -> Self {
        Self {
            arc_resolution: DEFAULT_ARC_RESOLUTION,
            back_boring_shift: DEFAULT_BACK_BORING_SHIFT,
            back_boring_cut: DEFAULT_BACK_BORING_CUT,
        }
    }
}

impl ToolpathConfig {
    /// Config with a custom arc resolution
    pub fn with_resolution(arc_resolution: f64) -> Self {
        Self {
            arc_resolution,
            ..Self::default()
        }
    }

    /// Check that every length is strictly positive and finite
    pub fn validate(&self) -> Result<(), OptionsError> {
        for (name, value) in [
            ("arc_resolution", self.arc_resolution),
            ("back_boring_shift", self.back_boring_shift),
            ("back_boring_cut", self.back_boring_cut),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(OptionsError::OutOfRange {
                    name: name.to_string(),
                    value,
                    min: 0.0,
                    max: f64::MAX,
                });
            }
        }
        Ok(())
    }

    /// Resolution with a fallback for values that slipped past validation
    pub(crate) fn resolution(&self) -> f64 {
        if self.arc_resolution.is_finite() && self.arc_resolution > 0.0 {
            self.arc_resolution
        } else {
            DEFAULT_ARC_RESOLUTION
        }
    }
}
