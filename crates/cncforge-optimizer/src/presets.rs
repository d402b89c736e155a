//! Named option presets
//!
//! A preset is a template of [`OptimizationOptions`](crate::OptimizationOptions)
//! values, never a separate code path.

use cncforge_core::OptionsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Normalization and redundancy removal
    #[default]
    Basic,
    /// Fewer, denser blocks
    Speed,
    /// Smoother contours
    Quality,
    /// Everything
    Advanced,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Basic, Preset::Speed, Preset::Quality, Preset::Advanced];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Speed => "speed",
            Self::Quality => "quality",
            Self::Advanced => "advanced",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Basic => "Drop empty lines and redundant blocks, keep the safety check",
            Self::Speed => {
                "Basic plus rapid and modal merging, feed optimization and compact dialect output"
            }
            Self::Quality => "Basic plus arc fitting and contour smoothing",
            Self::Advanced => "Every generic rule plus the full dialect branch",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Preset {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| OptionsError::UnknownPreset(s.to_string()))
    }
}
