//! Controller identifiers
//!
//! The dialects a rewrite pass can target. Only Fanuc and Heidenhain have
//! dedicated rewrite branches; every other controller uses the generic
//! rule pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProgramError;

/// Target controller dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    Fanuc,
    Heidenhain,
    Siemens,
    Haas,
    Mazak,
    Okuma,
    Generic,
}

/// Feed rate window accepted by a controller (units per minute)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedLimits {
    pub min: f64,
    pub max: f64,
}

impl FeedLimits {
    /// Clamp a programmed feed into the window
    pub fn clamp(&self, feed: f64) -> f64 {
        feed.clamp(self.min, self.max)
    }
}

impl Controller {
    /// Every accepted controller, in display order
    pub const ALL: [Controller; 7] = [
        Controller::Fanuc,
        Controller::Heidenhain,
        Controller::Siemens,
        Controller::Haas,
        Controller::Mazak,
        Controller::Okuma,
        Controller::Generic,
    ];

    /// Lower-case identifier as accepted by `FromStr`
    pub fn id(&self) -> &'static str {
        match self {
            Self::Fanuc => "fanuc",
            Self::Heidenhain => "heidenhain",
            Self::Siemens => "siemens",
            Self::Haas => "haas",
            Self::Mazak => "mazak",
            Self::Okuma => "okuma",
            Self::Generic => "generic",
        }
    }

    /// Feed window enforced by the feed optimization rule and the safety check
    pub fn feed_limits(&self) -> FeedLimits {
        let max = match self {
            Self::Fanuc => 15_000.0,
            Self::Heidenhain => 20_000.0,
            Self::Siemens => 20_000.0,
            Self::Haas => 16_500.0,
            Self::Mazak => 18_000.0,
            Self::Okuma => 16_000.0,
            Self::Generic => 10_000.0,
        };
        FeedLimits { min: 1.0, max }
    }

    /// Whether this controller has its own rewrite branch
    pub fn has_dedicated_branch(&self) -> bool {
        matches!(self, Self::Fanuc | Self::Heidenhain)
    }

    fn expected_list() -> String {
        Self::ALL
            .iter()
            .map(|c| c.id())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fanuc => write!(f, "Fanuc"),
            Self::Heidenhain => write!(f, "Heidenhain"),
            Self::Siemens => write!(f, "Siemens"),
            Self::Haas => write!(f, "Haas"),
            Self::Mazak => write!(f, "Mazak"),
            Self::Okuma => write!(f, "Okuma"),
            Self::Generic => write!(f, "Generic"),
        }
    }
}

impl FromStr for Controller {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.id() == wanted)
            .ok_or_else(|| ProgramError::UnknownController {
                name: s.to_string(),
                expected: Self::expected_list(),
            })
    }
}
