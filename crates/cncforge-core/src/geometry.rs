//! Modal geometry vocabulary: positioning mode, active plane, envelope

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance mode (G90 / G91)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositioningMode {
    /// G90 - words carry literal coordinates
    #[default]
    Absolute,
    /// G91 - words carry deltas from the current position
    Incremental,
}

impl fmt::Display for PositioningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute => write!(f, "Absolute positioning (G90)"),
            Self::Incremental => write!(f, "Incremental positioning (G91)"),
        }
    }
}

/// Active plane for circular motion (G17 / G18 / G19)
///
/// Each plane names its two in-plane axes in the conventional order and the
/// remaining axis that carries helical motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Plane {
    /// G17 - X/Y with Z helical
    #[default]
    XY,
    /// G18 - Z/X with Y helical
    ZX,
    /// G19 - Y/Z with X helical
    YZ,
}

impl Plane {
    /// Split a point into its in-plane coordinates and its normal-axis height
    pub fn project(&self, p: DVec3) -> (DVec2, f64) {
        match self {
            Self::XY => (DVec2::new(p.x, p.y), p.z),
            Self::ZX => (DVec2::new(p.z, p.x), p.y),
            Self::YZ => (DVec2::new(p.y, p.z), p.x),
        }
    }

    /// Inverse of [`Plane::project`]
    pub fn unproject(&self, q: DVec2, height: f64) -> DVec3 {
        match self {
            Self::XY => DVec3::new(q.x, q.y, height),
            Self::ZX => DVec3::new(q.y, height, q.x),
            Self::YZ => DVec3::new(height, q.x, q.y),
        }
    }

    /// Arc offset letters for this plane, in in-plane axis order
    pub fn offset_letters(&self) -> (char, char) {
        match self {
            Self::XY => ('I', 'J'),
            Self::ZX => ('K', 'I'),
            Self::YZ => ('J', 'K'),
        }
    }

    /// The G code that selects this plane
    pub fn g_code(&self) -> u32 {
        match self {
            Self::XY => 17,
            Self::ZX => 18,
            Self::YZ => 19,
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XY => write!(f, "XY plane (G17)"),
            Self::ZX => write!(f, "ZX plane (G18)"),
            Self::YZ => write!(f, "YZ plane (G19)"),
        }
    }
}

/// Axis-aligned working volume used by the safety check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            min: [-1000.0, -1000.0, -500.0],
            max: [1000.0, 1000.0, 500.0],
        }
    }
}

impl Envelope {
    /// Create an envelope from its corners
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Whether every axis has min <= max
    pub fn is_valid(&self) -> bool {
        (0..3).all(|i| self.min[i] <= self.max[i])
    }

    /// Whether the point lies inside (boundary included)
    pub fn contains(&self, p: DVec3) -> bool {
        let c = p.to_array();
        (0..3).all(|i| c[i] >= self.min[i] && c[i] <= self.max[i])
    }

    /// Axis letters that fall outside the envelope for this point
    pub fn violations(&self, p: DVec3) -> Vec<char> {
        let c = p.to_array();
        ['X', 'Y', 'Z']
            .into_iter()
            .enumerate()
            .filter(|(i, _)| c[*i] < self.min[*i] || c[*i] > self.max[*i])
            .map(|(_, axis)| axis)
            .collect()
    }
}
