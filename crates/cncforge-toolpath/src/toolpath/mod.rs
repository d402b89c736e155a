//! Toolpath assembly
//!
//! The canonical output of a parse pass: one [`ToolpathPoint`] per resolved
//! position, in program order, including every cycle and shape waypoint.

mod stream;

pub use stream::ToolpathStream;

use cncforge_core::{Plane, ProgramError};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::config::ToolpathConfig;
use crate::diagnostics::ParseWarning;
use crate::gcode::{ArcDirection, ArcMove, CycleKind, ShapeKind};

/// How the tool reached a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    Rapid,
    Linear,
    Arc,
    Dwell,
    /// Opens a shape (with metadata) or closes it (without)
    ShapeMarker,
    Shape,
}

/// Arc metadata carried by every interpolated arc point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcInfo {
    pub center: [f64; 3],
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub direction: ArcDirection,
    pub plane: Plane,
}

impl From<&ArcMove> for ArcInfo {
    fn from(arc: &ArcMove) -> Self {
        Self {
            center: arc.center.to_array(),
            radius: arc.radius,
            start_angle: arc.start_angle,
            end_angle: arc.end_angle,
            direction: arc.direction,
            plane: arc.plane,
        }
    }
}

/// Phase of a canned cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePhase {
    /// Rapid to X/Y at the R plane
    Approach,
    /// Move down to the hole bottom
    Plunge,
    /// One peck-drilling depth step
    Peck,
    Dwell,
    /// Back to the R plane
    Retract,
    /// Lateral offset move (back boring)
    Shift,
    /// Feed back onto the hole axis (back boring)
    Center,
    /// Upward cut (back boring)
    BackCut,
    /// Return to the hole axis at R (back boring)
    Return,
}

/// Cycle metadata
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleInfo {
    pub g_code: u32,
    /// `None` for cycle codes expanded with the generic fallback
    pub kind: Option<CycleKind>,
    pub phase: CyclePhase,
    /// 1-based peck number for peck drilling
    pub peck: Option<u32>,
    /// Dwell time in seconds, on dwell phases
    pub dwell: Option<f64>,
}

/// Shape metadata carried by the opening marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeInfo {
    pub kind: ShapeKind,
    pub anchor: [f64; 3],
    pub size: f64,
    pub extent: f64,
}

/// One waypoint of the assembled toolpath
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolpathPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub feed: Option<f64>,
    pub kind: MotionKind,
    pub is_rapid: bool,
    /// 1-based source line
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc: Option<ArcInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<CycleInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeInfo>,
}

impl ToolpathPoint {
    fn new(at: DVec3, feed: Option<f64>, kind: MotionKind, line: usize) -> Self {
        Self {
            x: at.x,
            y: at.y,
            z: at.z,
            feed,
            kind,
            is_rapid: kind == MotionKind::Rapid,
            line,
            arc: None,
            cycle: None,
            shape: None,
        }
    }

    pub fn rapid(at: DVec3, line: usize) -> Self {
        Self::new(at, None, MotionKind::Rapid, line)
    }

    pub fn linear(at: DVec3, feed: Option<f64>, line: usize) -> Self {
        Self::new(at, feed, MotionKind::Linear, line)
    }

    pub fn arc(at: DVec3, arc: &ArcMove) -> Self {
        let mut point = Self::new(at, arc.feed, MotionKind::Arc, arc.line);
        point.arc = Some(ArcInfo::from(arc));
        point
    }

    pub fn dwell(at: DVec3, line: usize) -> Self {
        Self::new(at, None, MotionKind::Dwell, line)
    }

    pub fn shape_marker(
        at: DVec3,
        feed: Option<f64>,
        line: usize,
        info: Option<ShapeInfo>,
    ) -> Self {
        let mut point = Self::new(at, feed, MotionKind::ShapeMarker, line);
        point.shape = info;
        point
    }

    pub fn shape(at: DVec3, feed: Option<f64>, line: usize) -> Self {
        Self::new(at, feed, MotionKind::Shape, line)
    }

    pub fn with_cycle(mut self, info: CycleInfo) -> Self {
        self.cycle = Some(info);
        self
    }

    pub fn position(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// Whether the move into this point cuts material at a feed rate
    pub fn is_feed_move(&self) -> bool {
        matches!(
            self.kind,
            MotionKind::Linear | MotionKind::Arc | MotionKind::ShapeMarker | MotionKind::Shape
        )
    }
}

/// A fully materialized toolpath
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Toolpath {
    pub points: Vec<ToolpathPoint>,
    pub warnings: Vec<ParseWarning>,
}

impl Toolpath {
    /// Parse a whole program into its toolpath
    ///
    /// Fails only when the program has no executable line. For very long
    /// programs prefer [`ToolpathStream`], which never holds more than one
    /// line's expansion.
    pub fn assemble(text: &str, config: &ToolpathConfig) -> Result<Self, ProgramError> {
        let mut stream = ToolpathStream::new(text, *config)?;
        let points: Vec<ToolpathPoint> = stream.by_ref().collect();
        let warnings = stream.into_warnings();
        tracing::debug!(
            "Assembled {} toolpath points ({} warnings)",
            points.len(),
            warnings.len()
        );
        Ok(Self { points, warnings })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounds of every point
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let mut points = self.points.iter().map(ToolpathPoint::position);
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}
