//! Volumetric shape expander
//!
//! Non-standard extension codes that mill a whole shape from one line:
//! G12/G13 circle pockets, G13.1 sphere caps, G13.2 cones and G13.3
//! extrusion ribbons.

use cncforge_core::constants::{COORD_TOLERANCE, MIN_ARC_SEGMENTS, MIN_CONE_LAYERS};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

use super::modal::ModalState;
use super::tokenizer::ProgramLine;
use crate::config::ToolpathConfig;
use crate::diagnostics::ParseWarning;
use crate::toolpath::{ShapeInfo, ToolpathPoint};

/// Shape extension codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// G12 (clockwise) / G13 (counter-clockwise)
    Circle { clockwise: bool },
    /// G13.1
    Sphere,
    /// G13.2
    Cone,
    /// G13.3
    Extrusion,
}

impl ShapeKind {
    /// Map a code key (G number times ten) to a shape
    pub fn from_key(key: u32) -> Option<Self> {
        match key {
            120 => Some(Self::Circle { clockwise: true }),
            130 => Some(Self::Circle { clockwise: false }),
            131 => Some(Self::Sphere),
            132 => Some(Self::Cone),
            133 => Some(Self::Extrusion),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Circle { clockwise: true } => "G12",
            Self::Circle { clockwise: false } => "G13",
            Self::Sphere => "G13.1",
            Self::Cone => "G13.2",
            Self::Extrusion => "G13.3",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Circle { .. } => "circle milling",
            Self::Sphere => "sphere milling",
            Self::Cone => "cone milling",
            Self::Extrusion => "extrusion",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// A validated shape line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRequest {
    pub kind: ShapeKind,
    /// Tool position before the shape
    pub start: DVec3,
    /// Circle/sphere center, cone base center, or extrusion rail end
    pub anchor: DVec3,
    /// Radius for round shapes, full width for extrusion
    pub size: f64,
    /// Pass count (circle), cap height (sphere), signed height (cone).
    /// Unused for extrusion.
    pub extent: f64,
    pub feed: Option<f64>,
    pub line: usize,
}

impl ShapeRequest {
    /// Read a shape line against the current state
    ///
    /// A missing or non-positive size word is reported as a warning and the
    /// shape is skipped.
    pub fn from_line(
        kind: ShapeKind,
        state: &ModalState,
        line: &ProgramLine,
    ) -> Result<Self, ParseWarning> {
        let start = state.position;
        let anchor = state.resolve_target(line);
        let missing = |what: &str| {
            ParseWarning::new(
                line.number,
                format!("{} without a positive {}, shape skipped", kind.code(), what),
            )
        };
        let positive = |value: Option<f64>| value.map(f64::abs).filter(|v| *v > COORD_TOLERANCE);

        let (size, extent) = match kind {
            ShapeKind::Circle { .. } => {
                let radius = positive(line.value('R').or_else(|| line.value('I')))
                    .ok_or_else(|| missing("radius (R)"))?;
                let passes = line.value('Q').map(|q| q.round().max(1.0)).unwrap_or(1.0);
                (radius, passes)
            }
            ShapeKind::Sphere => {
                let radius = positive(line.value('R')).ok_or_else(|| missing("radius (R)"))?;
                let cap = match line.value('Q') {
                    Some(q) if q > COORD_TOLERANCE => q,
                    Some(_) => return Err(missing("cap height (Q)")),
                    None => radius,
                };
                (radius, cap)
            }
            ShapeKind::Cone => {
                let radius = positive(line.value('R')).ok_or_else(|| missing("radius (R)"))?;
                let height = line
                    .value('Q')
                    .filter(|q| q.abs() > COORD_TOLERANCE)
                    .ok_or_else(|| missing("height (Q)"))?;
                (radius, height)
            }
            ShapeKind::Extrusion => {
                let width = positive(line.value('Q')).ok_or_else(|| missing("width (Q)"))?;
                if (anchor - start).truncate().length() < COORD_TOLERANCE {
                    return Err(ParseWarning::new(
                        line.number,
                        "G13.3 rail has no length in XY, shape skipped",
                    ));
                }
                (width, 0.0)
            }
        };

        Ok(Self {
            kind,
            start,
            anchor,
            size,
            extent,
            feed: state.feed_rate,
            line: line.number,
        })
    }

    /// Where the tool rests after the shape: circle center, sphere pole,
    /// cone apex, or the first extrusion corner
    pub fn end_position(&self) -> DVec3 {
        match self.kind {
            ShapeKind::Circle { .. } => self.anchor,
            ShapeKind::Sphere => self.anchor + DVec3::Z * self.size,
            ShapeKind::Cone => self.anchor + DVec3::Z * self.extent,
            ShapeKind::Extrusion => self.start + self.rail_normal(),
        }
    }

    /// Half-width XY perpendicular of the extrusion rail
    fn rail_normal(&self) -> DVec3 {
        let dir = (self.anchor - self.start).truncate().normalize_or_zero();
        DVec3::new(-dir.y, dir.x, 0.0) * (self.size / 2.0)
    }

    fn info(&self) -> ShapeInfo {
        ShapeInfo {
            kind: self.kind,
            anchor: self.anchor.to_array(),
            size: self.size,
            extent: self.extent,
        }
    }
}

/// Points and warnings produced by one shape
#[derive(Debug, Clone, Default)]
pub struct ShapeExpansion {
    pub points: Vec<ToolpathPoint>,
    pub warnings: Vec<ParseWarning>,
}

/// Closed ring of `max(4, ceil(circumference / resolution))` segments
/// starting at angle zero. A zero radius collapses to the center.
fn ring(center: DVec3, radius: f64, clockwise: bool, resolution: f64) -> Vec<DVec3> {
    if radius < COORD_TOLERANCE {
        return vec![center];
    }
    let segments = ((TAU * radius / resolution).ceil() as usize).max(MIN_ARC_SEGMENTS);
    let sign = if clockwise { -1.0 } else { 1.0 };
    (0..=segments)
        .map(|i| {
            let angle = sign * TAU * i as f64 / segments as f64;
            let offset = DVec2::new(angle.cos(), angle.sin()) * radius;
            center + offset.extend(0.0)
        })
        .collect()
}

fn circle_points(req: &ShapeRequest, clockwise: bool, resolution: f64) -> Vec<DVec3> {
    let passes = req.extent.max(1.0) as usize;
    let mut points = Vec::new();
    for pass in 0..passes {
        let radius = req.size * (passes - pass) as f64 / passes as f64;
        points.extend(ring(req.anchor, radius, clockwise, resolution));
    }
    points.push(req.anchor);
    points
}

fn sphere_points(req: &ShapeRequest, cap: f64, resolution: f64) -> Vec<DVec3> {
    let radius = req.size;
    let polar_max = (1.0 - cap / radius).clamp(-1.0, 1.0).acos();
    let rings = ((radius * polar_max / resolution).ceil() as usize).max(MIN_ARC_SEGMENTS);

    let mut points = Vec::new();
    for i in 0..=rings {
        let polar = polar_max * (1.0 - i as f64 / rings as f64);
        let center = req.anchor + DVec3::Z * (radius * polar.cos());
        if i == rings {
            points.push(center);
        } else {
            points.extend(ring(center, radius * polar.sin(), false, resolution));
        }
    }
    points
}

fn cone_points(req: &ShapeRequest, resolution: f64) -> Vec<DVec3> {
    let height = req.extent;
    let layers = ((height.abs() / (resolution / 2.0)).ceil() as usize).max(MIN_CONE_LAYERS);

    let mut points = Vec::new();
    for i in 0..=layers {
        let t = i as f64 / layers as f64;
        let center = req.anchor + DVec3::Z * (height * t);
        if i == layers {
            points.push(center);
        } else {
            points.extend(ring(center, req.size * (1.0 - t), false, resolution));
        }
    }
    points
}

fn extrusion_points(req: &ShapeRequest) -> Vec<DVec3> {
    let n = req.rail_normal();
    let (p0, p1) = (req.start, req.anchor);
    vec![p0 + n, p1 + n, p1 - n, p0 - n, p0 + n]
}

/// Expand a shape into marker + dense points + closing marker
///
/// The opening `ShapeMarker` sits on the first point and carries the shape
/// metadata; the closing one sits on the last point and carries none.
pub fn expand_shape(req: &ShapeRequest, config: &ToolpathConfig) -> ShapeExpansion {
    let resolution = config.resolution();
    let mut warnings = Vec::new();

    let dense = match req.kind {
        ShapeKind::Circle { clockwise } => circle_points(req, clockwise, resolution),
        ShapeKind::Sphere => {
            let mut cap = req.extent;
            if cap > 2.0 * req.size {
                cap = 2.0 * req.size;
                warnings.push(ParseWarning::new(
                    req.line,
                    format!("sphere cap height clamped to the diameter {:.4}", cap),
                ));
            }
            sphere_points(req, cap, resolution)
        }
        ShapeKind::Cone => cone_points(req, resolution),
        ShapeKind::Extrusion => extrusion_points(req),
    };

    let last = dense.len().saturating_sub(1);
    let points = dense
        .into_iter()
        .enumerate()
        .map(|(i, at)| {
            if i == 0 {
                ToolpathPoint::shape_marker(at, req.feed, req.line, Some(req.info()))
            } else if i == last {
                ToolpathPoint::shape_marker(at, req.feed, req.line, None)
            } else {
                ToolpathPoint::shape(at, req.feed, req.line)
            }
        })
        .collect();

    ShapeExpansion { points, warnings }
}
