//! Arc resolution and interpolation
//!
//! Resolves G2/G3 moves to a center, radius and angular sweep in the active
//! plane, then expands them into discrete points.

use cncforge_core::constants::{ARC_RADIUS_EPSILON, COORD_TOLERANCE, MIN_ARC_SEGMENTS};
use cncforge_core::Plane;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::diagnostics::ParseWarning;

/// Rotation direction, viewed in the active plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcDirection {
    /// G2
    Clockwise,
    /// G3
    CounterClockwise,
}

impl ArcDirection {
    pub fn g_code(&self) -> u32 {
        match self {
            Self::Clockwise => 2,
            Self::CounterClockwise => 3,
        }
    }

    pub fn is_clockwise(&self) -> bool {
        matches!(self, Self::Clockwise)
    }
}

/// How the arc center was programmed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CenterSpec {
    /// In-plane I/J/K offsets from the start point (always incremental)
    Offsets(DVec2),
    /// R word; negative selects the major arc
    Radius(f64),
}

/// A fully resolved circular move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcMove {
    pub start: DVec3,
    pub end: DVec3,
    /// Center at the start height of the normal axis
    pub center: DVec3,
    pub radius: f64,
    pub start_angle: f64,
    /// Already unwrapped: below `start_angle` for CW, above for CCW
    pub end_angle: f64,
    pub direction: ArcDirection,
    pub plane: Plane,
    /// Normal-axis height at the end, when the move is helical
    pub helical_end: Option<f64>,
    pub feed: Option<f64>,
    pub line: usize,
}

impl ArcMove {
    /// Signed angular sweep
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn length(&self) -> f64 {
        self.radius * self.sweep().abs()
    }

    /// `max(4, ceil(length / resolution))`
    pub fn segment_count(&self, resolution: f64) -> usize {
        let segments = (self.length() / resolution).ceil();
        if segments.is_finite() && segments > 0.0 {
            (segments as usize).max(MIN_ARC_SEGMENTS)
        } else {
            MIN_ARC_SEGMENTS
        }
    }

    pub fn is_full_circle(&self) -> bool {
        (self.sweep().abs() - TAU).abs() < 1e-9
    }
}

/// Resolve a circular move in `plane` from `start` to `end`
///
/// Returns `None` when the move cannot be an arc (zero radius, or an R-form
/// arc with coincident endpoints); the caller degrades it to a linear move.
/// Recoverable problems are pushed onto `warnings`.
#[allow(clippy::too_many_arguments)]
pub fn resolve_arc(
    start: DVec3,
    end: DVec3,
    center: CenterSpec,
    direction: ArcDirection,
    plane: Plane,
    feed: Option<f64>,
    line: usize,
    warnings: &mut Vec<ParseWarning>,
) -> Option<ArcMove> {
    let (s, start_height) = plane.project(start);
    let (e, end_height) = plane.project(end);

    let (center_2d, radius) = match center {
        CenterSpec::Offsets(offset) => {
            let radius = offset.length();
            if radius < ARC_RADIUS_EPSILON {
                warnings.push(ParseWarning::new(
                    line,
                    "arc center offsets are zero, treated as linear move",
                ));
                return None;
            }
            (s + offset, radius)
        }
        CenterSpec::Radius(requested) => {
            let chord = e - s;
            let d = chord.length();
            if d < COORD_TOLERANCE {
                warnings.push(ParseWarning::new(
                    line,
                    "radius arc with coincident endpoints, treated as linear move",
                ));
                return None;
            }

            let mut radius = requested.abs();
            let half = d / 2.0;
            if radius < half {
                let clamped = half + ARC_RADIUS_EPSILON;
                warnings.push(ParseWarning::new(
                    line,
                    format!(
                        "arc radius {:.4} is shorter than half the chord {:.4}, clamped to {:.4}",
                        radius, half, clamped
                    ),
                ));
                radius = clamped;
            }

            let h = (radius * radius - half * half).max(0.0).sqrt();
            let u = chord / d;
            let right = DVec2::new(u.y, -u.x);
            // CW puts the minor-arc center on the right of the chord
            let mut side = if direction.is_clockwise() { 1.0 } else { -1.0 };
            if requested < 0.0 {
                side = -side;
            }
            (s + chord * 0.5 + right * (h * side), radius)
        }
    };

    let start_angle = (s.y - center_2d.y).atan2(s.x - center_2d.x);
    let raw_end = (e.y - center_2d.y).atan2(e.x - center_2d.x);

    let full_circle =
        matches!(center, CenterSpec::Offsets(_)) && (e - s).length() < COORD_TOLERANCE;

    let end_angle = match direction {
        ArcDirection::Clockwise if full_circle => start_angle - TAU,
        ArcDirection::CounterClockwise if full_circle => start_angle + TAU,
        ArcDirection::Clockwise if raw_end >= start_angle => raw_end - TAU,
        ArcDirection::CounterClockwise if raw_end <= start_angle => raw_end + TAU,
        _ => raw_end,
    };

    let helical_end = if (end_height - start_height).abs() > COORD_TOLERANCE {
        Some(end_height)
    } else {
        None
    };

    Some(ArcMove {
        start,
        end,
        center: plane.unproject(center_2d, start_height),
        radius,
        start_angle,
        end_angle,
        direction,
        plane,
        helical_end,
        feed,
        line,
    })
}

/// Expand an arc into points, start included
///
/// Point 0 is pinned to the start and the last point to the programmed end;
/// the points between lie on the circle with the normal axis interpolated
/// linearly for helical moves.
pub fn interpolate_arc(arc: &ArcMove, resolution: f64) -> Vec<DVec3> {
    let segments = arc.segment_count(resolution);
    let (center, _) = arc.plane.project(arc.center);
    let (_, start_height) = arc.plane.project(arc.start);
    let (_, end_height) = arc.plane.project(arc.end);
    let sweep = arc.sweep();

    let mut points = Vec::with_capacity(segments + 1);
    points.push(arc.start);
    for i in 1..segments {
        let t = i as f64 / segments as f64;
        let angle = arc.start_angle + sweep * t;
        let q = center + DVec2::new(angle.cos(), angle.sin()) * arc.radius;
        let height = start_height + (end_height - start_height) * t;
        points.push(arc.plane.unproject(q, height));
    }
    points.push(arc.end);
    points
}
