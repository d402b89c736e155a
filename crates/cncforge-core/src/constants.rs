//! Numeric constants shared by the resolver and the optimizer.

/// Two coordinates closer than this are the same point (four-decimal precision).
pub const COORD_TOLERANCE: f64 = 1e-4;

/// Amount added to a too-small arc radius so that the half-chord fits.
pub const ARC_RADIUS_EPSILON: f64 = 1e-6;

/// Default length of one interpolated arc segment.
pub const DEFAULT_ARC_RESOLUTION: f64 = 10.0;

/// Minimum number of segments for any interpolated arc.
pub const MIN_ARC_SEGMENTS: usize = 4;

/// Minimum number of layers for cone milling.
pub const MIN_CONE_LAYERS: usize = 4;

/// Upper bound on the pecks of one peck drilling cycle.
pub const MAX_PECKS: usize = 1000;

/// Default lateral shift for back boring when the line carries no Q word.
pub const DEFAULT_BACK_BORING_SHIFT: f64 = 1.0;

/// Default upward cutting distance of the back boring phase.
pub const DEFAULT_BACK_BORING_CUT: f64 = 2.0;

/// Default number of decimal places written by the optimizer.
pub const DEFAULT_DECIMAL_PLACES: u8 = 3;

/// Nominal block length used by the time-saving heuristic.
pub const NOMINAL_BLOCK_LENGTH: f64 = 1.0;
