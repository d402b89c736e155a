//! # CNCForge Toolpath
//!
//! Turns G-code program text into the ordered waypoint sequence consumed by
//! renderers and simulators.
//!
//! Data flows one way: raw text -> tokens -> modal-resolved motions ->
//! expanded waypoints -> assembled toolpath. Modal state is created fresh for
//! every pass and threaded through each resolution step by value.

pub mod config;
pub mod diagnostics;
pub mod gcode;
pub mod toolpath;

pub use config::ToolpathConfig;
pub use diagnostics::ParseWarning;
pub use gcode::{
    expand_cycle, expand_shape, has_executable_lines, interpolate_arc, resolve_arc, resolve_line,
    split_comment, tokenize, ArcDirection, ArcMove, CenterSpec, CycleCode, CycleExpansion,
    CycleKind, CycleParams, FixedCycle, ModalState, Motion, MotionClass, MotionMode, ProgramLine,
    Resolution, ShapeExpansion, ShapeKind, ShapeRequest, Step, Word,
};
pub use toolpath::{
    ArcInfo, CycleInfo, CyclePhase, MotionKind, ShapeInfo, Toolpath, ToolpathPoint,
    ToolpathStream,
};
