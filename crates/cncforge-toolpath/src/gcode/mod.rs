//! G-code interpretation: tokenizing, modal state, motion resolution and
//! the arc, cycle and shape expanders.

pub mod arc;
pub mod cycles;
pub mod modal;
pub mod motion;
pub mod shapes;
pub mod tokenizer;

pub use arc::{interpolate_arc, resolve_arc, ArcDirection, ArcMove, CenterSpec};
pub use cycles::{expand_cycle, CycleCode, CycleExpansion, CycleKind, CycleParams, FixedCycle};
pub use modal::{ActiveCycle, ModalState, MotionMode};
pub use motion::{resolve_line, Motion, Resolution, Step};
pub use shapes::{expand_shape, ShapeExpansion, ShapeKind, ShapeRequest};
pub use tokenizer::{has_executable_lines, split_comment, tokenize, MotionClass, ProgramLine, Word};
