//! # CNCForge Optimizer
//!
//! Controller-aware rewriting of G-code programs.
//!
//! A program goes through an ordered pipeline of rules (normalize,
//! redundancy, consolidation, feed/arc, then the Fanuc or Heidenhain
//! branch), after which the result is re-resolved through the toolpath
//! engine and checked against the machine envelope and feed limits.
//!
//! ```no_run
//! use cncforge_core::Controller;
//! use cncforge_optimizer::{optimize, OptimizationOptions, Preset};
//!
//! let options = OptimizationOptions::preset(Preset::Speed, Controller::Fanuc);
//! let result = optimize("G0 X0 Y0\nG0 X10 Y0\nG0 X20 Y0", "fanuc", &options)?;
//! println!("{}", result.optimized_code);
//! # Ok::<(), cncforge_core::Error>(())
//! ```

mod block;
pub mod format;
pub mod optimizer;
pub mod options;
pub mod pipeline;
pub mod presets;
pub mod result;
pub mod rules;
pub mod stats;
pub mod validation;

pub use optimizer::{optimize, optimize_for, Optimizer};
pub use options::{FanucOptions, HeidenhainOptions, OptimizationOptions, OptionsBuilder};
pub use pipeline::{OptimizationRule, PipelineOutput, RuleHandle, RulePipeline};
pub use presets::Preset;
pub use result::OptimizationResult;
pub use stats::OptimizationStats;
pub use validation::{validate_program, ValidationReport};
