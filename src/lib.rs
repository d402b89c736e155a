//! # CNCForge
//!
//! G-code toolpath extraction and controller-aware program optimization.
//!
//! ## Architecture
//!
//! CNCForge is organized as a workspace with multiple crates:
//!
//! 1. **cncforge-core** - Controller identifiers, modal vocabulary, errors
//! 2. **cncforge-toolpath** - Tokenizer, modal resolution, arc/cycle/shape expansion
//! 3. **cncforge-optimizer** - Rule pipeline, Fanuc and Heidenhain branches, validation
//! 4. **cncforge-settings** - Engine configuration files
//! 5. **cncforge** - The `cncforge` binary that integrates all crates

pub mod output;

pub use cncforge_core::{
    Controller, Envelope, Error, FeedLimits, OptionsError, Plane, PositioningMode, ProgramError,
    Result,
};

pub use cncforge_toolpath::{
    MotionKind, ParseWarning, Toolpath, ToolpathConfig, ToolpathPoint, ToolpathStream,
};

pub use cncforge_optimizer::{
    optimize, optimize_for, OptimizationOptions, OptimizationResult, OptimizationStats, Optimizer,
    OptionsBuilder, Preset, ValidationReport,
};

pub use cncforge_settings::{Config, SettingsError, SettingsPersistence};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Logs go to stderr so command output on stdout stays clean. The level
/// comes from `RUST_LOG`, INFO when unset.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
