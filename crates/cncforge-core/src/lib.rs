//! # CNCForge Core
//!
//! Shared vocabulary for the CNCForge crates: controller identifiers and
//! their feed limits, positioning and plane modes, the machine envelope,
//! and the error types used at every contract boundary.

pub mod constants;
pub mod controller;
pub mod error;
pub mod geometry;

pub use controller::{Controller, FeedLimits};
pub use error::{Error, OptionsError, ProgramError, Result};
pub use geometry::{Envelope, Plane, PositioningMode};
