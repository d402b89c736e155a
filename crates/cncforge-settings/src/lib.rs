//! CNCForge Settings Crate
//!
//! Loads and saves the engine configuration file and turns it into the
//! toolpath and optimizer settings the other crates consume.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{Config, MachineSettings, OptimizerSettings, OptionOverrides};
pub use error::{SettingsError, SettingsResult};
pub use persistence::SettingsPersistence;
