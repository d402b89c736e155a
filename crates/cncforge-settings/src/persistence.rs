//! Settings Persistence
//!
//! Ties a [`Config`] to the file it was read from so callers can load,
//! edit, and write it back without tracking the path themselves.

use crate::config::Config;
use crate::error::SettingsResult;
use std::path::{Path, PathBuf};

/// A config bound to its file
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    path: PathBuf,
    config: Config,
}

impl SettingsPersistence {
    /// Load the file at `path`, or start from defaults when it does not exist
    pub fn open(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        let config = if path.exists() {
            Config::load_from_file(&path)?
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Config::default()
        };
        Ok(Self { path, config })
    }

    /// Open the platform default config file
    pub fn open_default() -> SettingsResult<Self> {
        Self::open(Config::default_path()?)
    }

    /// Write the config back to its file
    pub fn save(&self) -> SettingsResult<()> {
        self.config.save_to_file(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get reference to config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable reference to config
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let persistence = SettingsPersistence::open(dir.path().join("config.toml")).unwrap();
        assert_eq!(persistence.config(), &Config::default());
        assert!(!persistence.path().exists());
    }

    #[test]
    fn test_save_then_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut persistence = SettingsPersistence::open(&path).unwrap();
        persistence.config_mut().toolpath.arc_resolution = 0.5;
        persistence.save().unwrap();

        let reopened = SettingsPersistence::open(&path).unwrap();
        assert_eq!(reopened.config().toolpath.arc_resolution, 0.5);
    }
}
