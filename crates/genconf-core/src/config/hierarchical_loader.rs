//! Hierarchical settings loader with precedence
//!
//! Loads settings from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Global settings (~/.genconf/config.yaml)
//! 3. Environment variables (GENCONF_* prefix)
//! 4. CLI flags (handled by caller)

use super::loader::DEFAULT_PROJECT_FILES;
use crate::error::{Error, Result};
use crate::schema::{ValidationOptions, DEFAULT_MAX_DEPTH};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use tracing::debug;

/// Embedded default settings
const DEFAULT_SETTINGS: &str = include_str!("settings-defaults.yaml");

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "config.yaml";

/// Effective genconf settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Maximum nesting of conditions
    pub max_depth: usize,

    /// File names searched for when no project file is given
    pub project_files: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            project_files: DEFAULT_PROJECT_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions::default().with_max_depth(self.max_depth)
    }

    fn check(self) -> Result<Self> {
        if self.max_depth == 0 {
            return Err(Error::invalid_settings("max-depth must be at least 1"));
        }
        if self.project_files.iter().any(|name| name.trim().is_empty()) {
            return Err(Error::invalid_settings("project-files must not contain empty names"));
        }
        Ok(self)
    }
}

/// Settings file contents; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct SettingsOverlay {
    max_depth: Option<usize>,
    project_files: Option<Vec<String>>,
}

/// Settings hierarchy loader
pub struct HierarchicalSettingsLoader {
    /// Directory holding the settings file
    config_dir: Utf8PathBuf,
}

impl HierarchicalSettingsLoader {
    /// Create a loader for the standard config directory (~/.genconf)
    pub fn new() -> Result<Self> {
        let config_dir =
            crate::utils::config_dir().map_err(|e| Error::invalid_settings(format!("{:#}", e)))?;

        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> Utf8PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Load settings with hierarchical precedence
    pub fn load(&self) -> Result<Settings> {
        let mut settings = Self::embedded_defaults()?;

        let path = self.settings_path();
        if path.exists() {
            debug!(%path, "loading settings file");
            let content = fs::read_to_string(&path)?;
            let overlay: SettingsOverlay = serde_yaml_ng::from_str(&content)
                .map_err(|e| Error::invalid_settings(format!("Failed to parse {}: {}", path, e)))?;
            settings = Self::merge(settings, overlay);
        }

        Self::apply_env_overrides(settings)?.check()
    }

    fn embedded_defaults() -> Result<Settings> {
        serde_yaml_ng::from_str(DEFAULT_SETTINGS).map_err(|e| {
            Error::invalid_settings(format!("Failed to parse embedded settings: {}", e))
        })
    }

    fn merge(mut base: Settings, overlay: SettingsOverlay) -> Settings {
        if let Some(max_depth) = overlay.max_depth {
            base.max_depth = max_depth;
        }
        if let Some(project_files) = overlay.project_files {
            base.project_files = project_files;
        }
        base
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut settings: Settings) -> Result<Settings> {
        if let Ok(val) = env::var("GENCONF_MAX_DEPTH") {
            settings.max_depth = val.trim().parse().map_err(|_| {
                Error::invalid_settings("GENCONF_MAX_DEPTH must be a positive integer")
            })?;
        }

        if let Ok(val) = env::var("GENCONF_PROJECT_FILES") {
            settings.project_files = val
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(settings)
    }
}
