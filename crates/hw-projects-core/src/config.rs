//! Configuration management for HW project management
//!
//! A [`Config`] is built once at startup and passed explicitly to every
//! component. Values come from (highest precedence first) the process
//! environment, the user settings file (`user-settings.json`), and built-in
//! defaults. [`Config::reload`] re-reads both sources after the settings file
//! changes.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::paths;

/// Network volume holding the sharded project folders.
pub const DEFAULT_PROJECTS_ROOT: &str = r"R:\ENGINEERING JOBS_FINAL";

/// Project API used until the user picks another server.
pub const DEFAULT_SERVER_URL: &str = "https://staging-hwcalc.vantage-link.com";

/// Contents of the user settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub server: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            first_name: None,
            last_name: None,
            email: None,
            server: Some(DEFAULT_SERVER_URL.to_string()),
        }
    }
}

impl Settings {
    /// Create the settings file with defaults if it does not exist, then load it.
    pub fn init(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::write_op(parent, "mkdir", e))?;
            }
            tracing::info!(path = %path.display(), "creating default user settings");
            Self::default().save(path)?;
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write the settings pretty-printed with 2-space indentation.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        paths::write_file_atomic(path, content.as_bytes()).map_err(|e| Error::write(path, e))
    }

    /// Copy with every unset field shown as an empty string, for editing forms.
    #[must_use]
    pub fn for_display(&self) -> Self {
        let or_empty = |v: &Option<String>| Some(v.clone().unwrap_or_default());
        Self {
            first_name: or_empty(&self.first_name),
            last_name: or_empty(&self.last_name),
            email: or_empty(&self.email),
            server: or_empty(&self.server),
        }
    }

    /// `"<first> <last>"`, with unset parts omitted.
    #[must_use]
    pub fn user_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

/// Main configuration struct for HW project management
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the sharded project volume.
    pub projects_root: PathBuf,
    /// Base URL of the project API.
    pub server_url: String,
    pub user_email: String,
    pub user_name: String,
    /// Location of `user-settings.json`.
    pub settings_path: PathBuf,
    /// Read email templates from this directory instead of the embedded set.
    pub templates_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projects_root: PathBuf::from(DEFAULT_PROJECTS_ROOT),
            server_url: DEFAULT_SERVER_URL.to_string(),
            user_email: String::new(),
            user_name: String::new(),
            settings_path: paths::settings_path(),
            templates_dir: None,
        }
    }
}

impl Config {
    /// Defaults overlaid with environment variables; the settings file is not read.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_value("HWP_SETTINGS_PATH") {
            config.settings_path = PathBuf::from(v);
        }
        config.apply_env();
        config
    }

    /// Full load: initialize and read the settings file, then apply environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_env();
        config.reload()?;
        Ok(config)
    }

    /// Like [`Config::load`] with an explicit settings file location.
    pub fn load_from(settings_path: &Path) -> Result<Self> {
        let mut config = Self {
            settings_path: settings_path.to_path_buf(),
            ..Self::default()
        };
        config.reload()?;
        Ok(config)
    }

    /// Re-read the settings file and the environment.
    ///
    /// Fields not covered by either source keep their current values.
    pub fn reload(&mut self) -> Result<()> {
        let settings = Settings::init(&self.settings_path)?;
        self.apply_settings(&settings);
        self.apply_env();
        tracing::debug!(config = ?self, "configuration loaded");
        Ok(())
    }

    /// Take the identity and server from `settings`. A missing or blank server
    /// falls back to [`DEFAULT_SERVER_URL`].
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.server_url = settings
            .server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SERVER_URL)
            .to_string();
        self.user_email = settings.email.clone().unwrap_or_default();
        self.user_name = settings.user_name();
    }

    /// Read the current settings file.
    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.settings_path)
    }

    /// Persist new settings and reload so the change takes effect immediately.
    pub fn save_settings(&mut self, settings: &Settings) -> Result<()> {
        settings.save(&self.settings_path)?;
        self.reload()
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_value("HWP_PROJECTS_ROOT") {
            self.projects_root = PathBuf::from(v);
        }
        if let Some(v) = env_value("HWP_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = env_value("HWP_USER_EMAIL") {
            self.user_email = v;
        }
        if let Some(v) = env_value("HWP_TEMPLATES_DIR") {
            self.templates_dir = Some(PathBuf::from(v));
        }
    }

    /// Key/value view of the effective configuration, for display.
    #[must_use]
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("projects_root", self.projects_root.display().to_string()),
            ("server_url", self.server_url.clone()),
            ("user_email", self.user_email.clone()),
            ("user_name", self.user_name.clone()),
            ("settings_path", self.settings_path.display().to_string()),
            (
                "templates_dir",
                self.templates_dir
                    .as_ref()
                    .map_or_else(|| "(embedded)".to_string(), |p| p.display().to_string()),
            ),
        ]
    }
}

// Helper functions for environment variable parsing

#[cfg(test)]
thread_local! {
    static TEST_ENV_OVERRIDES: std::cell::RefCell<HashMap<String, String>> =
        std::cell::RefCell::new(HashMap::new());
}

#[cfg(test)]
fn test_env_override_value(key: &str) -> Option<String> {
    TEST_ENV_OVERRIDES.with(|cell| cell.borrow().get(key).cloned())
}

/// Read a non-empty value from the process environment.
#[must_use]
pub fn env_value(key: &str) -> Option<String> {
    #[cfg(test)]
    if let Some(v) = test_env_override_value(key) {
        return Some(v);
    }
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Environment variables understood by [`Config`], with their current values.
#[must_use]
pub fn env_overrides() -> HashMap<&'static str, String> {
    [
        "HWP_PROJECTS_ROOT",
        "HWP_SERVER_URL",
        "HWP_USER_EMAIL",
        "HWP_TEMPLATES_DIR",
        "HWP_SETTINGS_PATH",
    ]
    .into_iter()
    .filter_map(|key| env_value(key).map(|v| (key, v)))
    .collect()
}
