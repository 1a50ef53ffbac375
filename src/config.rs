use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::constants::defaults;
use crate::error::Result;
use crate::scenario::ScenarioProfile;

fn default_bind_addr() -> String {
    defaults::BIND_ADDR.to_string()
}

fn default_log_path() -> PathBuf {
    PathBuf::from(defaults::LOG_PATH)
}

fn default_instructor_secret() -> Option<String> {
    Some(defaults::INSTRUCTOR_SECRET.to_string())
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.to_string()
}

fn default_session_idle_secs() -> u64 {
    defaults::SESSION_IDLE_SECS
}

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Flat CSV log of completed sessions
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    #[serde(default)]
    pub profile: ScenarioProfile,

    /// Only consulted when the profile allows export
    #[serde(default = "default_instructor_secret")]
    pub instructor_secret: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Fixed seed for the terminal draw (reproducible runs)
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            log_path: default_log_path(),
            profile: ScenarioProfile::default(),
            instructor_secret: default_instructor_secret(),
            log_level: default_log_level(),
            seed: None,
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

// The secret stays out of Debug output since main logs the loaded config.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_path", &self.log_path)
            .field("profile", &self.profile)
            .field("instructor_secret", &self.instructor_secret.as_ref().map(|_| "***"))
            .field("log_level", &self.log_level)
            .field("seed", &self.seed)
            .field("session_idle_secs", &self.session_idle_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load from `$SURVEY_CONFIG` (or `config.yaml`). A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var(defaults::CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        // An empty document deserializes as unit, not as a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: AppConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Secret the export gate compares against, if export is enabled at all.
    pub fn export_secret(&self) -> Option<String> {
        if self.profile.allows_export() {
            self.instructor_secret.clone()
        } else {
            None
        }
    }
}
