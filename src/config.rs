//! Configuration loading and management
//!
//! Handles parsing of `taskboard.toml`. Every field has a default, so an
//! empty or missing file yields [`Config::default`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::model::{DEFAULT_PRIORITY, DEFAULT_STATUS};

/// File name looked up inside the data directory
pub const CONFIG_FILE: &str = "taskboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and under which keys collections are stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Task defaults and paging
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Dashboard aggregation
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory; the platform data dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Key holding the session record
    #[serde(default = "default_session_key")]
    pub session_key: String,

    /// Key holding the project collection
    #[serde(default = "default_projects_key")]
    pub projects_key: String,

    /// Key holding the task mapping
    #[serde(default = "default_tasks_key")]
    pub tasks_key: String,

    /// How long to wait for another process's lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_session_key() -> String {
    "tm_user".to_string()
}

fn default_projects_key() -> String {
    "tm_projects".to_string()
}

fn default_tasks_key() -> String {
    "tm_tasks".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            session_key: default_session_key(),
            projects_key: default_projects_key(),
            tasks_key: default_tasks_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Window size used when no limit is given
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Priority for tasks created without one
    #[serde(default = "default_priority")]
    pub default_priority: String,

    /// Status for tasks created without one
    #[serde(default = "default_status")]
    pub default_status: String,
}

fn default_page_size() -> usize {
    crate::task::DEFAULT_PAGE_SIZE
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_priority: default_priority(),
            default_status: default_status(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Most recently created tasks taken from each project
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
}

fn default_recent_window() -> usize {
    crate::dashboard::DEFAULT_RECENT_WINDOW
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_window: default_recent_window(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path` if it exists, falling back to defaults
    /// when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Load `taskboard.toml` from a data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let mut config = Self::load_or_default(&data_dir.join(CONFIG_FILE));
        if config.storage.data_dir.is_none() {
            config.storage.data_dir = Some(data_dir.to_path_buf());
        }
        config
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Data directory to use: configured, else the platform default
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.tasks.validate()?;
        self.dashboard.validate()?;
        Ok(())
    }
}

/// Platform data directory, e.g. `~/.local/share/taskboard` on Linux
pub fn default_data_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("", "", "taskboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::InvalidConfig(
                "cannot determine a home directory; pass --data-dir".to_string(),
            )
        })
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        let keys = [
            ("storage.session_key", &self.session_key),
            ("storage.projects_key", &self.projects_key),
            ("storage.tasks_key", &self.tasks_key),
        ];
        for (field, key) in keys {
            if key.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
            }
        }
        if self.session_key == self.projects_key
            || self.session_key == self.tasks_key
            || self.projects_key == self.tasks_key
        {
            return Err(Error::InvalidConfig(
                "storage keys must be distinct".to_string(),
            ));
        }
        Ok(())
    }
}

impl TasksConfig {
    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidConfig(
                "tasks.page_size must be >= 1".to_string(),
            ));
        }
        if self.default_priority.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.default_priority cannot be empty".to_string(),
            ));
        }
        if self.default_status.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.default_status cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl DashboardConfig {
    fn validate(&self) -> Result<()> {
        if self.recent_window == 0 {
            return Err(Error::InvalidConfig(
                "dashboard.recent_window must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.session_key, "tm_user");
        assert_eq!(config.storage.projects_key, "tm_projects");
        assert_eq!(config.storage.tasks_key, "tm_tasks");
        assert_eq!(config.tasks.page_size, 10);
        assert_eq!(config.tasks.default_priority, "Medium");
        assert_eq!(config.tasks.default_status, "Not Started");
        assert_eq!(config.dashboard.recent_window, 5);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[tasks]
page_size = 25

[dashboard]
recent_window = 3
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.tasks.page_size, 25);
        assert_eq!(config.tasks.default_priority, "Medium");
        assert_eq!(config.dashboard.recent_window, 3);
        assert_eq!(config.storage.tasks_key, "tm_tasks");
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let toml_str = r#"
[storage]
projects_key = "shared"
tasks_key = "shared"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let config: Config = toml::from_str("[tasks]\npage_size = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.dashboard.recent_window = 7;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.dashboard.recent_window, 7);
    }

    #[test]
    fn test_load_from_dir_pins_data_dir() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from_dir(temp.path());
        assert_eq!(config.data_dir().unwrap(), temp.path());
    }
}
