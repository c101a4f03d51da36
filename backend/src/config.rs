//! Application configuration
//!
//! Read from a JSON file; missing fields fall back to defaults and
//! `TASKSPACE_DB_PATH` / `TASKSPACE_LOG_DIR` override the paths.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

pub const ENV_DB_PATH: &str = "TASKSPACE_DB_PATH";
pub const ENV_LOG_DIR: &str = "TASKSPACE_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub app_name: String,
    pub live_channel_capacity: usize,
    pub tool_default_limit: usize,
    pub tool_max_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("taskspace.db"),
            log_dir: PathBuf::from("logs"),
            app_name: "Taskspace".to_string(),
            live_channel_capacity: 256,
            tool_default_limit: 50,
            tool_max_limit: 100,
        }
    }
}

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> DomainResult<Self> {
        let config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| DomainError::Internal(format!("Failed to read config: {}", e)))?;
            serde_json::from_str(&raw)
                .map_err(|e| DomainError::BadRequest(format!("Invalid config {}: {}", path.display(), e)))?
        } else {
            log::info!(target: "taskspace.config", "No config at {}, using defaults", path.display());
            AppConfig::default()
        };
        Ok(config.with_env_overrides())
    }

    pub fn save(&self, path: &Path) -> DomainResult<()> {
        let raw = serde_json::to_string_pretty(self).map_err(|e| DomainError::Internal(e.to_string()))?;
        std::fs::write(path, raw).map_err(|e| DomainError::Internal(format!("Failed to write config: {}", e)))
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(db_path) = std::env::var(ENV_DB_PATH) {
            if !db_path.is_empty() {
                self.db_path = PathBuf::from(db_path);
            }
        }
        if let Ok(log_dir) = std::env::var(ENV_LOG_DIR) {
            if !log_dir.is_empty() {
                self.log_dir = PathBuf::from(log_dir);
            }
        }
        self
    }

    /// Clamp a caller-supplied tool limit to `1..=tool_max_limit`
    pub fn clamp_limit(&self, requested: Option<i64>) -> usize {
        let max = self.tool_max_limit.max(1);
        match requested {
            Some(n) if n < 1 => 1,
            Some(n) => (n as usize).min(max),
            None => self.tool_default_limit.clamp(1, max),
        }
    }
}
