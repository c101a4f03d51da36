//! Client sync configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{DomainError, DomainResult};

/// What to do when persisting a reorder fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Clear the override if nothing newer replaced it, and tell the user
    Rollback,
    /// Keep showing the override until a matching snapshot arrives
    #[default]
    LeavePending,
    /// Re-send once, then behave like `LeavePending`
    RetryOnce,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    pub failure_policy: FailurePolicy,
}

impl SyncConfig {
    pub fn with_policy(failure_policy: FailurePolicy) -> Self {
        Self { failure_policy }
    }

    /// Load from a JSON file; a missing file yields the defaults
    pub fn load(path: &Path) -> DomainResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Internal(format!("Failed to read sync config: {}", e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| DomainError::BadRequest(format!("Invalid sync config {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        assert_eq!(SyncConfig::load(&path).unwrap().failure_policy, FailurePolicy::LeavePending);

        std::fs::write(&path, r#"{"failurePolicy":"retry-once"}"#).unwrap();
        assert_eq!(SyncConfig::load(&path).unwrap().failure_policy, FailurePolicy::RetryOnce);

        std::fs::write(&path, r#"{"failurePolicy":"sometimes"}"#).unwrap();
        assert!(matches!(SyncConfig::load(&path), Err(DomainError::BadRequest(_))));
    }
}
