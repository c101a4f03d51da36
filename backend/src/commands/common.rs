//! Argument shapes shared by several commands

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdArgs {
    pub id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoArgs {}

/// Trimmed, non-empty name or `BadRequest`
pub(crate) fn required_text(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DomainError::BadRequest(format!("{} is required", field)))
    } else {
        Ok(trimmed.to_string())
    }
}
