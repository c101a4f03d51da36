//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities have a unique ID and belong to exactly one organization.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Entities that are scoped to a tenant (organization)
pub trait TenantOwned {
    /// Human readable kind used in error messages ("space", "list", "task")
    const KIND: &'static str;

    fn organization_id(&self) -> &str;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Serialized as `{ "code": "NOT_FOUND", "message": "..." }` so callers can
/// branch on the code without parsing the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainError {
    NotFound(String),
    Unauthorized(String),
    BadRequest(String),
    Internal(String),
}

impl DomainError {
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::Unauthorized(_) => "UNAUTHORIZED",
            DomainError::BadRequest(_) => "BAD_REQUEST",
            DomainError::Internal(_) => "INTERNAL",
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            DomainError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
