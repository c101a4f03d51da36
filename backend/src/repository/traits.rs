//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;
use crate::domain::{Entity, DomainResult};
use super::ordering::OrderScope;

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity; id, sort order and timestamps are assigned here
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// Update an existing entity (full row write)
    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID
    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Repositories whose rows carry a `sort_order` within an [`OrderScope`]
#[async_trait]
pub trait OrderedRepository<T: Entity>: Repository<T> {
    /// Rows of the scope in presentation order
    async fn list_in_scope(&self, scope: &OrderScope) -> DomainResult<Vec<T>>;

    /// `max(sort_order) + 1`, or 0 for an empty scope
    async fn next_sort_order(&self, scope: &OrderScope) -> DomainResult<i32>;

    /// Write `sort_order = i` for the id at position `i`, moving rows into the scope
    async fn reorder(&self, scope: &OrderScope, ordered_ids: &[T::Id]) -> DomainResult<()>;
}

/// Extension for repositories that support text search
#[async_trait]
pub trait SearchableRepository<T: Entity>: Repository<T> {
    /// Case-insensitive substring search within one organization, in presentation order
    async fn search(&self, organization_id: &str, query: &str) -> DomainResult<Vec<T>>;
}
