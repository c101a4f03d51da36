//! Backend Command Wrappers
//!
//! Typed client bindings over the named command router, organized by domain.

mod in_process;
mod list;
mod space;
mod task;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use taskspace_lib::live::{Interest, LiveSubscription};

use crate::models::{DomainError, DomainResult};
use crate::reconcile::{ReorderBatch, Scope};

pub use in_process::InProcessBackend;
pub use list::*;
pub use space::*;
pub use task::*;

/// Transport to the backend command router
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Run a named command such as `"spaces.reorder"` with camelCase JSON args
    async fn invoke(&self, name: &str, args: Value) -> DomainResult<Value>;

    /// Live change notifications for the caller's organization
    fn watch(&self, interest: Interest) -> DomainResult<LiveSubscription>;
}

fn encode<T: Serialize>(args: &T) -> DomainResult<Value> {
    serde_json::to_value(args).map_err(|e| DomainError::Internal(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> DomainResult<T> {
    serde_json::from_value(value).map_err(|e| DomainError::Internal(format!("Unexpected response: {}", e)))
}

/// Persist one reorder batch with the command matching its scope
pub async fn send_reorder<B: Backend + ?Sized>(backend: &B, batch: &ReorderBatch) -> DomainResult<()> {
    let ordered_ids = batch.ordered_ids.clone();
    match batch.scope {
        Scope::Spaces => reorder_spaces(backend, ordered_ids).await,
        Scope::Lists { space_id } => reorder_lists(backend, space_id, ordered_ids).await,
        Scope::Tasks { list_id, status } => reorder_tasks(backend, list_id, status, ordered_ids).await,
    }
}
