//! Taskspace Client
//!
//! Client-side state for the spaces → lists → tasks workspace:
//! - models: backend entities and their ordering view
//! - reconcile: optimistic reorder overrides per scope
//! - store: sidebar and board stores
//! - context: UI toggle state and notices
//! - commands: typed bindings to the backend router
//! - sync: drag handling, the reorder worker and live re-reads

pub mod commands;
pub mod config;
pub mod context;
pub mod models;
pub mod reconcile;
pub mod store;
pub mod sync;

pub use commands::{Backend, InProcessBackend};
pub use config::{FailurePolicy, SyncConfig};
pub use context::{AiContext, Notice, NoticeLevel, UiAction, UiState};
pub use reconcile::{ReorderBatch, Scope, ScopeState};
pub use store::{BoardStore, SidebarStore};
pub use sync::SyncDriver;
