//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde for serialization).

mod entity;
mod list;
mod onboarding;
mod page;
mod space;
mod task;

pub use entity::{DomainError, DomainResult, Entity, TenantOwned};
pub use list::List;
pub use onboarding::Onboarding;
pub use page::{Page, PageRequest};
pub use space::{Space, SpaceWithLists, DEFAULT_SPACE_COLOR, DEFAULT_SPACE_ICON, SPACE_COLORS};
pub use task::{Task, TaskPriority, TaskStatus};
