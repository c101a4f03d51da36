//! Frontend Models
//!
//! Backend entities plus the ordering view the client store needs.

pub use taskspace_lib::domain::{
    DomainError, DomainResult, List, Page, PageRequest, Space, SpaceWithLists, Task, TaskPriority, TaskStatus,
};

use crate::reconcile::{Scope, ScopeKind};

/// An entity that lives at a position inside a scope
pub trait Ordered {
    const KIND: ScopeKind;

    fn item_id(&self) -> u32;
    fn scope(&self) -> Scope;
    /// Presentation order: sort order, then creation time, then id
    fn sort_key(&self) -> (i32, i64, u32);
    /// Set the parent fields so that `scope()` returns `scope`
    fn place_in(&mut self, scope: &Scope);
}

impl Ordered for Space {
    const KIND: ScopeKind = ScopeKind::Spaces;

    fn item_id(&self) -> u32 {
        self.id
    }

    fn scope(&self) -> Scope {
        Scope::Spaces
    }

    fn sort_key(&self) -> (i32, i64, u32) {
        (self.sort_order, self.created_at, self.id)
    }

    fn place_in(&mut self, _scope: &Scope) {}
}

impl Ordered for List {
    const KIND: ScopeKind = ScopeKind::Lists;

    fn item_id(&self) -> u32 {
        self.id
    }

    fn scope(&self) -> Scope {
        Scope::Lists { space_id: self.space_id }
    }

    fn sort_key(&self) -> (i32, i64, u32) {
        (self.sort_order, self.created_at, self.id)
    }

    fn place_in(&mut self, scope: &Scope) {
        if let Scope::Lists { space_id } = scope {
            self.space_id = *space_id;
        }
    }
}

impl Ordered for Task {
    const KIND: ScopeKind = ScopeKind::Tasks;

    fn item_id(&self) -> u32 {
        self.id
    }

    fn scope(&self) -> Scope {
        Scope::Tasks {
            list_id: self.list_id,
            status: self.status,
        }
    }

    fn sort_key(&self) -> (i32, i64, u32) {
        (self.sort_order, self.created_at, self.id)
    }

    fn place_in(&mut self, scope: &Scope) {
        if let Scope::Tasks { list_id, status } = scope {
            self.list_id = *list_id;
            self.status = *status;
        }
    }
}
