//! Optimistic Reorder Reconciliation
//!
//! Each ordered container (scope) is either Clean, rendering the live
//! snapshot, or Pending, rendering an override id list until a snapshot
//! arrives whose natural order equals it exactly.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use taskspace_dragdrop::{plan_drop, DragEnd, DropPlan};

use crate::models::{Ordered, TaskStatus};

/// An ordered container on the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Scope {
    /// All spaces of the organization
    Spaces,
    /// Lists of one space
    #[serde(rename_all = "camelCase")]
    Lists { space_id: u32 },
    /// One board column
    #[serde(rename_all = "camelCase")]
    Tasks { list_id: u32, status: TaskStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Spaces,
    Lists,
    Tasks,
}

impl Scope {
    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::Spaces => ScopeKind::Spaces,
            Scope::Lists { .. } => ScopeKind::Lists,
            Scope::Tasks { .. } => ScopeKind::Tasks,
        }
    }
}

/// A reorder to persist, tagged with the override generation it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderBatch {
    pub scope: Scope,
    pub ordered_ids: Vec<u32>,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeState {
    Clean,
    Pending { ordered_ids: Vec<u32>, generation: u64 },
}

#[derive(Debug, Clone)]
struct Override {
    ordered_ids: Vec<u32>,
    generation: u64,
}

/// Override bookkeeping for every scope of one entity kind
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    overrides: HashMap<Scope, Override>,
    generation: u64,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `ordered_ids` for `scope`, replacing any previous override
    pub fn stage(&mut self, scope: Scope, ordered_ids: Vec<u32>) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        self.overrides.insert(scope, Override { ordered_ids, generation });
        generation
    }

    /// Stage source and destination of a move together
    pub fn stage_move(
        &mut self,
        source: (Scope, Vec<u32>),
        destination: (Scope, Vec<u32>),
    ) -> (u64, u64) {
        let source_generation = self.stage(source.0, source.1);
        let destination_generation = self.stage(destination.0, destination.1);
        (source_generation, destination_generation)
    }

    pub fn state(&self, scope: &Scope) -> ScopeState {
        match self.overrides.get(scope) {
            Some(o) => ScopeState::Pending {
                ordered_ids: o.ordered_ids.clone(),
                generation: o.generation,
            },
            None => ScopeState::Clean,
        }
    }

    pub fn is_pending(&self, scope: &Scope) -> bool {
        self.overrides.contains_key(scope)
    }

    pub fn pending_scopes(&self) -> Vec<Scope> {
        self.overrides.keys().copied().collect()
    }

    /// Forget override ids that no longer exist anywhere in the snapshot
    pub fn prune<F>(&mut self, exists: F)
    where
        F: Fn(u32) -> bool,
    {
        for o in self.overrides.values_mut() {
            o.ordered_ids.retain(|id| exists(*id));
        }
    }

    /// Clear the override when the snapshot order matches it elementwise
    pub fn confirm(&mut self, scope: &Scope, natural: &[u32]) -> bool {
        let matches = self
            .overrides
            .get(scope)
            .map(|o| o.ordered_ids.as_slice() == natural)
            .unwrap_or(false);
        if matches {
            self.overrides.remove(scope);
        }
        matches
    }

    /// Drop the override only if it is still the given generation
    pub fn discard(&mut self, scope: &Scope, generation: u64) -> bool {
        let current = self.overrides.get(scope).map(|o| o.generation) == Some(generation);
        if current {
            self.overrides.remove(scope);
        }
        current
    }

    /// The scope holding `id` in a pending override, other than `except`
    fn claimed_elsewhere(&self, id: u32, except: &Scope) -> bool {
        self.overrides
            .iter()
            .any(|(scope, o)| scope != except && o.ordered_ids.contains(&id))
    }

    /// Ids to show for `scope`.
    ///
    /// `natural` is the snapshot order of the scope; `exists` reports whether
    /// an id is present anywhere in the snapshot.
    pub fn render_ids<F>(&self, scope: &Scope, natural: &[u32], exists: F) -> Vec<u32>
    where
        F: Fn(u32) -> bool,
    {
        match self.overrides.get(scope) {
            Some(o) => {
                let mut ids: Vec<u32> = o.ordered_ids.iter().copied().filter(|id| exists(*id)).collect();
                let named: HashSet<u32> = o.ordered_ids.iter().copied().collect();
                ids.extend(
                    natural
                        .iter()
                        .copied()
                        .filter(|id| !named.contains(id) && !self.claimed_elsewhere(*id, scope)),
                );
                ids
            }
            None => natural
                .iter()
                .copied()
                .filter(|id| !self.claimed_elsewhere(*id, scope))
                .collect(),
        }
    }
}

/// Snapshot of one entity kind plus its reconciliation state
#[derive(Debug, Clone)]
pub struct ScopedView<T> {
    items: Vec<T>,
    reconciler: Reconciler,
}

impl<T> Default for ScopedView<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            reconciler: Reconciler::new(),
        }
    }
}

impl<T: Ordered + Clone> ScopedView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.items.iter().find(|item| item.item_id() == id)
    }

    /// Server order of a scope: sort order, then creation time, then id
    pub fn natural_ids(&self, scope: &Scope) -> Vec<u32> {
        let mut members: Vec<&T> = self.items.iter().filter(|item| item.scope() == *scope).collect();
        members.sort_by_key(|item| item.sort_key());
        members.into_iter().map(|item| item.item_id()).collect()
    }

    pub fn render_ids(&self, scope: &Scope) -> Vec<u32> {
        let natural = self.natural_ids(scope);
        self.reconciler
            .render_ids(scope, &natural, |id| self.items.iter().any(|item| item.item_id() == id))
    }

    /// Entities of a scope as they should be shown.
    ///
    /// An entity shown in a scope it has not reached on the server yet is
    /// placed in that scope, e.g. a moved task carries the column's status.
    pub fn render(&self, scope: &Scope) -> Vec<T> {
        self.render_ids(scope)
            .into_iter()
            .filter_map(|id| self.get(id).cloned())
            .map(|mut item| {
                if item.scope() != *scope {
                    item.place_in(scope);
                }
                item
            })
            .collect()
    }

    pub fn state(&self, scope: &Scope) -> ScopeState {
        self.reconciler.state(scope)
    }

    pub fn is_pending(&self, scope: &Scope) -> bool {
        self.reconciler.is_pending(scope)
    }

    pub fn has_pending(&self) -> bool {
        !self.reconciler.pending_scopes().is_empty()
    }

    /// Take a new snapshot and clear every override it confirms
    pub fn replace_snapshot(&mut self, items: Vec<T>) -> Vec<Scope> {
        self.items = items;
        let items = &self.items;
        self.reconciler
            .prune(|id| items.iter().any(|item| item.item_id() == id));

        let mut confirmed = Vec::new();
        for scope in self.reconciler.pending_scopes() {
            let natural = self.natural_ids(&scope);
            if self.reconciler.confirm(&scope, &natural) {
                confirmed.push(scope);
            }
        }
        confirmed
    }

    /// Stage the overrides for a finished drag and return what to persist.
    ///
    /// A cross-scope move yields the destination batch first.
    pub fn drop_item(&mut self, end: &DragEnd<Scope>) -> Vec<ReorderBatch> {
        let same_kind = end.source.scope.kind() == T::KIND
            && end.destination.as_ref().map(|d| d.scope.kind() == T::KIND).unwrap_or(true);
        if !same_kind {
            log::warn!(target: "taskspace.reconcile", "Ignoring drop across entity kinds: {:?}", end);
            return Vec::new();
        }

        match plan_drop(end, |scope| self.render_ids(scope)) {
            DropPlan::Noop => Vec::new(),
            DropPlan::Reorder { scope, ordered_ids } => {
                let generation = self.reconciler.stage(scope, ordered_ids.clone());
                vec![ReorderBatch { scope, ordered_ids, generation }]
            }
            DropPlan::Move {
                source,
                source_ids,
                destination,
                destination_ids,
                ..
            } => {
                let (source_generation, destination_generation) = self
                    .reconciler
                    .stage_move((source, source_ids.clone()), (destination, destination_ids.clone()));
                vec![
                    ReorderBatch {
                        scope: destination,
                        ordered_ids: destination_ids,
                        generation: destination_generation,
                    },
                    ReorderBatch {
                        scope: source,
                        ordered_ids: source_ids,
                        generation: source_generation,
                    },
                ]
            }
        }
    }

    pub fn discard(&mut self, scope: &Scope, generation: u64) -> bool {
        self.reconciler.discard(scope, generation)
    }
}
