//! Client Stores
//!
//! Sidebar (spaces with their lists) and board (one list's columns) views
//! over the latest live snapshot, with optimistic reorder overrides.

use taskspace_dragdrop::DragEnd;

use crate::models::{List, Space, SpaceWithLists, Task, TaskStatus};
use crate::reconcile::{ReorderBatch, Scope, ScopeKind, ScopeState, ScopedView};

/// Spaces and lists as shown in the sidebar
#[derive(Debug, Clone, Default)]
pub struct SidebarStore {
    spaces: ScopedView<Space>,
    lists: ScopedView<List>,
    /// Number of snapshots applied
    pub version: u32,
}

impl SidebarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.version > 0
    }

    /// Take a `spaces.listWithLists` snapshot; returns the scopes it confirmed
    pub fn apply_snapshot(&mut self, snapshot: Vec<SpaceWithLists>) -> Vec<Scope> {
        let mut spaces = Vec::with_capacity(snapshot.len());
        let mut lists = Vec::new();
        for entry in snapshot {
            lists.extend(entry.lists);
            spaces.push(entry.space);
        }

        let mut confirmed = self.spaces.replace_snapshot(spaces);
        confirmed.extend(self.lists.replace_snapshot(lists));
        self.version += 1;
        confirmed
    }

    pub fn spaces(&self) -> Vec<Space> {
        self.spaces.render(&Scope::Spaces)
    }

    pub fn space(&self, id: u32) -> Option<&Space> {
        self.spaces.get(id)
    }

    pub fn list(&self, id: u32) -> Option<&List> {
        self.lists.get(id)
    }

    pub fn lists_in(&self, space_id: u32) -> Vec<List> {
        self.lists.render(&Scope::Lists { space_id })
    }

    /// Rendered sidebar tree
    pub fn view(&self) -> Vec<SpaceWithLists> {
        self.spaces()
            .into_iter()
            .map(|space| {
                let lists = self.lists_in(space.id);
                SpaceWithLists { space, lists }
            })
            .collect()
    }

    pub fn state(&self, scope: &Scope) -> ScopeState {
        match scope.kind() {
            ScopeKind::Spaces => self.spaces.state(scope),
            ScopeKind::Lists => self.lists.state(scope),
            ScopeKind::Tasks => ScopeState::Clean,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.spaces.has_pending() || self.lists.has_pending()
    }

    /// Apply a finished sidebar drag; the returned batches still need persisting
    pub fn drop_item(&mut self, end: &DragEnd<Scope>) -> Vec<ReorderBatch> {
        match end.source.scope.kind() {
            ScopeKind::Spaces => self.spaces.drop_item(end),
            ScopeKind::Lists => self.lists.drop_item(end),
            ScopeKind::Tasks => Vec::new(),
        }
    }

    pub fn discard(&mut self, scope: &Scope, generation: u64) -> bool {
        match scope.kind() {
            ScopeKind::Spaces => self.spaces.discard(scope, generation),
            ScopeKind::Lists => self.lists.discard(scope, generation),
            ScopeKind::Tasks => false,
        }
    }
}

/// Status columns of one list
#[derive(Debug, Clone)]
pub struct BoardStore {
    list_id: u32,
    tasks: ScopedView<Task>,
    pub version: u32,
}

impl BoardStore {
    pub fn new(list_id: u32) -> Self {
        Self {
            list_id,
            tasks: ScopedView::new(),
            version: 0,
        }
    }

    pub fn list_id(&self) -> u32 {
        self.list_id
    }

    pub fn column_scope(&self, status: TaskStatus) -> Scope {
        Scope::Tasks {
            list_id: self.list_id,
            status,
        }
    }

    /// Take a `tasks.listByList` snapshot; tasks of other lists are dropped
    pub fn apply_snapshot(&mut self, tasks: Vec<Task>) -> Vec<Scope> {
        let list_id = self.list_id;
        let tasks = tasks.into_iter().filter(|t| t.list_id == list_id).collect();
        self.version += 1;
        self.tasks.replace_snapshot(tasks)
    }

    pub fn task(&self, id: u32) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn column(&self, status: TaskStatus) -> Vec<Task> {
        self.tasks.render(&self.column_scope(status))
    }

    /// Every column in status order
    pub fn columns(&self) -> Vec<(TaskStatus, Vec<Task>)> {
        TaskStatus::ALL
            .iter()
            .map(|status| (*status, self.column(*status)))
            .collect()
    }

    pub fn state(&self, status: TaskStatus) -> ScopeState {
        self.tasks.state(&self.column_scope(status))
    }

    pub fn has_pending(&self) -> bool {
        self.tasks.has_pending()
    }

    /// Apply a finished board drag; drops into another list are ignored
    pub fn drop_item(&mut self, end: &DragEnd<Scope>) -> Vec<ReorderBatch> {
        let on_board = |scope: &Scope| matches!(scope, Scope::Tasks { list_id, .. } if *list_id == self.list_id);
        let destination_ok = end.destination.as_ref().map(|d| on_board(&d.scope)).unwrap_or(true);
        if !on_board(&end.source.scope) || !destination_ok {
            log::warn!(target: "taskspace.store", "Drop outside board {} ignored", self.list_id);
            return Vec::new();
        }
        self.tasks.drop_item(end)
    }

    pub fn discard(&mut self, scope: &Scope, generation: u64) -> bool {
        self.tasks.discard(scope, generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskspace_dragdrop::DropLocation;

    fn task(id: u32, status: TaskStatus, sort_order: i32) -> Task {
        let mut task = Task::new("org", 9, format!("T{}", id));
        task.id = id;
        task.status = status;
        task.sort_order = sort_order;
        task
    }

    fn space(id: u32, sort_order: i32, lists: Vec<List>) -> SpaceWithLists {
        let mut space = Space::new("org", format!("S{}", id));
        space.id = id;
        space.sort_order = sort_order;
        SpaceWithLists { space, lists }
    }

    fn ids<T: crate::models::Ordered>(items: &[T]) -> Vec<u32> {
        items.iter().map(|i| i.item_id()).collect()
    }

    #[test]
    fn test_board_cross_status_move_is_single_update() {
        let mut board = BoardStore::new(9);
        board.apply_snapshot(vec![
            task(1, TaskStatus::Todo, 0),
            task(2, TaskStatus::Todo, 1),
            task(3, TaskStatus::Todo, 2),
            task(4, TaskStatus::InProgress, 0),
        ]);

        let todo = board.column_scope(TaskStatus::Todo);
        let doing = board.column_scope(TaskStatus::InProgress);
        let batches = board.drop_item(&DragEnd {
            dragged_id: 3,
            source: DropLocation::new(todo, 2),
            destination: Some(DropLocation::new(doing, 0)),
        });

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].ordered_ids, vec![3, 4]);
        assert_eq!(batches[1].ordered_ids, vec![1, 2]);
        assert_eq!(ids(&board.column(TaskStatus::Todo)), vec![1, 2]);
        assert_eq!(ids(&board.column(TaskStatus::InProgress)), vec![3, 4]);

        // the rendered card already carries its new status
        let moved = board.column(TaskStatus::InProgress);
        assert_eq!(moved[0].status, TaskStatus::InProgress);
        assert_eq!(board.task(3).map(|t| t.status), Some(TaskStatus::Todo));
    }

    #[test]
    fn test_board_ignores_other_lists() {
        let mut board = BoardStore::new(9);
        let mut foreign = task(7, TaskStatus::Todo, 0);
        foreign.list_id = 10;
        board.apply_snapshot(vec![task(1, TaskStatus::Todo, 0), foreign]);
        assert_eq!(ids(&board.column(TaskStatus::Todo)), vec![1]);

        let batches = board.drop_item(&DragEnd {
            dragged_id: 1,
            source: DropLocation::new(board.column_scope(TaskStatus::Todo), 0),
            destination: Some(DropLocation::new(
                Scope::Tasks {
                    list_id: 10,
                    status: TaskStatus::Todo,
                },
                0,
            )),
        });
        assert!(batches.is_empty());
    }

    #[test]
    fn test_sidebar_view_follows_overrides() {
        let mut sidebar = SidebarStore::new();
        let mut l1 = List::new("org", 1, "L1".to_string());
        l1.id = 11;
        sidebar.apply_snapshot(vec![space(1, 0, vec![l1]), space(2, 1, vec![])]);
        assert!(sidebar.is_loaded());

        let batches = sidebar.drop_item(&DragEnd {
            dragged_id: 2,
            source: DropLocation::new(Scope::Spaces, 1),
            destination: Some(DropLocation::new(Scope::Spaces, 0)),
        });
        assert_eq!(batches.len(), 1);

        let view = sidebar.view();
        assert_eq!(view[0].space.id, 2);
        assert_eq!(view[1].space.id, 1);
        assert_eq!(ids(&view[1].lists), vec![11]);
        assert!(sidebar.has_pending());
    }
}
