//! Sync Driver
//!
//! Owns the client stores and UI state. Drags update the stores
//! synchronously; the resulting reorders go to a single worker task that
//! sends them to the backend in issue order. Live change events trigger
//! re-reads, and failed reorders come back on an outcome channel.

use std::sync::Arc;

use taskspace_dragdrop::DragEnd;
use taskspace_lib::commands::{CreateListArgs, CreateSpaceArgs, CreateTaskArgs};
use taskspace_lib::live::{Interest, LiveSubscription};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::commands::{self, send_reorder, Backend};
use crate::config::{FailurePolicy, SyncConfig};
use crate::context::{NoticeLevel, UiAction, UiState};
use crate::models::{DomainError, DomainResult, Space};
use crate::reconcile::{ReorderBatch, Scope, ScopeKind};
use crate::store::{BoardStore, SidebarStore};

pub const DEFAULT_LIST_NAME: &str = "List";
pub const DEFAULT_TASK_TITLE: &str = "My first task";

enum WorkerMessage {
    Apply(ReorderBatch),
    /// Answered once everything queued before it has been sent
    Flush(oneshot::Sender<()>),
}

/// A reorder the backend refused
#[derive(Debug, Clone)]
pub struct ReorderFailure {
    pub batch: ReorderBatch,
    pub error: DomainError,
    pub retried: bool,
}

async fn run_worker<B: Backend>(
    backend: Arc<B>,
    policy: FailurePolicy,
    mut rx: mpsc::UnboundedReceiver<WorkerMessage>,
    failures: mpsc::UnboundedSender<ReorderFailure>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            WorkerMessage::Apply(batch) => {
                let mut result = send_reorder(backend.as_ref(), &batch).await;
                let mut retried = false;
                if let Err(e) = &result {
                    if policy == FailurePolicy::RetryOnce {
                        log::warn!(target: "taskspace.sync", "Reorder of {:?} failed ({}), retrying", batch.scope, e);
                        retried = true;
                        result = send_reorder(backend.as_ref(), &batch).await;
                    }
                }
                if let Err(error) = result {
                    log::error!(target: "taskspace.sync", "Reorder of {:?} failed: {}", batch.scope, error);
                    let _ = failures.send(ReorderFailure { batch, error, retried });
                }
            }
            WorkerMessage::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    log::debug!(target: "taskspace.sync", "Sync worker stopped");
}

pub struct SyncDriver<B: Backend> {
    backend: Arc<B>,
    config: SyncConfig,
    pub sidebar: SidebarStore,
    pub board: Option<BoardStore>,
    pub ui: UiState,
    queue: mpsc::UnboundedSender<WorkerMessage>,
    failures: mpsc::UnboundedReceiver<ReorderFailure>,
    sidebar_feed: Option<LiveSubscription>,
    board_feed: Option<LiveSubscription>,
    worker: JoinHandle<()>,
}

impl<B: Backend> SyncDriver<B> {
    /// Start the reorder worker. Must be called inside a tokio runtime.
    pub fn new(backend: Arc<B>, config: SyncConfig) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let (failure_tx, failures) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(Arc::clone(&backend), config.failure_policy, rx, failure_tx));

        Self {
            backend,
            config,
            sidebar: SidebarStore::new(),
            board: None,
            ui: UiState::new(),
            queue,
            failures,
            sidebar_feed: None,
            board_feed: None,
            worker,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Subscribe to sidebar changes and load the first snapshot
    pub async fn connect(&mut self) -> DomainResult<()> {
        self.sidebar_feed = Some(self.backend.watch(Interest::Sidebar)?);
        self.refresh_sidebar().await
    }

    /// Re-read the sidebar query
    pub async fn refresh_sidebar(&mut self) -> DomainResult<()> {
        let snapshot = commands::list_spaces_with_lists(self.backend.as_ref()).await?;
        self.ui.seed(&snapshot);
        let confirmed = self.sidebar.apply_snapshot(snapshot);
        if !confirmed.is_empty() {
            log::debug!(target: "taskspace.sync", "Snapshot confirmed {:?}", confirmed);
        }
        Ok(())
    }

    /// Show the board of a list and subscribe to its changes
    pub async fn open_board(&mut self, list_id: u32) -> DomainResult<()> {
        self.board_feed = Some(self.backend.watch(Interest::Board { list_id })?);
        self.board = Some(BoardStore::new(list_id));
        self.refresh_board().await
    }

    pub fn close_board(&mut self) {
        self.board = None;
        self.board_feed = None;
    }

    pub async fn refresh_board(&mut self) -> DomainResult<()> {
        let Some(list_id) = self.board.as_ref().map(|b| b.list_id()) else {
            return Ok(());
        };
        let page = commands::list_tasks_by_list(self.backend.as_ref(), list_id, None).await?;
        if let Some(board) = self.board.as_mut() {
            board.apply_snapshot(page.page);
        }
        Ok(())
    }

    /// Apply a finished drag to the stores and queue the reorders.
    ///
    /// Never waits on the backend.
    pub fn drag_end(&mut self, end: DragEnd<Scope>) -> usize {
        let batches = match end.source.scope.kind() {
            ScopeKind::Spaces | ScopeKind::Lists => self.sidebar.drop_item(&end),
            ScopeKind::Tasks => match self.board.as_mut() {
                Some(board) => board.drop_item(&end),
                None => Vec::new(),
            },
        };
        let count = batches.len();
        for batch in batches {
            if self.queue.send(WorkerMessage::Apply(batch)).is_err() {
                log::error!(target: "taskspace.sync", "Sync worker is gone; reorder dropped");
                self.ui.notify(NoticeLevel::Error, "Changes could not be saved");
            }
        }
        count
    }

    /// Wait until every queued reorder has been sent
    pub async fn flush(&mut self) -> DomainResult<()> {
        let (done, wait) = oneshot::channel();
        self.queue
            .send(WorkerMessage::Flush(done))
            .map_err(|_| DomainError::Internal("Sync worker stopped".to_string()))?;
        wait.await
            .map_err(|_| DomainError::Internal("Sync worker stopped".to_string()))
    }

    /// Handle failures reported by the worker; returns how many were seen
    pub fn process_failures(&mut self) -> usize {
        let mut seen = 0;
        while let Ok(failure) = self.failures.try_recv() {
            seen += 1;
            self.handle_failure(failure);
        }
        seen
    }

    fn handle_failure(&mut self, failure: ReorderFailure) {
        let ReorderFailure { batch, error, retried } = failure;
        match self.config.failure_policy {
            FailurePolicy::Rollback => {
                let cleared = match batch.scope.kind() {
                    ScopeKind::Tasks => self
                        .board
                        .as_mut()
                        .map(|b| b.discard(&batch.scope, batch.generation))
                        .unwrap_or(false),
                    _ => self.sidebar.discard(&batch.scope, batch.generation),
                };
                log::warn!(
                    target: "taskspace.sync",
                    "Rolled back {:?} (generation {}, cleared: {})",
                    batch.scope,
                    batch.generation,
                    cleared
                );
                self.ui.notify(NoticeLevel::Error, format!("Failed to save order: {}", error));
            }
            FailurePolicy::LeavePending | FailurePolicy::RetryOnce => {
                log::warn!(
                    target: "taskspace.sync",
                    "Keeping override for {:?} after failed save (retried: {}): {}",
                    batch.scope,
                    retried,
                    error
                );
            }
        }
    }

    /// Re-run whichever queries have queued change events
    pub async fn pump(&mut self) -> DomainResult<()> {
        self.process_failures();
        let sidebar_changed = self.sidebar_feed.as_mut().map(|f| f.has_pending()).unwrap_or(false);
        if sidebar_changed {
            self.refresh_sidebar().await?;
        }
        let board_changed = self.board_feed.as_mut().map(|f| f.has_pending()).unwrap_or(false);
        if board_changed {
            self.refresh_board().await?;
        }
        Ok(())
    }

    /// Wait for the next relevant change, then re-read
    pub async fn next_change(&mut self) -> DomainResult<()> {
        let sidebar = self.sidebar_feed.as_mut();
        let board = self.board_feed.as_mut();
        let board_changed = match (sidebar, board) {
            (Some(sidebar), Some(board)) => {
                tokio::select! {
                    event = sidebar.changed() => { event?; false }
                    event = board.changed() => { event?; true }
                }
            }
            (Some(sidebar), None) => {
                sidebar.changed().await?;
                false
            }
            (None, Some(board)) => {
                board.changed().await?;
                true
            }
            (None, None) => return Err(DomainError::BadRequest("Not connected".to_string())),
        };

        self.process_failures();
        if board_changed {
            self.refresh_board().await
        } else {
            self.refresh_sidebar().await
        }
    }

    /// Create a space with a starter list and task, and open it in the sidebar
    pub async fn create_space_with_defaults(&mut self, args: CreateSpaceArgs) -> DomainResult<Space> {
        let result = self.create_defaults(args).await;
        match &result {
            Ok(space) => {
                self.ui.dispatch(UiAction::OpenSpace(space.id));
                self.refresh_sidebar().await?;
            }
            Err(e) => {
                self.ui.notify(NoticeLevel::Error, format!("Failed to create space: {}", e));
            }
        }
        result
    }

    async fn create_defaults(&self, args: CreateSpaceArgs) -> DomainResult<Space> {
        let backend = self.backend.as_ref();
        let space = commands::create_space(backend, &args).await?;
        let list = commands::create_list(
            backend,
            &CreateListArgs {
                space_id: space.id,
                name: DEFAULT_LIST_NAME.to_string(),
                ..CreateListArgs::default()
            },
        )
        .await?;
        commands::create_task(
            backend,
            &CreateTaskArgs {
                list_id: list.id,
                title: DEFAULT_TASK_TITLE.to_string(),
                ..CreateTaskArgs::default()
            },
        )
        .await?;
        log::info!(target: "taskspace.sync", "Created space {} with defaults", space.id);
        Ok(space)
    }
}

impl<B: Backend> Drop for SyncDriver<B> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::InProcessBackend;
    use crate::models::TaskStatus;
    use crate::reconcile::ScopeState;
    use async_trait::async_trait;
    use serde_json::Value;
    use taskspace_dragdrop::DropLocation;
    use taskspace_lib::auth::Identity;
    use taskspace_lib::AppState;

    async fn backend() -> Arc<InProcessBackend> {
        let state = AppState::in_memory().await.unwrap();
        Arc::new(InProcessBackend::new(Arc::new(state), Some(Identity::new("user-1", "org-1"))))
    }

    async fn space_named(driver: &SyncDriver<impl Backend>, name: &str) -> u32 {
        let args = CreateSpaceArgs {
            name: name.to_string(),
            ..CreateSpaceArgs::default()
        };
        commands::create_space(driver.backend(), &args).await.unwrap().id
    }

    fn drag(id: u32, from: (Scope, usize), to: (Scope, usize)) -> DragEnd<Scope> {
        DragEnd {
            dragged_id: id,
            source: DropLocation::new(from.0, from.1),
            destination: Some(DropLocation::new(to.0, to.1)),
        }
    }

    fn rendered_spaces<B: Backend>(driver: &SyncDriver<B>) -> Vec<u32> {
        driver.sidebar.spaces().iter().map(|s| s.id).collect()
    }

    async fn persisted_spaces<B: Backend>(driver: &SyncDriver<B>) -> Vec<u32> {
        let page = commands::list_spaces(driver.backend(), None).await.unwrap();
        page.page.iter().map(|s| s.id).collect()
    }

    #[tokio::test]
    async fn test_rapid_drags_converge_to_last_intent() {
        let mut driver = SyncDriver::new(backend().await, SyncConfig::default());
        let a = space_named(&driver, "A").await;
        let b = space_named(&driver, "B").await;
        let c = space_named(&driver, "C").await;
        driver.connect().await.unwrap();
        assert_eq!(rendered_spaces(&driver), vec![a, b, c]);

        // B to the front, then C to the front, before either write is read back
        driver.drag_end(drag(b, (Scope::Spaces, 1), (Scope::Spaces, 0)));
        assert_eq!(rendered_spaces(&driver), vec![b, a, c]);
        driver.drag_end(drag(c, (Scope::Spaces, 2), (Scope::Spaces, 0)));
        assert_eq!(rendered_spaces(&driver), vec![c, b, a]);

        driver.flush().await.unwrap();
        driver.pump().await.unwrap();

        assert_eq!(persisted_spaces(&driver).await, vec![c, b, a]);
        assert_eq!(rendered_spaces(&driver), vec![c, b, a]);
        assert_eq!(driver.sidebar.state(&Scope::Spaces), ScopeState::Clean);
    }

    #[tokio::test]
    async fn test_superseded_snapshot_does_not_flicker() {
        let mut driver = SyncDriver::new(backend().await, SyncConfig::default());
        let a = space_named(&driver, "A").await;
        let b = space_named(&driver, "B").await;
        driver.connect().await.unwrap();

        driver.drag_end(drag(b, (Scope::Spaces, 1), (Scope::Spaces, 0)));
        driver.flush().await.unwrap();
        let first_write = commands::list_spaces_with_lists(driver.backend()).await.unwrap();

        driver.drag_end(drag(a, (Scope::Spaces, 1), (Scope::Spaces, 0)));
        assert_eq!(rendered_spaces(&driver), vec![a, b]);

        // a snapshot carrying only the superseded write
        driver.sidebar.apply_snapshot(first_write);
        assert_eq!(rendered_spaces(&driver), vec![a, b]);
        assert!(driver.sidebar.has_pending());

        driver.flush().await.unwrap();
        driver.refresh_sidebar().await.unwrap();
        assert_eq!(rendered_spaces(&driver), vec![a, b]);
        assert!(!driver.sidebar.has_pending());
    }

    #[tokio::test]
    async fn test_board_move_between_columns() {
        let mut driver = SyncDriver::new(backend().await, SyncConfig::default());
        let space = driver
            .create_space_with_defaults(CreateSpaceArgs {
                name: "Work".to_string(),
                ..CreateSpaceArgs::default()
            })
            .await
            .unwrap();
        let list_id = driver.sidebar.lists_in(space.id)[0].id;
        driver.open_board(list_id).await.unwrap();

        let todo = Scope::Tasks { list_id, status: TaskStatus::Todo };
        let doing = Scope::Tasks { list_id, status: TaskStatus::InProgress };
        let first = driver.board.as_ref().unwrap().column(TaskStatus::Todo)[0].id;

        assert_eq!(driver.drag_end(drag(first, (todo, 0), (doing, 0))), 2);
        let board = driver.board.as_ref().unwrap();
        assert!(board.column(TaskStatus::Todo).is_empty());
        assert_eq!(board.column(TaskStatus::InProgress).len(), 1);

        driver.flush().await.unwrap();
        driver.pump().await.unwrap();

        let board = driver.board.as_ref().unwrap();
        assert!(!board.has_pending());
        let moved = board.column(TaskStatus::InProgress);
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].status, TaskStatus::InProgress);
        assert_eq!(moved[0].sort_order, 0);
        assert!(board.column(TaskStatus::Todo).is_empty());
    }

    #[tokio::test]
    async fn test_create_space_with_defaults_opens_it() {
        let mut driver = SyncDriver::new(backend().await, SyncConfig::default());
        driver.connect().await.unwrap();
        let space = driver
            .create_space_with_defaults(CreateSpaceArgs {
                name: "Home".to_string(),
                ..CreateSpaceArgs::default()
            })
            .await
            .unwrap();

        assert!(driver.ui.is_space_open(space.id));
        let lists = driver.sidebar.lists_in(space.id);
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, DEFAULT_LIST_NAME);

        let tasks = commands::list_tasks_by_list(driver.backend(), lists[0].id, None).await.unwrap();
        assert_eq!(tasks.page.len(), 1);
        assert_eq!(tasks.page[0].title, DEFAULT_TASK_TITLE);
    }

    #[tokio::test]
    async fn test_next_change_follows_other_clients() {
        let backend = backend().await;
        let mut driver = SyncDriver::new(Arc::clone(&backend), SyncConfig::default());
        driver.connect().await.unwrap();
        assert!(driver.sidebar.spaces().is_empty());

        // another tab of the same organization
        let other = backend.as_identity(Some(Identity::new("user-2", "org-1")));
        let args = CreateSpaceArgs {
            name: "Shared".to_string(),
            ..CreateSpaceArgs::default()
        };
        commands::create_space(&other, &args).await.unwrap();

        driver.next_change().await.unwrap();
        assert_eq!(driver.sidebar.spaces().len(), 1);
    }

    /// Refuses every reorder, forwards everything else
    struct RejectingBackend {
        inner: InProcessBackend,
        attempts: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Backend for RejectingBackend {
        async fn invoke(&self, name: &str, args: Value) -> DomainResult<Value> {
            if name.ends_with(".reorder") {
                self.attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                return Err(DomainError::Internal("disk full".to_string()));
            }
            self.inner.invoke(name, args).await
        }

        fn watch(&self, interest: Interest) -> DomainResult<LiveSubscription> {
            self.inner.watch(interest)
        }
    }

    async fn rejecting() -> Arc<RejectingBackend> {
        let inner = backend().await.as_ref().clone();
        Arc::new(RejectingBackend {
            inner,
            attempts: std::sync::atomic::AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_rollback_policy_restores_server_order() {
        let mut driver = SyncDriver::new(rejecting().await, SyncConfig::with_policy(FailurePolicy::Rollback));
        let a = space_named(&driver, "A").await;
        let b = space_named(&driver, "B").await;
        driver.connect().await.unwrap();

        driver.drag_end(drag(b, (Scope::Spaces, 1), (Scope::Spaces, 0)));
        assert_eq!(rendered_spaces(&driver), vec![b, a]);

        driver.flush().await.unwrap();
        assert_eq!(driver.process_failures(), 1);
        assert_eq!(rendered_spaces(&driver), vec![a, b]);
        assert_eq!(driver.ui.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_leave_pending_and_retry_once() {
        let backend = rejecting().await;
        let mut driver = SyncDriver::new(Arc::clone(&backend), SyncConfig::with_policy(FailurePolicy::RetryOnce));
        let a = space_named(&driver, "A").await;
        let b = space_named(&driver, "B").await;
        driver.connect().await.unwrap();

        driver.drag_end(drag(b, (Scope::Spaces, 1), (Scope::Spaces, 0)));
        driver.flush().await.unwrap();

        assert_eq!(backend.attempts.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(driver.process_failures(), 1);
        assert_eq!(rendered_spaces(&driver), vec![b, a]);
        assert!(driver.sidebar.has_pending());
        assert!(driver.ui.notices().is_empty());
    }
}
