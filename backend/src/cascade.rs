//! Cascade delete
//!
//! Deleting a space removes its lists and their tasks; deleting a list removes
//! its tasks. The fan-out is row by row and not atomic: when a child delete
//! fails, children already removed stay removed and the parent is kept.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainResult, Entity};
use crate::repository::{Repositories, Repository};

/// Row-level operations the cascade needs
#[async_trait]
pub trait CascadeStore: Send + Sync {
    async fn lists_in_space(&self, space_id: u32) -> DomainResult<Vec<u32>>;
    async fn tasks_in_list(&self, list_id: u32) -> DomainResult<Vec<u32>>;
    async fn delete_task(&self, id: u32) -> DomainResult<()>;
    async fn delete_list(&self, id: u32) -> DomainResult<()>;
    async fn delete_space(&self, id: u32) -> DomainResult<()>;
}

#[async_trait]
impl CascadeStore for Repositories {
    async fn lists_in_space(&self, space_id: u32) -> DomainResult<Vec<u32>> {
        let lists = self.lists.list_by_space(space_id).await?;
        Ok(lists.iter().map(|l| l.id()).collect())
    }

    async fn tasks_in_list(&self, list_id: u32) -> DomainResult<Vec<u32>> {
        let tasks = self.tasks.list_by_list(list_id).await?;
        Ok(tasks.iter().map(|t| t.id()).collect())
    }

    async fn delete_task(&self, id: u32) -> DomainResult<()> {
        self.tasks.delete(id).await
    }

    async fn delete_list(&self, id: u32) -> DomainResult<()> {
        self.lists.delete(id).await
    }

    async fn delete_space(&self, id: u32) -> DomainResult<()> {
        self.spaces.delete(id).await
    }
}

/// What a cascade removed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub space_id: Option<u32>,
    pub list_ids: Vec<u32>,
    pub task_count: usize,
}

impl CascadeReport {
    pub fn rows(&self) -> usize {
        self.space_id.map(|_| 1).unwrap_or(0) + self.list_ids.len() + self.task_count
    }
}

async fn purge_list<S: CascadeStore + ?Sized>(store: &S, list_id: u32, report: &mut CascadeReport) -> DomainResult<()> {
    for task_id in store.tasks_in_list(list_id).await? {
        store.delete_task(task_id).await?;
        report.task_count += 1;
    }
    store.delete_list(list_id).await?;
    report.list_ids.push(list_id);
    Ok(())
}

pub async fn delete_list<S: CascadeStore + ?Sized>(store: &S, list_id: u32) -> DomainResult<CascadeReport> {
    let mut report = CascadeReport::default();
    if let Err(e) = purge_list(store, list_id, &mut report).await {
        log::error!(
            target: "taskspace.cascade",
            "Delete of list {} stopped after {} tasks: {}",
            list_id,
            report.task_count,
            e
        );
        return Err(e);
    }
    log::info!(target: "taskspace.cascade", "Deleted list {} with {} tasks", list_id, report.task_count);
    Ok(report)
}

pub async fn delete_space<S: CascadeStore + ?Sized>(store: &S, space_id: u32) -> DomainResult<CascadeReport> {
    let mut report = CascadeReport::default();
    let result = async {
        for list_id in store.lists_in_space(space_id).await? {
            purge_list(store, list_id, &mut report).await?;
        }
        store.delete_space(space_id).await
    }
    .await;

    if let Err(e) = result {
        log::error!(
            target: "taskspace.cascade",
            "Delete of space {} stopped after {} lists and {} tasks: {}",
            space_id,
            report.list_ids.len(),
            report.task_count,
            e
        );
        return Err(e);
    }

    report.space_id = Some(space_id);
    log::info!(
        target: "taskspace.cascade",
        "Deleted space {} with {} lists and {} tasks",
        space_id,
        report.list_ids.len(),
        report.task_count
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, List, Space, Task};
    use crate::repository::init_db;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;
    use tokio::sync::Mutex;

    /// In-memory store that fails on a chosen task id
    struct FakeStore {
        lists: BTreeMap<u32, u32>,
        tasks: Mutex<BTreeMap<u32, u32>>,
        live_lists: Mutex<BTreeSet<u32>>,
        spaces: Mutex<BTreeSet<u32>>,
        poison_task: Option<u32>,
    }

    #[async_trait]
    impl CascadeStore for FakeStore {
        async fn lists_in_space(&self, space_id: u32) -> DomainResult<Vec<u32>> {
            Ok(self.lists.iter().filter(|(_, s)| **s == space_id).map(|(l, _)| *l).collect())
        }

        async fn tasks_in_list(&self, list_id: u32) -> DomainResult<Vec<u32>> {
            let tasks = self.tasks.lock().await;
            Ok(tasks.iter().filter(|(_, l)| **l == list_id).map(|(t, _)| *t).collect())
        }

        async fn delete_task(&self, id: u32) -> DomainResult<()> {
            if self.poison_task == Some(id) {
                return Err(DomainError::Internal("disk full".to_string()));
            }
            self.tasks.lock().await.remove(&id);
            Ok(())
        }

        async fn delete_list(&self, id: u32) -> DomainResult<()> {
            self.live_lists.lock().await.remove(&id);
            Ok(())
        }

        async fn delete_space(&self, id: u32) -> DomainResult<()> {
            self.spaces.lock().await.remove(&id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_parent() {
        let store = FakeStore {
            lists: BTreeMap::from([(10, 1), (11, 1)]),
            tasks: Mutex::new(BTreeMap::from([(100, 10), (101, 10), (102, 11)])),
            live_lists: Mutex::new(BTreeSet::from([10, 11])),
            spaces: Mutex::new(BTreeSet::from([1])),
            poison_task: Some(102),
        };

        let result = delete_space(&store, 1).await;
        assert!(matches!(result, Err(DomainError::Internal(_))));

        // first list went, second list and the space stay
        assert_eq!(*store.live_lists.lock().await, BTreeSet::from([11]));
        assert!(store.spaces.lock().await.contains(&1));
        assert_eq!(store.tasks.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_space_cascade_removes_every_row() {
        let db = init_db(&PathBuf::from(":memory:")).await.unwrap();
        let repos = Repositories::new(db.connection());

        let space = repos.spaces.create(&Space::new("org", "S".to_string())).await.unwrap();
        let keep = repos.spaces.create(&Space::new("org", "Keep".to_string())).await.unwrap();
        let kept_list = repos.lists.create(&List::new("org", keep.id, "K".to_string())).await.unwrap();

        let mut task_ids = Vec::new();
        let mut list_ids = Vec::new();
        for name in ["A", "B"] {
            let list = repos.lists.create(&List::new("org", space.id, name.to_string())).await.unwrap();
            for n in 0..3 {
                let task = repos.tasks.create(&Task::new("org", list.id, format!("{}{}", name, n))).await.unwrap();
                task_ids.push(task.id);
            }
            list_ids.push(list.id);
        }

        let report = delete_space(&repos, space.id).await.unwrap();
        assert_eq!(report.rows(), 1 + 2 + 6);

        assert!(repos.spaces.find_by_id(space.id).await.unwrap().is_none());
        for id in list_ids {
            assert!(repos.lists.find_by_id(id).await.unwrap().is_none());
            assert!(repos.tasks.list_by_list(id).await.unwrap().is_empty());
        }
        for id in task_ids {
            assert!(repos.tasks.find_by_id(id).await.unwrap().is_none());
        }
        assert!(repos.lists.find_by_id(kept_list.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_cascade() {
        let db = init_db(&PathBuf::from(":memory:")).await.unwrap();
        let repos = Repositories::new(db.connection());

        let space = repos.spaces.create(&Space::new("org", "S".to_string())).await.unwrap();
        let list = repos.lists.create(&List::new("org", space.id, "L".to_string())).await.unwrap();
        let t1 = repos.tasks.create(&Task::new("org", list.id, "T1".to_string())).await.unwrap();
        let t2 = repos.tasks.create(&Task::new("org", list.id, "T2".to_string())).await.unwrap();

        let report = delete_list(&repos, list.id).await.unwrap();
        assert_eq!(report.task_count, 2);
        assert!(repos.tasks.find_by_id(t1.id).await.unwrap().is_none());
        assert!(repos.tasks.find_by_id(t2.id).await.unwrap().is_none());
        assert!(repos.lists.list_by_space(space.id).await.unwrap().is_empty());
    }
}
