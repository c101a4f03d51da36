//! Task Repository
//!
//! SQLite-backed implementation for Task CRUD and ordering within a
//! (list, status) column.

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Row};

use crate::domain::{DomainError, DomainResult, Task, TaskStatus};
use super::db::SharedConnection;
use super::ordering::{self, now_millis, OrderScope, PRESENTATION_ORDER};
use super::traits::{OrderedRepository, Repository, SearchableRepository};

const TASK_COLUMNS: &str = "id, title, description, list_id, status, sort_order, priority, assignee_ids, \
     start_date, due_date, organization_id, created_at, updated_at";

/// SQLite implementation of Task repository
pub struct TaskRepository {
    conn: SharedConnection,
}

impl TaskRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Tasks of one list, grouped by board column and ordered within each
    pub async fn list_by_list(&self, list_id: u32) -> DomainResult<Vec<Task>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let query = format!("SELECT {} FROM tasks WHERE list_id = ? ORDER BY {}", TASK_COLUMNS, PRESENTATION_ORDER);
        let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
        let mut tasks = stmt
            .query_map(params![list_id], row_to_task)
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        // Stable sort keeps the per-column order
        tasks.sort_by_key(|t| t.status);
        Ok(tasks)
    }

    /// One board column
    pub async fn list_by_list_and_status(&self, list_id: u32, status: TaskStatus) -> DomainResult<Vec<Task>> {
        self.list_in_scope(&OrderScope::Tasks { list_id, status }).await
    }

    /// Every task of an organization
    pub async fn list_by_organization(&self, organization_id: &str) -> DomainResult<Vec<Task>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let query = format!(
            "SELECT {} FROM tasks WHERE organization_id = ? ORDER BY list_id ASC, {}",
            TASK_COLUMNS, PRESENTATION_ORDER
        );
        let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
        let mut tasks = stmt
            .query_map(params![organization_id], row_to_task)
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tasks.sort_by_key(|t| (t.list_id, t.status));
        Ok(tasks)
    }
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let status: String = row.get(4)?;
    let priority: Option<String> = row.get(6)?;
    let assignees: String = row.get(7)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        list_id: row.get(3)?,
        status: status
            .parse()
            .map_err(|e: DomainError| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        sort_order: row.get(5)?,
        priority: priority
            .map(|p| p.parse())
            .transpose()
            .map_err(|e: DomainError| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?,
        assignee_ids: serde_json::from_str(&assignees)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?,
        start_date: row.get(8)?,
        due_date: row.get(9)?,
        organization_id: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn encode_assignees(task: &Task) -> DomainResult<String> {
    serde_json::to_string(&task.assignee_ids).map_err(|e| DomainError::Internal(e.to_string()))
}

#[async_trait]
impl Repository<Task> for TaskRepository {
    async fn create(&self, entity: &Task) -> DomainResult<Task> {
        let assignees = encode_assignees(entity)?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let scope = OrderScope::Tasks {
            list_id: entity.list_id,
            status: entity.status,
        };
        let sort_order = ordering::next_sort_order(conn, &scope)?;
        let now = now_millis();

        conn.execute(
            "INSERT INTO tasks (title, description, list_id, status, sort_order, priority, assignee_ids,
                                start_date, due_date, organization_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                entity.title,
                entity.description,
                entity.list_id,
                entity.status.as_str(),
                sort_order,
                entity.priority.map(|p| p.as_str()),
                assignees,
                entity.start_date,
                entity.due_date,
                entity.organization_id,
                now
            ],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut created = entity.clone();
        created.id = conn.last_insert_rowid() as u32;
        created.sort_order = sort_order;
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Task>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let query = format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS);
        let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], row_to_task)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        match rows.next() {
            Some(task) => Ok(Some(task.map_err(|e| DomainError::Internal(e.to_string()))?)),
            None => Ok(None),
        }
    }

    async fn update(&self, entity: &Task) -> DomainResult<Task> {
        let assignees = encode_assignees(entity)?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let now = now_millis();
        let changed = conn
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2, list_id = ?3, status = ?4, sort_order = ?5,
                                  priority = ?6, assignee_ids = ?7, start_date = ?8, due_date = ?9, updated_at = ?10
                 WHERE id = ?11",
                params![
                    entity.title,
                    entity.description,
                    entity.list_id,
                    entity.status.as_str(),
                    entity.sort_order,
                    entity.priority.map(|p| p.as_str()),
                    assignees,
                    entity.start_date,
                    entity.due_date,
                    now,
                    entity.id
                ],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound("Task not found".to_string()));
        }

        let mut updated = entity.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let changed = conn
            .execute("DELETE FROM tasks WHERE id = ?", params![id])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound("Task not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderedRepository<Task> for TaskRepository {
    async fn list_in_scope(&self, scope: &OrderScope) -> DomainResult<Vec<Task>> {
        scope.expect_table("tasks")?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let (query, bindings) = ordering::scope_query(scope, TASK_COLUMNS);
        let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
        let tasks = stmt
            .query_map(params_from_iter(bindings), row_to_task)
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(tasks)
    }

    async fn next_sort_order(&self, scope: &OrderScope) -> DomainResult<i32> {
        scope.expect_table("tasks")?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;
        ordering::next_sort_order(conn, scope)
    }

    async fn reorder(&self, scope: &OrderScope, ordered_ids: &[u32]) -> DomainResult<()> {
        scope.expect_table("tasks")?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;
        ordering::write_order(conn, scope, ordered_ids)
    }
}

#[async_trait]
impl SearchableRepository<Task> for TaskRepository {
    async fn search(&self, organization_id: &str, query: &str) -> DomainResult<Vec<Task>> {
        let needle = query.to_lowercase();
        let tasks = self.list_by_organization(organization_id).await?;
        Ok(tasks.into_iter().filter(|t| t.matches_text(&needle)).collect())
    }
}
