//! List Repository
//!
//! SQLite-backed implementation for List CRUD and ordering within a space.

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Row};

use crate::domain::{DomainError, DomainResult, List};
use super::db::SharedConnection;
use super::ordering::{self, now_millis, OrderScope, PRESENTATION_ORDER};
use super::traits::{OrderedRepository, Repository, SearchableRepository};

const LIST_COLUMNS: &str =
    "id, name, description, color, space_id, organization_id, sort_order, created_at, updated_at";

/// SQLite implementation of List repository
pub struct ListRepository {
    conn: SharedConnection,
}

impl ListRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Lists of one space in presentation order
    pub async fn list_by_space(&self, space_id: u32) -> DomainResult<Vec<List>> {
        self.list_in_scope(&OrderScope::Lists { space_id }).await
    }

    /// Every list of an organization, grouped by space and ordered within each
    pub async fn list_by_organization(&self, organization_id: &str) -> DomainResult<Vec<List>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let query = format!(
            "SELECT {} FROM lists WHERE organization_id = ? ORDER BY space_id ASC, {}",
            LIST_COLUMNS, PRESENTATION_ORDER
        );
        let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
        let lists = stmt
            .query_map(params![organization_id], row_to_list)
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(lists)
    }
}

fn row_to_list(row: &Row) -> rusqlite::Result<List> {
    Ok(List {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        space_id: row.get(4)?,
        organization_id: row.get(5)?,
        sort_order: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[async_trait]
impl Repository<List> for ListRepository {
    async fn create(&self, entity: &List) -> DomainResult<List> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let sort_order = ordering::next_sort_order(conn, &OrderScope::Lists { space_id: entity.space_id })?;
        let now = now_millis();

        conn.execute(
            "INSERT INTO lists (name, description, color, space_id, organization_id, sort_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                entity.name,
                entity.description,
                entity.color,
                entity.space_id,
                entity.organization_id,
                sort_order,
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

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<List>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let query = format!("SELECT {} FROM lists WHERE id = ?", LIST_COLUMNS);
        let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], row_to_list)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        match rows.next() {
            Some(list) => Ok(Some(list.map_err(|e| DomainError::Internal(e.to_string()))?)),
            None => Ok(None),
        }
    }

    async fn update(&self, entity: &List) -> DomainResult<List> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let now = now_millis();
        let changed = conn
            .execute(
                "UPDATE lists SET name = ?1, description = ?2, color = ?3, space_id = ?4, sort_order = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    entity.name,
                    entity.description,
                    entity.color,
                    entity.space_id,
                    entity.sort_order,
                    now,
                    entity.id
                ],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound("List not found".to_string()));
        }

        let mut updated = entity.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let changed = conn
            .execute("DELETE FROM lists WHERE id = ?", params![id])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound("List not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderedRepository<List> for ListRepository {
    async fn list_in_scope(&self, scope: &OrderScope) -> DomainResult<Vec<List>> {
        scope.expect_table("lists")?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let (query, bindings) = ordering::scope_query(scope, LIST_COLUMNS);
        let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
        let lists = stmt
            .query_map(params_from_iter(bindings), row_to_list)
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(lists)
    }

    async fn next_sort_order(&self, scope: &OrderScope) -> DomainResult<i32> {
        scope.expect_table("lists")?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;
        ordering::next_sort_order(conn, scope)
    }

    async fn reorder(&self, scope: &OrderScope, ordered_ids: &[u32]) -> DomainResult<()> {
        scope.expect_table("lists")?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;
        ordering::write_order(conn, scope, ordered_ids)
    }
}

#[async_trait]
impl SearchableRepository<List> for ListRepository {
    async fn search(&self, organization_id: &str, query: &str) -> DomainResult<Vec<List>> {
        let needle = query.to_lowercase();
        let lists = self.list_by_organization(organization_id).await?;
        Ok(lists
            .into_iter()
            .filter(|l| l.name.to_lowercase().contains(&needle))
            .collect())
    }
}
