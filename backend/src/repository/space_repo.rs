//! Space Repository
//!
//! SQLite-backed implementation for Space CRUD and ordering.

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Row};

use crate::domain::{DomainError, DomainResult, Space};
use super::db::SharedConnection;
use super::ordering::{self, now_millis, OrderScope};
use super::traits::{OrderedRepository, Repository, SearchableRepository};

const SPACE_COLUMNS: &str =
    "id, name, description, color, icon, organization_id, sort_order, created_at, updated_at";

/// SQLite implementation of Space repository
pub struct SpaceRepository {
    conn: SharedConnection,
}

impl SpaceRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// All spaces of an organization in presentation order
    pub async fn list_by_organization(&self, organization_id: &str) -> DomainResult<Vec<Space>> {
        self.list_in_scope(&OrderScope::Spaces {
            organization_id: organization_id.to_string(),
        })
        .await
    }
}

fn row_to_space(row: &Row) -> rusqlite::Result<Space> {
    Ok(Space {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
        organization_id: row.get(5)?,
        sort_order: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[async_trait]
impl Repository<Space> for SpaceRepository {
    async fn create(&self, entity: &Space) -> DomainResult<Space> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let scope = OrderScope::Spaces {
            organization_id: entity.organization_id.clone(),
        };
        let sort_order = ordering::next_sort_order(conn, &scope)?;
        let now = now_millis();

        conn.execute(
            "INSERT INTO spaces (name, description, color, icon, organization_id, sort_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                entity.name,
                entity.description,
                entity.color,
                entity.icon,
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

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Space>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let query = format!("SELECT {} FROM spaces WHERE id = ?", SPACE_COLUMNS);
        let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], row_to_space)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        match rows.next() {
            Some(space) => Ok(Some(space.map_err(|e| DomainError::Internal(e.to_string()))?)),
            None => Ok(None),
        }
    }

    async fn update(&self, entity: &Space) -> DomainResult<Space> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let now = now_millis();
        let changed = conn
            .execute(
                "UPDATE spaces SET name = ?1, description = ?2, color = ?3, icon = ?4, sort_order = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    entity.name,
                    entity.description,
                    entity.color,
                    entity.icon,
                    entity.sort_order,
                    now,
                    entity.id
                ],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound("Space not found".to_string()));
        }

        let mut updated = entity.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let changed = conn
            .execute("DELETE FROM spaces WHERE id = ?", params![id])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(DomainError::NotFound("Space not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderedRepository<Space> for SpaceRepository {
    async fn list_in_scope(&self, scope: &OrderScope) -> DomainResult<Vec<Space>> {
        scope.expect_table("spaces")?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let (query, bindings) = ordering::scope_query(scope, SPACE_COLUMNS);
        let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
        let spaces = stmt
            .query_map(params_from_iter(bindings), row_to_space)
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(spaces)
    }

    async fn next_sort_order(&self, scope: &OrderScope) -> DomainResult<i32> {
        scope.expect_table("spaces")?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;
        ordering::next_sort_order(conn, scope)
    }

    async fn reorder(&self, scope: &OrderScope, ordered_ids: &[u32]) -> DomainResult<()> {
        scope.expect_table("spaces")?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;
        ordering::write_order(conn, scope, ordered_ids)
    }
}

#[async_trait]
impl SearchableRepository<Space> for SpaceRepository {
    async fn search(&self, organization_id: &str, query: &str) -> DomainResult<Vec<Space>> {
        let needle = query.to_lowercase();
        let spaces = self.list_by_organization(organization_id).await?;
        Ok(spaces
            .into_iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect())
    }
}
