//! Ordering primitive
//!
//! Every ordered table shares the same contract: new rows go to the end of
//! their scope, reorders write a contiguous `0..n-1`, and reads sort by
//! `sort_order` with `created_at` then `id` as tie-breakers.

use std::collections::HashSet;

use rusqlite::{params, params_from_iter, types::Value, Connection};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult, TaskStatus};

/// ORDER BY clause used by every ordered read
pub(crate) const PRESENTATION_ORDER: &str = "sort_order ASC, created_at ASC, id ASC";

/// Grouping boundary within which `sort_order` values are compared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrderScope {
    #[serde(rename_all = "camelCase")]
    Spaces { organization_id: String },
    #[serde(rename_all = "camelCase")]
    Lists { space_id: u32 },
    #[serde(rename_all = "camelCase")]
    Tasks { list_id: u32, status: TaskStatus },
}

impl OrderScope {
    pub(crate) fn table(&self) -> &'static str {
        match self {
            OrderScope::Spaces { .. } => "spaces",
            OrderScope::Lists { .. } => "lists",
            OrderScope::Tasks { .. } => "tasks",
        }
    }

    fn filter(&self) -> &'static str {
        match self {
            OrderScope::Spaces { .. } => "organization_id = ?",
            OrderScope::Lists { .. } => "space_id = ?",
            OrderScope::Tasks { .. } => "list_id = ? AND status = ?",
        }
    }

    fn bindings(&self) -> Vec<Value> {
        match self {
            OrderScope::Spaces { organization_id } => vec![Value::Text(organization_id.clone())],
            OrderScope::Lists { space_id } => vec![Value::Integer(*space_id as i64)],
            OrderScope::Tasks { list_id, status } => vec![
                Value::Integer(*list_id as i64),
                Value::Text(status.as_str().to_string()),
            ],
        }
    }

    /// Rejects a scope handed to a repository for another table
    pub(crate) fn expect_table(&self, table: &str) -> DomainResult<()> {
        if self.table() == table {
            Ok(())
        } else {
            Err(DomainError::BadRequest(format!(
                "Scope for {} cannot order {}",
                self.table(),
                table
            )))
        }
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Next free slot at the end of the scope
pub(crate) fn next_sort_order(conn: &Connection, scope: &OrderScope) -> DomainResult<i32> {
    let query = format!(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM {} WHERE {}",
        scope.table(),
        scope.filter()
    );
    conn.query_row(&query, params_from_iter(scope.bindings()), |row| row.get::<_, i32>(0))
        .map_err(|e| DomainError::Internal(e.to_string()))
}

/// Ids of the scope in presentation order
pub(crate) fn scope_ids(conn: &Connection, scope: &OrderScope) -> DomainResult<Vec<u32>> {
    let query = format!(
        "SELECT id FROM {} WHERE {} ORDER BY {}",
        scope.table(),
        scope.filter(),
        PRESENTATION_ORDER
    );
    let mut stmt = conn.prepare(&query).map_err(|e| DomainError::Internal(e.to_string()))?;
    let ids = stmt
        .query_map(params_from_iter(scope.bindings()), |row| row.get::<_, u32>(0))
        .map_err(|e| DomainError::Internal(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    Ok(ids)
}

/// Select clause for the rows of a scope, used by the typed repositories
pub(crate) fn scope_query(scope: &OrderScope, columns: &str) -> (String, Vec<Value>) {
    (
        format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {}",
            columns,
            scope.table(),
            scope.filter(),
            PRESENTATION_ORDER
        ),
        scope.bindings(),
    )
}

/// Assign `sort_order = i` to each id, in one transaction.
///
/// Lists are re-parented to the scope's space and tasks take the scope's
/// status; a task from another list is rejected.
pub(crate) fn write_order(conn: &Connection, scope: &OrderScope, ordered_ids: &[u32]) -> DomainResult<()> {
    let mut seen = HashSet::with_capacity(ordered_ids.len());
    if let Some(dup) = ordered_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(DomainError::BadRequest(format!("Duplicate id {} in reorder", dup)));
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    let now = now_millis();

    for (position, id) in ordered_ids.iter().enumerate() {
        let position = position as i32;
        let changed = match scope {
            OrderScope::Spaces { organization_id } => tx.execute(
                "UPDATE spaces SET sort_order = ?1, updated_at = ?2 WHERE id = ?3 AND organization_id = ?4",
                params![position, now, id, organization_id],
            ),
            OrderScope::Lists { space_id } => tx.execute(
                "UPDATE lists SET sort_order = ?1, space_id = ?2, updated_at = ?3 WHERE id = ?4",
                params![position, space_id, now, id],
            ),
            OrderScope::Tasks { list_id, status } => tx.execute(
                "UPDATE tasks SET sort_order = ?1, status = ?2, updated_at = ?3 WHERE id = ?4 AND list_id = ?5",
                params![position, status.as_str(), now, id, list_id],
            ),
        }
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        if changed == 0 {
            return Err(explain_missing(&tx, scope, *id));
        }
    }

    tx.commit().map_err(|e| DomainError::Internal(e.to_string()))
}

fn explain_missing(conn: &Connection, scope: &OrderScope, id: u32) -> DomainError {
    let query = format!("SELECT COUNT(*) FROM {} WHERE id = ?", scope.table());
    let exists = conn
        .query_row(&query, params![id], |row| row.get::<_, i64>(0))
        .map(|n| n > 0)
        .unwrap_or(false);

    match (scope, exists) {
        (OrderScope::Tasks { list_id, .. }, true) => {
            DomainError::BadRequest(format!("Task {} does not belong to list {}", id, list_id))
        }
        (OrderScope::Spaces { .. }, true) => {
            DomainError::Unauthorized("You are not authorized to reorder this space".to_string())
        }
        (OrderScope::Spaces { .. }, false) => DomainError::NotFound("Space not found".to_string()),
        (OrderScope::Lists { .. }, _) => DomainError::NotFound("List not found".to_string()),
        (OrderScope::Tasks { .. }, false) => DomainError::NotFound("Task not found".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE lists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                space_id INTEGER NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            );",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_next_sort_order_starts_at_zero() {
        let conn = scratch();
        let scope = OrderScope::Lists { space_id: 7 };
        assert_eq!(next_sort_order(&conn, &scope).unwrap(), 0);

        conn.execute("INSERT INTO lists (space_id, sort_order) VALUES (7, 4)", []).unwrap();
        assert_eq!(next_sort_order(&conn, &scope).unwrap(), 5);
        // other scopes are unaffected
        assert_eq!(next_sort_order(&conn, &OrderScope::Lists { space_id: 8 }).unwrap(), 0);
    }

    #[test]
    fn test_ties_break_on_created_at_then_id() {
        let conn = scratch();
        conn.execute("INSERT INTO lists (space_id, sort_order, created_at) VALUES (1, 0, 20)", []).unwrap();
        conn.execute("INSERT INTO lists (space_id, sort_order, created_at) VALUES (1, 0, 10)", []).unwrap();
        conn.execute("INSERT INTO lists (space_id, sort_order, created_at) VALUES (1, 0, 10)", []).unwrap();

        let ids = scope_ids(&conn, &OrderScope::Lists { space_id: 1 }).unwrap();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_write_order_moves_rows_into_scope() {
        let conn = scratch();
        for _ in 0..3 {
            conn.execute("INSERT INTO lists (space_id) VALUES (1)", []).unwrap();
        }
        write_order(&conn, &OrderScope::Lists { space_id: 2 }, &[3, 1]).unwrap();

        assert_eq!(scope_ids(&conn, &OrderScope::Lists { space_id: 2 }).unwrap(), vec![3, 1]);
        assert_eq!(scope_ids(&conn, &OrderScope::Lists { space_id: 1 }).unwrap(), vec![2]);
    }

    #[test]
    fn test_write_order_rejects_duplicates_and_rolls_back_unknown_ids() {
        let conn = scratch();
        conn.execute("INSERT INTO lists (space_id, sort_order) VALUES (1, 5)", []).unwrap();

        let dup = write_order(&conn, &OrderScope::Lists { space_id: 1 }, &[1, 1]);
        assert!(matches!(dup, Err(DomainError::BadRequest(_))));

        let missing = write_order(&conn, &OrderScope::Lists { space_id: 1 }, &[1, 99]);
        assert!(matches!(missing, Err(DomainError::NotFound(_))));
        let order: i32 = conn
            .query_row("SELECT sort_order FROM lists WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(order, 5);
    }

    #[test]
    fn test_scope_table_mismatch() {
        let scope = OrderScope::Spaces { organization_id: "org".to_string() };
        assert!(scope.expect_table("spaces").is_ok());
        assert!(scope.expect_table("lists").is_err());
    }
}
