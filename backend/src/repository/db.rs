//! Database Connection and Setup
//!
//! Manages SQLite database connection and migrations.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the single SQLite connection
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: SharedConnection,
    pub db_path: PathBuf,
}

impl DbState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
            db_path,
        }
    }

    /// Shared connection handle for repositories
    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }

    pub async fn is_ready(&self) -> bool {
        self.conn.lock().await.is_some()
    }
}

/// Initialize database with path (`:memory:` for an in-memory database)
pub async fn init_db(db_path: &Path) -> Result<DbState, String> {
    let conn = if db_path == Path::new(":memory:") {
        Connection::open_in_memory()
    } else {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create db dir: {}", e))?;
            }
        }
        Connection::open(db_path)
    }
    .map_err(|e| format!("Failed to open db: {}", e))?;

    // Run migrations
    run_migrations(&conn)?;

    let state = DbState::new(db_path.to_path_buf());
    *state.conn.lock().await = Some(conn);

    log::info!(target: "taskspace.db", "Database ready at {}", db_path.display());
    Ok(state)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(names) = stmt.query_map([], |row| row.get::<_, String>(1)) else {
        return false;
    };
    let found = names.flatten().any(|name| name == column);
    found
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS spaces (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            color TEXT NOT NULL,
            icon TEXT NOT NULL,
            organization_id TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            color TEXT,
            space_id INTEGER NOT NULL,
            organization_id TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            list_id INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'todo',
            sort_order INTEGER NOT NULL DEFAULT 0,
            priority TEXT,
            organization_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    // Scheduling and assignment columns were added after the first release
    if !column_exists(conn, "tasks", "assignee_ids") {
        conn.execute("ALTER TABLE tasks ADD COLUMN assignee_ids TEXT NOT NULL DEFAULT '[]'", [])
            .map_err(|e| format!("Failed to add assignee_ids: {}", e))?;
    }

    if !column_exists(conn, "tasks", "start_date") {
        conn.execute("ALTER TABLE tasks ADD COLUMN start_date INTEGER", [])
            .map_err(|e| format!("Failed to add start_date: {}", e))?;
    }

    if !column_exists(conn, "tasks", "due_date") {
        conn.execute("ALTER TABLE tasks ADD COLUMN due_date INTEGER", [])
            .map_err(|e| format!("Failed to add due_date: {}", e))?;
    }

    conn.execute(
        "CREATE TABLE IF NOT EXISTS onboarding (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            organization_id TEXT NOT NULL UNIQUE,
            workspace_type TEXT,
            manage_type TEXT,
            created_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    // Ordered range scans per scope
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_spaces_org_order ON spaces(organization_id, sort_order);
         CREATE INDEX IF NOT EXISTS idx_lists_space_order ON lists(space_id, sort_order);
         CREATE INDEX IF NOT EXISTS idx_lists_org ON lists(organization_id);
         CREATE INDEX IF NOT EXISTS idx_tasks_org_list ON tasks(organization_id, list_id);
         CREATE INDEX IF NOT EXISTS idx_tasks_org_list_status_order ON tasks(organization_id, list_id, status, sort_order);",
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_in_memory() {
        let state = init_db(Path::new(":memory:")).await.unwrap();
        assert!(state.is_ready().await);

        let guard = state.conn.lock().await;
        let conn = guard.as_ref().unwrap();
        assert!(column_exists(conn, "tasks", "assignee_ids"));
        assert!(column_exists(conn, "lists", "space_id"));
        assert!(!column_exists(conn, "lists", "status"));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("taskspace.db");

        init_db(&path).await.unwrap();
        let reopened = init_db(&path).await.unwrap();
        assert!(reopened.is_ready().await);
        assert!(path.exists());
    }
}
