//! Onboarding Repository
//!
//! One row per organization; a repeated start overwrites the answers.

use rusqlite::params;

use crate::domain::{DomainError, DomainResult, Onboarding};
use super::db::SharedConnection;
use super::ordering::now_millis;

pub struct OnboardingRepository {
    conn: SharedConnection,
}

impl OnboardingRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub async fn upsert(
        &self,
        organization_id: &str,
        workspace_type: Option<&str>,
        manage_type: Option<&str>,
    ) -> DomainResult<Onboarding> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        conn.execute(
            "INSERT INTO onboarding (organization_id, workspace_type, manage_type, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(organization_id) DO UPDATE SET
                workspace_type = excluded.workspace_type,
                manage_type = excluded.manage_type",
            params![organization_id, workspace_type, manage_type, now_millis()],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        let id: u32 = conn
            .query_row(
                "SELECT id FROM onboarding WHERE organization_id = ?",
                params![organization_id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(Onboarding {
            id,
            organization_id: organization_id.to_string(),
            workspace_type: workspace_type.map(str::to_string),
            manage_type: manage_type.map(str::to_string),
        })
    }

    pub async fn find_by_organization(&self, organization_id: &str) -> DomainResult<Option<Onboarding>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let mut stmt = conn
            .prepare("SELECT id, organization_id, workspace_type, manage_type FROM onboarding WHERE organization_id = ?")
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![organization_id], |row| {
                Ok(Onboarding {
                    id: row.get(0)?,
                    organization_id: row.get(1)?,
                    workspace_type: row.get(2)?,
                    manage_type: row.get(3)?,
                })
            })
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        match rows.next() {
            Some(record) => Ok(Some(record.map_err(|e| DomainError::Internal(e.to_string()))?)),
            None => Ok(None),
        }
    }
}
