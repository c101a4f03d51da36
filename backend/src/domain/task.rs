//! Task Entity
//!
//! Tasks belong to a list and are ordered per (list, status) column.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use super::entity::{DomainError, Entity, TenantOwned};

/// Board column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Complete,
}

impl TaskStatus {
    /// Column order on the board
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Complete => "complete",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Complete => "Complete",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "complete" => Ok(TaskStatus::Complete),
            other => Err(DomainError::BadRequest(format!("Invalid status value: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Normal => "normal",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "normal" => Ok(TaskPriority::Normal),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(DomainError::BadRequest(format!("Invalid priority value: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: Option<String>,
    pub list_id: u32,
    pub status: TaskStatus,
    /// Position within the (list, status) column
    pub sort_order: i32,
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
    /// Unix milliseconds
    pub start_date: Option<i64>,
    /// Unix milliseconds
    pub due_date: Option<i64>,
    pub organization_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn new(organization_id: &str, list_id: u32, title: String) -> Self {
        Self {
            id: 0,
            title,
            description: None,
            list_id,
            status: TaskStatus::Todo,
            sort_order: 0,
            priority: None,
            assignee_ids: Vec::new(),
            start_date: None,
            due_date: None,
            organization_id: organization_id.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Case-insensitive substring match on title or description
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(needle_lower))
                .unwrap_or(false)
    }
}

impl Entity for Task {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TenantOwned for Task {
    const KIND: &'static str = "task";

    fn organization_id(&self) -> &str {
        &self.organization_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_wire_names() {
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn test_unknown_status_is_bad_request() {
        let err = "doing".parse::<TaskStatus>().unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
        assert!(serde_json::from_str::<TaskStatus>("\"doing\"").is_err());
    }

    #[test]
    fn test_unknown_priority_is_bad_request() {
        assert_eq!("urgent".parse::<TaskPriority>().unwrap(), TaskPriority::Urgent);
        assert!(matches!("asap".parse::<TaskPriority>(), Err(DomainError::BadRequest(_))));
    }

    #[test]
    fn test_task_text_match() {
        let mut task = Task::new("org", 1, "Write Release Notes".to_string());
        task.description = Some("Include migration steps".to_string());
        assert!(task.matches_text("release"));
        assert!(task.matches_text("migration"));
        assert!(!task.matches_text("deploy"));
    }
}
