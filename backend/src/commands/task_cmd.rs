//! Commands for Task CRUD, board columns and ordering

use serde::{Deserialize, Serialize};

use crate::auth::{resolve_tenant, Action, Identity, Tenant};
use crate::domain::{DomainResult, List, Page, PageRequest, Task, TaskPriority, TaskStatus};
use crate::live::Topic;
use crate::repository::{OrderScope, OrderedRepository, Repository};
use crate::AppState;
use super::common::{required_text, IdArgs};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListByListArgs {
    pub list_id: u32,
    #[serde(default)]
    pub pagination_opts: Option<PageRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListByStatusArgs {
    pub list_id: u32,
    pub status: TaskStatus,
    #[serde(default)]
    pub pagination_opts: Option<PageRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskArgs {
    pub list_id: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assignee_ids: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<i64>,
    #[serde(default)]
    pub due_date: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskArgs {
    pub id: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Moves the task to another list (end of its column)
    #[serde(default)]
    pub list_id: Option<u32>,
    /// Moves the task to the end of another column
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assignee_ids: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<i64>,
    #[serde(default)]
    pub due_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusArgs {
    pub id: u32,
    pub status: TaskStatus,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTasksArgs {
    pub list_id: u32,
    pub status: TaskStatus,
    pub ordered_ids: Vec<u32>,
}

async fn authorized_list(state: &AppState, tenant: &Tenant, list_id: u32, action: Action) -> DomainResult<List> {
    let existing = state.repos.lists.find_by_id(list_id).await?;
    tenant.authorize_found(existing, action)
}

async fn authorized_task(state: &AppState, tenant: &Tenant, id: u32, action: Action) -> DomainResult<Task> {
    let existing = state.repos.tasks.find_by_id(id).await?;
    tenant.authorize_found(existing, action)
}

/// All tasks of a list, column by column
pub async fn list_tasks_by_list(
    state: &AppState,
    identity: Option<&Identity>,
    args: ListByListArgs,
) -> DomainResult<Page<Task>> {
    let tenant = resolve_tenant(identity)?;
    authorized_list(state, &tenant, args.list_id, Action::Read).await?;
    let tasks = state.repos.tasks.list_by_list(args.list_id).await?;
    Ok(Page::paginate(tasks, args.pagination_opts.as_ref()))
}

/// One board column
pub async fn list_tasks_by_list_and_status(
    state: &AppState,
    identity: Option<&Identity>,
    args: ListByStatusArgs,
) -> DomainResult<Page<Task>> {
    let tenant = resolve_tenant(identity)?;
    authorized_list(state, &tenant, args.list_id, Action::Read).await?;
    let tasks = state.repos.tasks.list_by_list_and_status(args.list_id, args.status).await?;
    Ok(Page::paginate(tasks, args.pagination_opts.as_ref()))
}

pub async fn list_all_tasks(state: &AppState, identity: Option<&Identity>) -> DomainResult<Vec<Task>> {
    let tenant = resolve_tenant(identity)?;
    state.repos.tasks.list_by_organization(&tenant.organization_id).await
}

pub async fn get_task(state: &AppState, identity: Option<&Identity>, args: IdArgs) -> DomainResult<Option<Task>> {
    let tenant = resolve_tenant(identity)?;
    match state.repos.tasks.find_by_id(args.id).await? {
        Some(task) => {
            tenant.authorize(&task, Action::Read)?;
            Ok(Some(task))
        }
        None => Ok(None),
    }
}

pub async fn create_task(state: &AppState, identity: Option<&Identity>, args: CreateTaskArgs) -> DomainResult<Task> {
    let tenant = resolve_tenant(identity)?;
    let list = authorized_list(state, &tenant, args.list_id, Action::Update).await?;

    let mut task = Task::new(&tenant.organization_id, list.id, required_text(&args.title, "Task title")?);
    task.description = args.description;
    task.status = args.status.unwrap_or_default();
    task.priority = args.priority;
    task.assignee_ids = args.assignee_ids.unwrap_or_default();
    task.start_date = args.start_date;
    task.due_date = args.due_date;

    let created = state.repos.tasks.create(&task).await?;
    log::info!(target: "taskspace.commands", "Created task {} in list {}", created.id, list.id);
    state.publish(&tenant, Topic::Tasks { list_id: list.id });
    Ok(created)
}

/// Partial update; a new list or status moves the task to the end of that column
pub async fn update_task(state: &AppState, identity: Option<&Identity>, args: UpdateTaskArgs) -> DomainResult<Task> {
    let tenant = resolve_tenant(identity)?;
    let mut task = authorized_task(state, &tenant, args.id, Action::Update).await?;
    let previous_list = task.list_id;
    let previous_status = task.status;

    if let Some(title) = args.title {
        task.title = required_text(&title, "Task title")?;
    }
    if let Some(description) = args.description {
        task.description = Some(description);
    }
    if let Some(priority) = args.priority {
        task.priority = Some(priority);
    }
    if let Some(assignee_ids) = args.assignee_ids {
        task.assignee_ids = assignee_ids;
    }
    if let Some(start_date) = args.start_date {
        task.start_date = Some(start_date);
    }
    if let Some(due_date) = args.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(list_id) = args.list_id.filter(|id| *id != previous_list) {
        authorized_list(state, &tenant, list_id, Action::Update).await?;
        task.list_id = list_id;
    }
    if let Some(status) = args.status {
        task.status = status;
    }

    if task.list_id != previous_list || task.status != previous_status {
        let scope = OrderScope::Tasks { list_id: task.list_id, status: task.status };
        task.sort_order = state.repos.tasks.next_sort_order(&scope).await?;
    }

    let updated = state.repos.tasks.update(&task).await?;
    state.publish(&tenant, Topic::Tasks { list_id: previous_list });
    if updated.list_id != previous_list {
        state.publish(&tenant, Topic::Tasks { list_id: updated.list_id });
    }
    Ok(updated)
}

/// Patch status and position of one task
pub async fn update_task_status(
    state: &AppState,
    identity: Option<&Identity>,
    args: UpdateTaskStatusArgs,
) -> DomainResult<Task> {
    let tenant = resolve_tenant(identity)?;
    let mut task = authorized_task(state, &tenant, args.id, Action::Update).await?;
    task.status = args.status;
    task.sort_order = args.sort_order;

    let updated = state.repos.tasks.update(&task).await?;
    state.publish(&tenant, Topic::Tasks { list_id: updated.list_id });
    Ok(updated)
}

pub async fn remove_task(state: &AppState, identity: Option<&Identity>, args: IdArgs) -> DomainResult<()> {
    let tenant = resolve_tenant(identity)?;
    let task = authorized_task(state, &tenant, args.id, Action::Delete).await?;
    state.repos.tasks.delete(task.id).await?;
    state.publish(&tenant, Topic::Tasks { list_id: task.list_id });
    Ok(())
}

/// Persist one column's order; tasks from other columns of the list take its status
pub async fn reorder_tasks(state: &AppState, identity: Option<&Identity>, args: ReorderTasksArgs) -> DomainResult<()> {
    let tenant = resolve_tenant(identity)?;
    authorized_list(state, &tenant, args.list_id, Action::Reorder).await?;
    for id in &args.ordered_ids {
        authorized_task(state, &tenant, *id, Action::Reorder).await?;
    }

    let scope = OrderScope::Tasks { list_id: args.list_id, status: args.status };
    state.repos.tasks.reorder(&scope, &args.ordered_ids).await?;
    log::debug!(
        target: "taskspace.commands",
        "Reordered {} tasks in list {} ({})",
        args.ordered_ids.len(),
        args.list_id,
        args.status.as_str()
    );
    state.publish(&tenant, Topic::Tasks { list_id: args.list_id });
    Ok(())
}
