//! Tool call dispatch
//!
//! Each arm is a thin wrapper over the command layer, so tenant checks and
//! ordering rules are the same as for direct client calls.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{resolve_tenant, Identity};
use crate::commands::{self, IdArgs};
use crate::domain::{DomainError, DomainResult, Space, TaskPriority, TaskStatus};
use crate::repository::SearchableRepository;
use crate::AppState;

const TOOL_NAMES: &[&str] = &[
    "listSpaces",
    "getSpace",
    "findSpaceByName",
    "listListsBySpace",
    "getList",
    "findListByName",
    "listTasks",
    "getTask",
    "findTask",
    "createSpace",
    "updateSpace",
    "createList",
    "updateList",
    "createTask",
    "updateTask",
];

pub(crate) fn dispatch_tool_names() -> &'static [&'static str] {
    TOOL_NAMES
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LimitInput {
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpaceInput {
    space_id: u32,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListInput {
    list_id: u32,
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskInput {
    task_id: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchInput {
    query: String,
    #[serde(default)]
    space_id: Option<u32>,
    #[serde(default)]
    list_id: Option<u32>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSpaceInput {
    name: String,
    #[serde(default)]
    description: Option<String>,
    color: String,
    icon: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSpaceInput {
    space_id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateListInput {
    space_id: u32,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateListInput {
    list_id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    space_id: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskInput {
    task_id: u32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    priority: Option<TaskPriority>,
    #[serde(default)]
    assignee_ids: Option<Vec<String>>,
    #[serde(default)]
    start_date: Option<i64>,
    #[serde(default)]
    due_date: Option<i64>,
}

fn parse<T: DeserializeOwned>(input: Value) -> DomainResult<T> {
    let input = if input.is_null() { Value::Object(Default::default()) } else { input };
    serde_json::from_value(input).map_err(|e| DomainError::BadRequest(format!("Invalid tool input: {}", e)))
}

fn to_json<T: Serialize>(value: T) -> DomainResult<Value> {
    serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}

fn checked_query(query: &str) -> DomainResult<String> {
    if query.trim().is_empty() {
        Err(DomainError::BadRequest("query must not be empty".to_string()))
    } else {
        Ok(query.to_string())
    }
}

fn checked_color(color: &str) -> DomainResult<()> {
    if Space::is_known_color(color) {
        Ok(())
    } else {
        Err(DomainError::BadRequest(format!("Unknown space color: {}", color)))
    }
}

fn take<T>(items: Vec<T>, limit: usize) -> Vec<T> {
    items.into_iter().take(limit).collect()
}

/// Run one tool call for the given caller
pub async fn dispatch_tool(state: &AppState, identity: Option<&Identity>, name: &str, input: Value) -> DomainResult<Value> {
    log::info!(target: "taskspace.tools", "tool call {}", name);
    let limits = &state.config;

    let result = match name {
        "listSpaces" => {
            let input: LimitInput = parse(input)?;
            let page = commands::list_spaces(state, identity, Default::default()).await?;
            to_json(take(page.page, limits.clamp_limit(input.limit)))
        }
        "getSpace" => {
            let input: SpaceInput = parse(input)?;
            to_json(commands::get_space(state, identity, IdArgs { id: input.space_id }).await?)
        }
        "findSpaceByName" => {
            let input: SearchInput = parse(input)?;
            let tenant = resolve_tenant(identity)?;
            let spaces = state.repos.spaces.search(&tenant.organization_id, &checked_query(&input.query)?).await?;
            to_json(take(spaces, limits.clamp_limit(input.limit)))
        }
        "listListsBySpace" => {
            let input: SpaceInput = parse(input)?;
            let args = commands::ListBySpaceArgs { space_id: input.space_id, pagination_opts: None };
            let page = commands::list_lists_by_space(state, identity, args).await?;
            to_json(take(page.page, limits.clamp_limit(input.limit)))
        }
        "getList" => {
            let input: ListInput = parse(input)?;
            to_json(commands::get_list(state, identity, IdArgs { id: input.list_id }).await?)
        }
        "findListByName" => {
            let input: SearchInput = parse(input)?;
            let tenant = resolve_tenant(identity)?;
            let lists = state.repos.lists.search(&tenant.organization_id, &checked_query(&input.query)?).await?;
            let lists = lists
                .into_iter()
                .filter(|l| input.space_id.map_or(true, |space_id| l.space_id == space_id))
                .collect();
            to_json(take(lists, limits.clamp_limit(input.limit)))
        }
        "listTasks" => {
            let input: ListInput = parse(input)?;
            let page = match input.status {
                Some(status) => {
                    let args = commands::ListByStatusArgs { list_id: input.list_id, status, pagination_opts: None };
                    commands::list_tasks_by_list_and_status(state, identity, args).await?
                }
                None => {
                    let args = commands::ListByListArgs { list_id: input.list_id, pagination_opts: None };
                    commands::list_tasks_by_list(state, identity, args).await?
                }
            };
            to_json(take(page.page, limits.clamp_limit(input.limit)))
        }
        "getTask" => {
            let input: TaskInput = parse(input)?;
            to_json(commands::get_task(state, identity, IdArgs { id: input.task_id }).await?)
        }
        "findTask" => {
            let input: SearchInput = parse(input)?;
            let tenant = resolve_tenant(identity)?;
            let tasks = state.repos.tasks.search(&tenant.organization_id, &checked_query(&input.query)?).await?;
            let tasks = tasks
                .into_iter()
                .filter(|t| input.list_id.map_or(true, |list_id| t.list_id == list_id))
                .collect();
            to_json(take(tasks, limits.clamp_limit(input.limit)))
        }

        "createSpace" => {
            let input: CreateSpaceInput = parse(input)?;
            checked_color(&input.color)?;
            let args = commands::CreateSpaceArgs {
                name: input.name,
                description: input.description,
                color: Some(input.color),
                icon: Some(input.icon),
            };
            let space = commands::create_space(state, identity, args).await?;
            Ok(json!(space.id))
        }
        "updateSpace" => {
            let input: UpdateSpaceInput = parse(input)?;
            if let Some(color) = &input.color {
                checked_color(color)?;
            }
            let args = commands::UpdateSpaceArgs {
                id: input.space_id,
                name: input.name,
                description: input.description,
                color: input.color,
                icon: input.icon,
            };
            let space = commands::update_space(state, identity, args).await?;
            Ok(json!(space.id))
        }
        "createList" => {
            let input: CreateListInput = parse(input)?;
            let args = commands::CreateListArgs {
                space_id: input.space_id,
                name: input.name,
                ..Default::default()
            };
            let list = commands::create_list(state, identity, args).await?;
            Ok(json!(list.id))
        }
        "updateList" => {
            let input: UpdateListInput = parse(input)?;
            let args = commands::UpdateListArgs {
                id: input.list_id,
                name: input.name,
                space_id: input.space_id,
                ..Default::default()
            };
            let list = commands::update_list(state, identity, args).await?;
            Ok(json!(list.id))
        }
        "createTask" => {
            let args: commands::CreateTaskArgs = parse(input)?;
            let task = commands::create_task(state, identity, args).await?;
            Ok(json!(task.id))
        }
        "updateTask" => {
            let input: UpdateTaskInput = parse(input)?;
            let args = commands::UpdateTaskArgs {
                id: input.task_id,
                title: input.title,
                description: input.description,
                list_id: None,
                status: input.status,
                priority: input.priority,
                assignee_ids: input.assignee_ids,
                start_date: input.start_date,
                due_date: input.due_date,
            };
            let task = commands::update_task(state, identity, args).await?;
            Ok(json!(task.id))
        }

        other => Err(DomainError::BadRequest(format!("Unknown tool: {}", other))),
    };

    if let Err(e) = &result {
        log::warn!(target: "taskspace.tools", "tool {} failed: {}", name, e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn me() -> Identity {
        Identity::new("user_1", "org_1")
    }

    async fn run(state: &AppState, name: &str, input: Value) -> Value {
        dispatch_tool(state, Some(&me()), name, input)
            .await
            .unwrap_or_else(|e| panic!("{} failed: {}", name, e))
    }

    #[test]
    fn tool_definitions_and_dispatch_are_in_sync() {
        let defined = super::super::tool_definitions()
            .iter()
            .filter_map(|tool| tool.get("name").and_then(|v| v.as_str()).map(str::to_string))
            .collect::<BTreeSet<_>>();
        let dispatched = dispatch_tool_names().iter().map(|n| n.to_string()).collect::<BTreeSet<_>>();

        let missing_in_definitions = dispatched.difference(&defined).cloned().collect::<Vec<_>>();
        let missing_in_dispatch = defined.difference(&dispatched).cloned().collect::<Vec<_>>();
        assert!(
            missing_in_definitions.is_empty() && missing_in_dispatch.is_empty(),
            "tool dispatch/definitions mismatch\n  dispatch-only: {missing_in_definitions:?}\n  definitions-only: {missing_in_dispatch:?}"
        );
    }

    #[tokio::test]
    async fn every_tool_name_is_routed() {
        let state = AppState::in_memory().await.unwrap();
        for name in dispatch_tool_names() {
            let err = dispatch_tool(&state, None, name, json!({})).await.unwrap_err();
            assert!(!err.to_string().contains("Unknown tool"), "{} not routed", name);
        }
    }

    #[tokio::test]
    async fn test_create_space_validates_palette() {
        let state = AppState::in_memory().await.unwrap();
        let err = dispatch_tool(
            &state,
            Some(&me()),
            "createSpace",
            json!({ "name": "X", "color": "#123456", "icon": "Folder" }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let id = run(&state, "createSpace", json!({ "name": "X", "color": "bg-rose-500", "icon": "Rocket" })).await;
        let space = run(&state, "getSpace", json!({ "spaceId": id })).await;
        assert_eq!(space["color"], "bg-rose-500");
        assert_eq!(space["icon"], "Rocket");
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let state = AppState::in_memory().await.unwrap();
        for n in 0..3 {
            run(&state, "createSpace", json!({ "name": format!("S{}", n), "color": "bg-blue-500", "icon": "Folder" })).await;
        }
        let two = run(&state, "listSpaces", json!({ "limit": 2 })).await;
        assert_eq!(two.as_array().unwrap().len(), 2);
        let at_least_one = run(&state, "listSpaces", json!({ "limit": 0 })).await;
        assert_eq!(at_least_one.as_array().unwrap().len(), 1);
        let all = run(&state, "listSpaces", json!({ "limit": 1000 })).await;
        assert_eq!(all.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_find_tools_are_case_insensitive_and_scoped() {
        let state = AppState::in_memory().await.unwrap();
        let space = run(&state, "createSpace", json!({ "name": "Marketing", "color": "bg-blue-500", "icon": "Folder" })).await;
        let other = run(&state, "createSpace", json!({ "name": "Sales", "color": "bg-blue-500", "icon": "Folder" })).await;
        let launch = run(&state, "createList", json!({ "spaceId": space, "name": "Launch plan" })).await;
        run(&state, "createList", json!({ "spaceId": other, "name": "Launch leads" })).await;
        run(
            &state,
            "createTask",
            json!({ "listId": launch, "title": "Draft copy", "description": "Press RELEASE for Monday" }),
        )
        .await;

        assert_eq!(run(&state, "findSpaceByName", json!({ "query": "MARK" })).await.as_array().unwrap().len(), 1);
        assert_eq!(run(&state, "findListByName", json!({ "query": "launch" })).await.as_array().unwrap().len(), 2);
        assert_eq!(
            run(&state, "findListByName", json!({ "query": "launch", "spaceId": other })).await.as_array().unwrap().len(),
            1
        );
        assert_eq!(run(&state, "findTask", json!({ "query": "release" })).await.as_array().unwrap().len(), 1);

        let foreign = Identity::new("user_2", "org_2");
        let none = dispatch_tool(&state, Some(&foreign), "findTask", json!({ "query": "release" })).await.unwrap();
        assert!(none.as_array().unwrap().is_empty());

        let err = dispatch_tool(&state, Some(&me()), "findTask", json!({ "query": "  " })).await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_update_task_status_moves_to_column_end() {
        let state = AppState::in_memory().await.unwrap();
        let space = run(&state, "createSpace", json!({ "name": "S", "color": "bg-blue-500", "icon": "Folder" })).await;
        let list = run(&state, "createList", json!({ "spaceId": space, "name": "L" })).await;
        run(&state, "createTask", json!({ "listId": list, "title": "done", "status": "complete" })).await;
        let task = run(&state, "createTask", json!({ "listId": list, "title": "next" })).await;

        run(&state, "updateTask", json!({ "taskId": task, "status": "complete" })).await;
        let found = run(&state, "getTask", json!({ "taskId": task })).await;
        assert_eq!(found["status"], "complete");
        assert_eq!(found["sortOrder"], 1);

        let column = run(&state, "listTasks", json!({ "listId": list, "status": "complete" })).await;
        assert_eq!(column.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_tools_return_null_or_unauthorized() {
        let state = AppState::in_memory().await.unwrap();
        assert!(run(&state, "getList", json!({ "listId": 77 })).await.is_null());

        let space = run(&state, "createSpace", json!({ "name": "S", "color": "bg-blue-500", "icon": "Folder" })).await;
        let foreign = Identity::new("user_2", "org_2");
        let err = dispatch_tool(&state, Some(&foreign), "getSpace", json!({ "spaceId": space })).await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }
}
