//! Named command router
//!
//! Maps `"spaces.reorder"`-style names with camelCase JSON arguments onto the
//! typed command functions.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::auth::Identity;
use crate::domain::{DomainError, DomainResult};
use crate::AppState;
use super::{list_cmd, onboarding_cmd, space_cmd, task_cmd};

pub const COMMAND_NAMES: &[&str] = &[
    "spaces.list",
    "spaces.listWithLists",
    "spaces.get",
    "spaces.create",
    "spaces.update",
    "spaces.remove",
    "spaces.reorder",
    "lists.listBySpace",
    "lists.get",
    "lists.create",
    "lists.update",
    "lists.remove",
    "lists.reorder",
    "tasks.listByList",
    "tasks.listByListAndStatus",
    "tasks.listAll",
    "tasks.get",
    "tasks.create",
    "tasks.update",
    "tasks.updateStatus",
    "tasks.remove",
    "tasks.reorder",
    "onboarding.start",
];

fn parse<T: DeserializeOwned>(args: Value) -> DomainResult<T> {
    let args = if args.is_null() { Value::Object(Default::default()) } else { args };
    serde_json::from_value(args).map_err(|e| DomainError::BadRequest(format!("Invalid arguments: {}", e)))
}

fn respond<T: Serialize>(result: DomainResult<T>) -> DomainResult<Value> {
    let value = result?;
    serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}

pub async fn invoke(state: &AppState, identity: Option<&Identity>, name: &str, args: Value) -> DomainResult<Value> {
    log::debug!(target: "taskspace.commands", "invoke {}", name);

    let result = match name {
        "spaces.list" => respond(space_cmd::list_spaces(state, identity, parse(args)?).await),
        "spaces.listWithLists" => respond(space_cmd::list_spaces_with_lists(state, identity).await),
        "spaces.get" => respond(space_cmd::get_space(state, identity, parse(args)?).await),
        "spaces.create" => respond(space_cmd::create_space(state, identity, parse(args)?).await),
        "spaces.update" => respond(space_cmd::update_space(state, identity, parse(args)?).await),
        "spaces.remove" => respond(space_cmd::remove_space(state, identity, parse(args)?).await),
        "spaces.reorder" => respond(space_cmd::reorder_spaces(state, identity, parse(args)?).await),

        "lists.listBySpace" => respond(list_cmd::list_lists_by_space(state, identity, parse(args)?).await),
        "lists.get" => respond(list_cmd::get_list(state, identity, parse(args)?).await),
        "lists.create" => respond(list_cmd::create_list(state, identity, parse(args)?).await),
        "lists.update" => respond(list_cmd::update_list(state, identity, parse(args)?).await),
        "lists.remove" => respond(list_cmd::remove_list(state, identity, parse(args)?).await),
        "lists.reorder" => respond(list_cmd::reorder_lists(state, identity, parse(args)?).await),

        "tasks.listByList" => respond(task_cmd::list_tasks_by_list(state, identity, parse(args)?).await),
        "tasks.listByListAndStatus" => {
            respond(task_cmd::list_tasks_by_list_and_status(state, identity, parse(args)?).await)
        }
        "tasks.listAll" => respond(task_cmd::list_all_tasks(state, identity).await),
        "tasks.get" => respond(task_cmd::get_task(state, identity, parse(args)?).await),
        "tasks.create" => respond(task_cmd::create_task(state, identity, parse(args)?).await),
        "tasks.update" => respond(task_cmd::update_task(state, identity, parse(args)?).await),
        "tasks.updateStatus" => respond(task_cmd::update_task_status(state, identity, parse(args)?).await),
        "tasks.remove" => respond(task_cmd::remove_task(state, identity, parse(args)?).await),
        "tasks.reorder" => respond(task_cmd::reorder_tasks(state, identity, parse(args)?).await),

        "onboarding.start" => respond(onboarding_cmd::start_onboarding(state, identity, parse(args)?).await),

        other => Err(DomainError::BadRequest(format!("Unknown command: {}", other))),
    };

    if let Err(e) = &result {
        log::warn!(target: "taskspace.commands", "{} failed: {}", name, e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alice() -> Identity {
        Identity::new("user_alice", "org_a")
    }

    fn mallory() -> Identity {
        Identity::new("user_mallory", "org_m")
    }

    async fn call(state: &AppState, identity: &Identity, name: &str, args: Value) -> Value {
        invoke(state, Some(identity), name, args).await.unwrap_or_else(|e| panic!("{} failed: {}", name, e))
    }

    fn ids(page: &Value) -> Vec<u64> {
        page["page"].as_array().unwrap().iter().map(|v| v["id"].as_u64().unwrap()).collect()
    }

    #[tokio::test]
    async fn every_listed_command_is_routed() {
        let state = AppState::in_memory().await.unwrap();
        for name in COMMAND_NAMES {
            let err = invoke(&state, None, name, json!({})).await.unwrap_err();
            assert!(
                !err.to_string().contains("Unknown command"),
                "{} is listed but not routed",
                name
            );
        }
        let err = invoke(&state, None, "spaces.explode", Value::Null).await.unwrap_err();
        assert_eq!(err, DomainError::BadRequest("Unknown command: spaces.explode".to_string()));
    }

    #[tokio::test]
    async fn test_missing_identity_and_missing_org() {
        let state = AppState::in_memory().await.unwrap();
        let err = invoke(&state, None, "spaces.listWithLists", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");

        let orphan = Identity { subject: "user".to_string(), org_id: None };
        let err = invoke(&state, Some(&orphan), "spaces.listWithLists", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_reorder_lists_through_router() {
        let state = AppState::in_memory().await.unwrap();
        let me = alice();
        let space = call(&state, &me, "spaces.create", json!({ "name": "S" })).await;
        let sid = space["id"].clone();
        let l1 = call(&state, &me, "lists.create", json!({ "spaceId": sid, "name": "L1" })).await;
        let l2 = call(&state, &me, "lists.create", json!({ "spaceId": sid, "name": "L2" })).await;
        let l3 = call(&state, &me, "lists.create", json!({ "spaceId": sid, "name": "L3" })).await;

        call(
            &state,
            &me,
            "lists.reorder",
            json!({ "spaceId": sid, "orderedIds": [l3["id"], l1["id"], l2["id"]] }),
        )
        .await;

        let page = call(&state, &me, "lists.listBySpace", json!({ "spaceId": sid })).await;
        let expected: Vec<u64> = [&l3, &l1, &l2].iter().map(|l| l["id"].as_u64().unwrap()).collect();
        assert_eq!(ids(&page), expected);
        let orders: Vec<i64> = page["page"].as_array().unwrap().iter().map(|l| l["sortOrder"].as_i64().unwrap()).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(page["isDone"], true);
    }

    #[tokio::test]
    async fn test_cross_tenant_access_is_unauthorized() {
        let state = AppState::in_memory().await.unwrap();
        let space = call(&state, &alice(), "spaces.create", json!({ "name": "Private" })).await;
        let id = space["id"].clone();

        for (name, args) in [
            ("spaces.get", json!({ "id": id })),
            ("spaces.update", json!({ "id": id, "name": "Pwned" })),
            ("spaces.remove", json!({ "id": id })),
            ("spaces.reorder", json!({ "orderedIds": [id] })),
            ("lists.create", json!({ "spaceId": id, "name": "Intruder" })),
        ] {
            let err = invoke(&state, Some(&mallory()), name, args).await.unwrap_err();
            assert_eq!(err.code(), "UNAUTHORIZED", "{}", name);
        }

        let still = call(&state, &alice(), "spaces.get", json!({ "id": id })).await;
        assert_eq!(still["name"], "Private");
    }

    #[tokio::test]
    async fn test_get_missing_returns_null_and_update_missing_is_not_found() {
        let state = AppState::in_memory().await.unwrap();
        let value = call(&state, &alice(), "tasks.get", json!({ "id": 404 })).await;
        assert!(value.is_null());

        let err = invoke(&state, Some(&alice()), "spaces.update", json!({ "id": 404, "name": "x" })).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound("Space not found".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_status_is_bad_request() {
        let state = AppState::in_memory().await.unwrap();
        let err = invoke(
            &state,
            Some(&alice()),
            "tasks.reorder",
            json!({ "listId": 1, "status": "doing", "orderedIds": [] }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let state = AppState::in_memory().await.unwrap();
        let me = alice();
        let space = call(
            &state,
            &me,
            "spaces.create",
            json!({ "name": "Design", "description": "UI work", "color": "bg-sky-500", "icon": "Star" }),
        )
        .await;

        let updated = call(&state, &me, "spaces.update", json!({ "id": space["id"], "name": "Design System" })).await;
        assert_eq!(updated["name"], "Design System");
        assert_eq!(updated["description"], "UI work");
        assert_eq!(updated["color"], "bg-sky-500");
        assert_eq!(updated["icon"], "Star");
    }

    #[tokio::test]
    async fn test_list_moves_to_end_of_new_space() {
        let state = AppState::in_memory().await.unwrap();
        let me = alice();
        let a = call(&state, &me, "spaces.create", json!({ "name": "A" })).await;
        let b = call(&state, &me, "spaces.create", json!({ "name": "B" })).await;
        call(&state, &me, "lists.create", json!({ "spaceId": b["id"], "name": "B1" })).await;
        let mover = call(&state, &me, "lists.create", json!({ "spaceId": a["id"], "name": "A1" })).await;

        let moved = call(&state, &me, "lists.update", json!({ "id": mover["id"], "spaceId": b["id"] })).await;
        assert_eq!(moved["spaceId"], b["id"]);
        assert_eq!(moved["sortOrder"], 1);

        let sidebar = call(&state, &me, "spaces.listWithLists", Value::Null).await;
        let sidebar = sidebar.as_array().unwrap();
        assert_eq!(sidebar[0]["lists"].as_array().unwrap().len(), 0);
        assert_eq!(sidebar[1]["lists"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_list_removes_its_tasks() {
        let state = AppState::in_memory().await.unwrap();
        let me = alice();
        let space = call(&state, &me, "spaces.create", json!({ "name": "S" })).await;
        let list = call(&state, &me, "lists.create", json!({ "spaceId": space["id"], "name": "L" })).await;
        let t1 = call(&state, &me, "tasks.create", json!({ "listId": list["id"], "title": "T1" })).await;
        let t2 = call(&state, &me, "tasks.create", json!({ "listId": list["id"], "title": "T2" })).await;

        let report = call(&state, &me, "lists.remove", json!({ "id": list["id"] })).await;
        assert_eq!(report["taskCount"], 2);

        assert!(call(&state, &me, "tasks.get", json!({ "id": t1["id"] })).await.is_null());
        assert!(call(&state, &me, "tasks.get", json!({ "id": t2["id"] })).await.is_null());
        let remaining = call(&state, &me, "lists.listBySpace", json!({ "spaceId": space["id"] })).await;
        assert!(ids(&remaining).is_empty());
    }

    #[tokio::test]
    async fn test_paginated_columns() {
        let state = AppState::in_memory().await.unwrap();
        let me = alice();
        let space = call(&state, &me, "spaces.create", json!({ "name": "S" })).await;
        let list = call(&state, &me, "lists.create", json!({ "spaceId": space["id"], "name": "L" })).await;
        for n in 0..5 {
            call(&state, &me, "tasks.create", json!({ "listId": list["id"], "title": format!("t{}", n) })).await;
        }
        call(&state, &me, "tasks.create", json!({ "listId": list["id"], "title": "done", "status": "complete" })).await;

        let first = call(
            &state,
            &me,
            "tasks.listByListAndStatus",
            json!({ "listId": list["id"], "status": "todo", "paginationOpts": { "numItems": 3 } }),
        )
        .await;
        assert_eq!(ids(&first).len(), 3);
        assert_eq!(first["isDone"], false);

        let rest = call(
            &state,
            &me,
            "tasks.listByListAndStatus",
            json!({
                "listId": list["id"],
                "status": "todo",
                "paginationOpts": { "numItems": 3, "cursor": first["continueCursor"] }
            }),
        )
        .await;
        assert_eq!(ids(&rest).len(), 2);
        assert_eq!(rest["isDone"], true);
    }

    #[tokio::test]
    async fn test_status_change_via_update_goes_to_column_end() {
        let state = AppState::in_memory().await.unwrap();
        let me = alice();
        let space = call(&state, &me, "spaces.create", json!({ "name": "S" })).await;
        let list = call(&state, &me, "lists.create", json!({ "spaceId": space["id"], "name": "L" })).await;
        call(&state, &me, "tasks.create", json!({ "listId": list["id"], "title": "a", "status": "complete" })).await;
        call(&state, &me, "tasks.create", json!({ "listId": list["id"], "title": "b", "status": "complete" })).await;
        let task = call(&state, &me, "tasks.create", json!({ "listId": list["id"], "title": "c" })).await;

        let moved = call(&state, &me, "tasks.update", json!({ "id": task["id"], "status": "complete" })).await;
        assert_eq!(moved["status"], "complete");
        assert_eq!(moved["sortOrder"], 2);

        let explicit = call(
            &state,
            &me,
            "tasks.updateStatus",
            json!({ "id": task["id"], "status": "in-progress", "sortOrder": 0 }),
        )
        .await;
        assert_eq!(explicit["status"], "in-progress");
        assert_eq!(explicit["sortOrder"], 0);
    }

    #[tokio::test]
    async fn test_mutations_publish_change_events() {
        let state = AppState::in_memory().await.unwrap();
        let me = alice();
        let mut sidebar = state.live.subscribe("org_a", crate::live::Interest::Sidebar);
        call(&state, &me, "spaces.create", json!({ "name": "S" })).await;
        assert!(sidebar.has_pending());

        call(&state, &me, "onboarding.start", json!({ "workspaceType": "team" })).await;
        assert!(!sidebar.has_pending());
    }
}
