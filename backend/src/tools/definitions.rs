use serde_json::{json, Value};

use crate::domain::SPACE_COLORS;

fn limit_schema() -> Value {
    json!({ "type": "integer", "minimum": 1, "maximum": 100, "description": "Max results (default: 50, max: 100)" })
}

fn status_schema() -> Value {
    json!({ "type": "string", "enum": ["todo", "in-progress", "complete"], "description": "'todo', 'in-progress', or 'complete'" })
}

fn priority_schema() -> Value {
    json!({ "type": "string", "enum": ["low", "normal", "high", "urgent"], "description": "'low', 'normal', 'high', or 'urgent'" })
}

fn color_schema() -> Value {
    json!({ "type": "string", "enum": SPACE_COLORS, "description": "Tailwind color class" })
}

fn id_schema(what: &str) -> Value {
    json!({ "type": "integer", "description": format!("{} ID", what) })
}

pub(crate) fn read_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "listSpaces",
            "description": "Get all spaces in the workspace",
            "inputSchema": {
                "type": "object",
                "properties": { "limit": limit_schema() }
            }
        }),
        json!({
            "name": "getSpace",
            "description": "Get space details by ID",
            "inputSchema": {
                "type": "object",
                "properties": { "spaceId": id_schema("Space") },
                "required": ["spaceId"]
            }
        }),
        json!({
            "name": "findSpaceByName",
            "description": "Find spaces by name (case-insensitive, partial matching)",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "minLength": 1, "description": "Space name to search" },
                    "limit": limit_schema()
                },
                "required": ["query"]
            }
        }),
        json!({
            "name": "listListsBySpace",
            "description": "Get all lists in a space",
            "inputSchema": {
                "type": "object",
                "properties": { "spaceId": id_schema("Space"), "limit": limit_schema() },
                "required": ["spaceId"]
            }
        }),
        json!({
            "name": "getList",
            "description": "Get list details by ID",
            "inputSchema": {
                "type": "object",
                "properties": { "listId": id_schema("List") },
                "required": ["listId"]
            }
        }),
        json!({
            "name": "findListByName",
            "description": "Find lists by name (case-insensitive, partial matching). Searches across all spaces if no spaceId is provided.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "minLength": 1, "description": "List name to search" },
                    "spaceId": { "type": "integer", "description": "Optional: Limit search to this specific space" },
                    "limit": limit_schema()
                },
                "required": ["query"]
            }
        }),
        json!({
            "name": "listTasks",
            "description": "Get tasks from a list",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "listId": id_schema("List"),
                    "status": status_schema(),
                    "limit": limit_schema()
                },
                "required": ["listId"]
            }
        }),
        json!({
            "name": "getTask",
            "description": "Get task details by ID",
            "inputSchema": {
                "type": "object",
                "properties": { "taskId": id_schema("Task") },
                "required": ["taskId"]
            }
        }),
        json!({
            "name": "findTask",
            "description": "Search tasks by title or description (case-insensitive, partial matching). Searches across all lists in the workspace if no listId is provided.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "minLength": 1, "description": "Text to search in task title or description" },
                    "listId": { "type": "integer", "description": "Optional: Limit search to this specific list" },
                    "limit": limit_schema()
                },
                "required": ["query"]
            }
        }),
    ]
}

pub(crate) fn write_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "createSpace",
            "description": "Create a new space",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "name": { "type": "string", "minLength": 1, "description": "Space name" },
                    "description": { "type": "string", "description": "Space description" },
                    "color": color_schema(),
                    "icon": { "type": "string", "minLength": 1, "description": "Lucide icon name (e.g., 'Folder', 'Rocket', 'Star')" }
                },
                "required": ["name", "color", "icon"]
            }
        }),
        json!({
            "name": "updateSpace",
            "description": "Update space properties",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "spaceId": id_schema("Space"),
                    "name": { "type": "string", "description": "New name" },
                    "description": { "type": "string", "description": "New description" },
                    "color": color_schema(),
                    "icon": { "type": "string", "description": "New icon" }
                },
                "required": ["spaceId"]
            }
        }),
        json!({
            "name": "createList",
            "description": "Create a new list in a space",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "spaceId": id_schema("Space"),
                    "name": { "type": "string", "minLength": 1, "description": "List name" }
                },
                "required": ["spaceId", "name"]
            }
        }),
        json!({
            "name": "updateList",
            "description": "Update list name or move to different space",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "listId": id_schema("List"),
                    "name": { "type": "string", "description": "New name" },
                    "spaceId": { "type": "integer", "description": "New space ID" }
                },
                "required": ["listId"]
            }
        }),
        json!({
            "name": "createTask",
            "description": "Create a new task in a list",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "listId": id_schema("List"),
                    "title": { "type": "string", "minLength": 1, "description": "Task title" },
                    "description": { "type": "string", "description": "Task description" },
                    "status": status_schema(),
                    "priority": priority_schema(),
                    "assigneeIds": { "type": "array", "items": { "type": "string" }, "description": "User IDs to assign" },
                    "startDate": { "type": "integer", "description": "Start date (Unix ms)" },
                    "dueDate": { "type": "integer", "description": "Due date (Unix ms)" }
                },
                "required": ["listId", "title"]
            }
        }),
        json!({
            "name": "updateTask",
            "description": "Update task properties",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "taskId": id_schema("Task"),
                    "title": { "type": "string", "description": "New title" },
                    "description": { "type": "string", "description": "New description" },
                    "status": status_schema(),
                    "priority": priority_schema(),
                    "assigneeIds": { "type": "array", "items": { "type": "string" }, "description": "New assignee IDs" },
                    "startDate": { "type": "integer", "description": "New start date (Unix ms)" },
                    "dueDate": { "type": "integer", "description": "New due date (Unix ms)" }
                },
                "required": ["taskId"]
            }
        }),
    ]
}
