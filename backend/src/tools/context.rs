//! Workspace-context preamble handed to the chat agent

use serde::{Deserialize, Serialize};

/// What part of the workspace the assistant should act on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ToolScope {
    #[default]
    Workspace,
    #[serde(rename_all = "camelCase")]
    Space { space_id: u32 },
    #[serde(rename_all = "camelCase")]
    List { space_id: Option<u32>, list_id: u32 },
}

pub fn scope_guidance(scope: &ToolScope) -> String {
    let (space_id, list_id) = match scope {
        ToolScope::Workspace => {
            return [
                "WORKSPACE CONTEXT:",
                "Scope: Entire workspace",
                "",
                "IMPORTANT:",
                "1. Ask clarifying questions to identify which space or list the user means.",
                "2. Once identified, focus actions on that scope.",
            ]
            .join("\n");
        }
        ToolScope::Space { space_id } => (Some(*space_id), None),
        ToolScope::List { space_id, list_id } => (*space_id, Some(*list_id)),
    };

    let target = match (space_id, list_id) {
        (Some(_), Some(_)) => "space and list",
        (None, Some(_)) => "list",
        _ => "space",
    };

    let mut lines = vec!["WORKSPACE CONTEXT:".to_string()];
    if let Some(id) = space_id {
        lines.push(format!("Space ID: {}", id));
    }
    if let Some(id) = list_id {
        lines.push(format!("List ID: {}", id));
    }
    lines.push(String::new());
    lines.push("IMPORTANT:".to_string());
    lines.push("1. Use the provided ID(s) directly when calling tools.".to_string());
    lines.push(format!(
        "2. Keep actions scoped to the specified {} unless explicitly asked otherwise.",
        target
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_scope_asks_for_clarification() {
        let text = scope_guidance(&ToolScope::Workspace);
        assert!(text.contains("Scope: Entire workspace"));
        assert!(text.contains("clarifying questions"));
    }

    #[test]
    fn test_list_scope_names_both_ids() {
        let text = scope_guidance(&ToolScope::List { space_id: Some(4), list_id: 9 });
        assert!(text.contains("Space ID: 4"));
        assert!(text.contains("List ID: 9"));
        assert!(text.ends_with("specified space and list unless explicitly asked otherwise."));

        let space_only = scope_guidance(&ToolScope::Space { space_id: 4 });
        assert!(!space_only.contains("List ID"));
        assert!(space_only.contains("specified space unless"));
    }
}
