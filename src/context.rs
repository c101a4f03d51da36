//! Application Context
//!
//! UI toggle state kept in one container and changed only through
//! [`UiAction`]s: panels, open spaces, the selected AI context and notices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use taskspace_lib::tools::{scope_guidance, ToolScope};

use crate::models::SpaceWithLists;

/// What the Ask-AI panel is focused on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AiContext {
    #[default]
    All,
    #[serde(rename_all = "camelCase")]
    Space { space_id: u32, space_name: String },
    #[serde(rename_all = "camelCase")]
    List {
        space_id: u32,
        space_name: String,
        list_id: u32,
        list_name: String,
    },
}

impl AiContext {
    pub fn tool_scope(&self) -> ToolScope {
        match self {
            AiContext::All => ToolScope::Workspace,
            AiContext::Space { space_id, .. } => ToolScope::Space { space_id: *space_id },
            AiContext::List { space_id, list_id, .. } => ToolScope::List {
                space_id: Some(*space_id),
                list_id: *list_id,
            },
        }
    }

    pub fn label(&self) -> String {
        match self {
            AiContext::All => "All".to_string(),
            AiContext::Space { space_name, .. } => space_name.clone(),
            AiContext::List { space_name, list_name, .. } => format!("{} / {}", space_name, list_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the user, e.g. a failed save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    ToggleAskAi,
    SetAskAiOpen(bool),
    ToggleSidebar,
    ToggleSpace(u32),
    OpenSpace(u32),
    SelectSpace {
        space_id: u32,
        space_name: String,
    },
    SelectList {
        space_id: u32,
        space_name: String,
        list_id: u32,
        list_name: String,
    },
    ClearAiContext,
    DismissNotice(u64),
}

/// UI toggle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub ask_ai_open: bool,
    pub sidebar_open: bool,
    pub ai_context: AiContext,
    open_spaces: BTreeMap<u32, bool>,
    notices: Vec<Notice>,
    next_notice: u64,
    seeded: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            ask_ai_open: false,
            sidebar_open: true,
            ai_context: AiContext::All,
            open_spaces: BTreeMap::new(),
            notices: Vec::new(),
            next_notice: 1,
            seeded: false,
        }
    }
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open every space of the first snapshot; later snapshots change nothing
    pub fn seed(&mut self, snapshot: &[SpaceWithLists]) {
        if self.seeded {
            return;
        }
        for entry in snapshot {
            self.open_spaces.insert(entry.space.id, true);
        }
        self.seeded = true;
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn is_space_open(&self, space_id: u32) -> bool {
        self.open_spaces.get(&space_id).copied().unwrap_or(false)
    }

    pub fn dispatch(&mut self, action: UiAction) {
        match action {
            UiAction::ToggleAskAi => self.ask_ai_open = !self.ask_ai_open,
            UiAction::SetAskAiOpen(open) => self.ask_ai_open = open,
            UiAction::ToggleSidebar => self.sidebar_open = !self.sidebar_open,
            UiAction::ToggleSpace(id) => {
                let open = self.is_space_open(id);
                self.open_spaces.insert(id, !open);
            }
            UiAction::OpenSpace(id) => {
                self.open_spaces.insert(id, true);
            }
            UiAction::SelectSpace { space_id, space_name } => {
                let already = matches!(&self.ai_context, AiContext::Space { space_id: current, .. } if *current == space_id);
                self.ai_context = if already {
                    AiContext::All
                } else {
                    AiContext::Space { space_id, space_name }
                };
            }
            UiAction::SelectList {
                space_id,
                space_name,
                list_id,
                list_name,
            } => {
                let already = matches!(&self.ai_context, AiContext::List { list_id: current, .. } if *current == list_id);
                self.ai_context = if already {
                    AiContext::Space { space_id, space_name }
                } else {
                    AiContext::List {
                        space_id,
                        space_name,
                        list_id,
                        list_name,
                    }
                };
            }
            UiAction::ClearAiContext => self.ai_context = AiContext::All,
            UiAction::DismissNotice(id) => self.notices.retain(|n| n.id != id),
        }
    }

    /// Workspace-context preamble for the agent
    pub fn ai_guidance(&self) -> String {
        scope_guidance(&self.ai_context.tool_scope())
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let id = self.next_notice;
        self.next_notice += 1;
        self.notices.push(Notice {
            id,
            level,
            message: message.into(),
        });
        id
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}
