//! List Entity
//!
//! Lists live inside a space and hold tasks. A list may move to another space.

use serde::{Deserialize, Serialize};
use super::entity::{Entity, TenantOwned};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: u32,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    /// Owning space (mutable)
    pub space_id: u32,
    pub organization_id: String,
    /// Position within the owning space
    pub sort_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl List {
    pub fn new(organization_id: &str, space_id: u32, name: String) -> Self {
        Self {
            id: 0,
            name,
            description: None,
            color: None,
            space_id,
            organization_id: organization_id.to_string(),
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }
}

impl Entity for List {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TenantOwned for List {
    const KIND: &'static str = "list";

    fn organization_id(&self) -> &str {
        &self.organization_id
    }
}
