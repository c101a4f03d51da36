//! Space Entity
//!
//! Root container of the hierarchy. Spaces are ordered within an organization.

use serde::{Deserialize, Serialize};
use super::entity::{Entity, TenantOwned};
use super::list::List;

/// Palette accepted for space colors (Tailwind background classes)
pub const SPACE_COLORS: [&str; 14] = [
    "bg-violet-500", "bg-indigo-500", "bg-blue-500", "bg-sky-500",
    "bg-teal-500", "bg-emerald-500", "bg-green-500", "bg-amber-500",
    "bg-orange-500", "bg-red-500", "bg-rose-500", "bg-pink-500",
    "bg-fuchsia-500", "bg-stone-500",
];

pub const DEFAULT_SPACE_COLOR: &str = "bg-violet-500";
pub const DEFAULT_SPACE_ICON: &str = "Folder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: u32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub organization_id: String,
    /// Position within the organization
    pub sort_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Space {
    /// Create an unsaved space; id, sort order and timestamps are assigned on insert
    pub fn new(organization_id: &str, name: String) -> Self {
        Self {
            id: 0,
            name,
            description: None,
            color: DEFAULT_SPACE_COLOR.to_string(),
            icon: DEFAULT_SPACE_ICON.to_string(),
            organization_id: organization_id.to_string(),
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn is_known_color(color: &str) -> bool {
        SPACE_COLORS.contains(&color)
    }
}

impl Entity for Space {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TenantOwned for Space {
    const KIND: &'static str = "space";

    fn organization_id(&self) -> &str {
        &self.organization_id
    }
}

/// A space together with its lists, both in display order (sidebar view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceWithLists {
    #[serde(flatten)]
    pub space: Space,
    pub lists: Vec<List>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_creation() {
        let space = Space::new("org_1", "Engineering".to_string());
        assert_eq!(space.id(), 0);
        assert_eq!(space.color, DEFAULT_SPACE_COLOR);
        assert_eq!(space.icon, "Folder");
        assert_eq!(space.organization_id(), "org_1");
    }

    #[test]
    fn test_space_serializes_camel_case() {
        let space = Space::new("org_1", "Ops".to_string());
        let json = serde_json::to_value(&space).unwrap();
        assert!(json.get("sortOrder").is_some());
        assert!(json.get("organizationId").is_some());
    }

    #[test]
    fn test_palette() {
        assert!(Space::is_known_color("bg-teal-500"));
        assert!(!Space::is_known_color("#ff0000"));
    }
}
