//! Onboarding answers recorded once per organization

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Onboarding {
    pub id: u32,
    pub organization_id: String,
    pub workspace_type: Option<String>,
    pub manage_type: Option<String>,
}
