//! Onboarding command

use serde::{Deserialize, Serialize};

use crate::auth::{resolve_tenant, Identity};
use crate::domain::{DomainResult, Onboarding};
use crate::AppState;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOnboardingArgs {
    #[serde(default)]
    pub workspace_type: Option<String>,
    #[serde(default)]
    pub manage_type: Option<String>,
}

/// Record the organization's onboarding answers
pub async fn start_onboarding(
    state: &AppState,
    identity: Option<&Identity>,
    args: StartOnboardingArgs,
) -> DomainResult<Onboarding> {
    let tenant = resolve_tenant(identity)?;
    let record = state
        .repos
        .onboarding
        .upsert(
            &tenant.organization_id,
            args.workspace_type.as_deref(),
            args.manage_type.as_deref(),
        )
        .await?;
    log::info!(target: "taskspace.commands", "Onboarding recorded for {}", tenant.organization_id);
    Ok(record)
}
