//! Commands for Space CRUD and ordering

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::auth::{resolve_tenant, Action, Identity};
use crate::cascade::{self, CascadeReport};
use crate::domain::{DomainResult, List, Page, PageRequest, Space, SpaceWithLists};
use crate::live::Topic;
use crate::repository::{OrderScope, OrderedRepository, Repository};
use crate::AppState;
use super::common::{required_text, IdArgs};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSpacesArgs {
    #[serde(default)]
    pub pagination_opts: Option<PageRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceArgs {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpaceArgs {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSpacesArgs {
    pub ordered_ids: Vec<u32>,
}

/// Spaces of the caller's organization, in order
pub async fn list_spaces(
    state: &AppState,
    identity: Option<&Identity>,
    args: ListSpacesArgs,
) -> DomainResult<Page<Space>> {
    let tenant = resolve_tenant(identity)?;
    let spaces = state.repos.spaces.list_by_organization(&tenant.organization_id).await?;
    Ok(Page::paginate(spaces, args.pagination_opts.as_ref()))
}

/// Sidebar view: every space with its lists, both in order
pub async fn list_spaces_with_lists(
    state: &AppState,
    identity: Option<&Identity>,
) -> DomainResult<Vec<SpaceWithLists>> {
    let tenant = resolve_tenant(identity)?;
    let spaces = state.repos.spaces.list_by_organization(&tenant.organization_id).await?;
    let lists = state.repos.lists.list_by_organization(&tenant.organization_id).await?;

    let mut by_space: BTreeMap<u32, Vec<List>> = BTreeMap::new();
    for list in lists {
        by_space.entry(list.space_id).or_default().push(list);
    }

    Ok(spaces
        .into_iter()
        .map(|space| {
            let lists = by_space.remove(&space.id).unwrap_or_default();
            SpaceWithLists { space, lists }
        })
        .collect())
}

pub async fn get_space(state: &AppState, identity: Option<&Identity>, args: IdArgs) -> DomainResult<Option<Space>> {
    let tenant = resolve_tenant(identity)?;
    match state.repos.spaces.find_by_id(args.id).await? {
        Some(space) => {
            tenant.authorize(&space, Action::Read)?;
            Ok(Some(space))
        }
        None => Ok(None),
    }
}

pub async fn create_space(state: &AppState, identity: Option<&Identity>, args: CreateSpaceArgs) -> DomainResult<Space> {
    let tenant = resolve_tenant(identity)?;

    let mut space = Space::new(&tenant.organization_id, required_text(&args.name, "Space name")?);
    space.description = args.description;
    if let Some(color) = args.color {
        space.color = color;
    }
    if let Some(icon) = args.icon {
        space.icon = icon;
    }

    let created = state.repos.spaces.create(&space).await?;
    log::info!(target: "taskspace.commands", "Created space {} for {}", created.id, tenant.organization_id);
    state.publish(&tenant, Topic::Spaces);
    Ok(created)
}

/// Partial update: only provided fields change
pub async fn update_space(state: &AppState, identity: Option<&Identity>, args: UpdateSpaceArgs) -> DomainResult<Space> {
    let tenant = resolve_tenant(identity)?;
    let existing = state.repos.spaces.find_by_id(args.id).await?;
    let mut space = tenant.authorize_found(existing, Action::Update)?;

    if let Some(name) = args.name {
        space.name = required_text(&name, "Space name")?;
    }
    if let Some(description) = args.description {
        space.description = Some(description);
    }
    if let Some(color) = args.color {
        space.color = color;
    }
    if let Some(icon) = args.icon {
        space.icon = icon;
    }

    let updated = state.repos.spaces.update(&space).await?;
    state.publish(&tenant, Topic::Spaces);
    Ok(updated)
}

/// Delete a space together with its lists and their tasks
pub async fn remove_space(state: &AppState, identity: Option<&Identity>, args: IdArgs) -> DomainResult<CascadeReport> {
    let tenant = resolve_tenant(identity)?;
    let existing = state.repos.spaces.find_by_id(args.id).await?;
    let space = tenant.authorize_found(existing, Action::Delete)?;

    let result = cascade::delete_space(&state.repos, space.id).await;

    // Partial deletes are visible too
    state.publish(&tenant, Topic::Spaces);
    state.publish(&tenant, Topic::Lists { space_id: space.id });
    if let Ok(report) = &result {
        for list_id in &report.list_ids {
            state.publish(&tenant, Topic::Tasks { list_id: *list_id });
        }
    }
    result
}

/// Persist the sidebar order of spaces
pub async fn reorder_spaces(state: &AppState, identity: Option<&Identity>, args: ReorderSpacesArgs) -> DomainResult<()> {
    let tenant = resolve_tenant(identity)?;
    for id in &args.ordered_ids {
        let existing = state.repos.spaces.find_by_id(*id).await?;
        tenant.authorize_found(existing, Action::Reorder)?;
    }

    let scope = OrderScope::Spaces {
        organization_id: tenant.organization_id.clone(),
    };
    state.repos.spaces.reorder(&scope, &args.ordered_ids).await?;
    log::debug!(target: "taskspace.commands", "Reordered {} spaces", args.ordered_ids.len());
    state.publish(&tenant, Topic::Spaces);
    Ok(())
}
