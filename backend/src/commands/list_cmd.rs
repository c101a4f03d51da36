//! Commands for List CRUD, ordering and moves between spaces

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::auth::{resolve_tenant, Action, Identity};
use crate::cascade::{self, CascadeReport};
use crate::domain::{DomainResult, List, Page, PageRequest};
use crate::live::Topic;
use crate::repository::{OrderScope, OrderedRepository, Repository};
use crate::AppState;
use super::common::{required_text, IdArgs};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBySpaceArgs {
    pub space_id: u32,
    #[serde(default)]
    pub pagination_opts: Option<PageRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListArgs {
    pub space_id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListArgs {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Moves the list to the end of another space
    #[serde(default)]
    pub space_id: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderListsArgs {
    pub space_id: u32,
    pub ordered_ids: Vec<u32>,
}

pub async fn list_lists_by_space(
    state: &AppState,
    identity: Option<&Identity>,
    args: ListBySpaceArgs,
) -> DomainResult<Page<List>> {
    let tenant = resolve_tenant(identity)?;
    let existing = state.repos.spaces.find_by_id(args.space_id).await?;
    tenant.authorize_found(existing, Action::Read)?;

    let lists = state.repos.lists.list_by_space(args.space_id).await?;
    Ok(Page::paginate(lists, args.pagination_opts.as_ref()))
}

pub async fn get_list(state: &AppState, identity: Option<&Identity>, args: IdArgs) -> DomainResult<Option<List>> {
    let tenant = resolve_tenant(identity)?;
    match state.repos.lists.find_by_id(args.id).await? {
        Some(list) => {
            tenant.authorize(&list, Action::Read)?;
            Ok(Some(list))
        }
        None => Ok(None),
    }
}

pub async fn create_list(state: &AppState, identity: Option<&Identity>, args: CreateListArgs) -> DomainResult<List> {
    let tenant = resolve_tenant(identity)?;
    let existing = state.repos.spaces.find_by_id(args.space_id).await?;
    let space = tenant.authorize_found(existing, Action::Update)?;

    let mut list = List::new(&tenant.organization_id, space.id, required_text(&args.name, "List name")?);
    list.description = args.description;
    list.color = args.color;

    let created = state.repos.lists.create(&list).await?;
    log::info!(target: "taskspace.commands", "Created list {} in space {}", created.id, space.id);
    state.publish(&tenant, Topic::Lists { space_id: space.id });
    Ok(created)
}

/// Partial update; a new `space_id` re-parents the list to the end of that space
pub async fn update_list(state: &AppState, identity: Option<&Identity>, args: UpdateListArgs) -> DomainResult<List> {
    let tenant = resolve_tenant(identity)?;
    let existing = state.repos.lists.find_by_id(args.id).await?;
    let mut list = tenant.authorize_found(existing, Action::Update)?;
    let previous_space = list.space_id;

    if let Some(name) = args.name {
        list.name = required_text(&name, "List name")?;
    }
    if let Some(description) = args.description {
        list.description = Some(description);
    }
    if let Some(color) = args.color {
        list.color = Some(color);
    }
    if let Some(space_id) = args.space_id.filter(|id| *id != previous_space) {
        let target = state.repos.spaces.find_by_id(space_id).await?;
        tenant.authorize_found(target, Action::Update)?;
        list.space_id = space_id;
        list.sort_order = state.repos.lists.next_sort_order(&OrderScope::Lists { space_id }).await?;
    }

    let updated = state.repos.lists.update(&list).await?;
    state.publish(&tenant, Topic::Lists { space_id: previous_space });
    if updated.space_id != previous_space {
        log::info!(target: "taskspace.commands", "Moved list {} from space {} to {}", updated.id, previous_space, updated.space_id);
        state.publish(&tenant, Topic::Lists { space_id: updated.space_id });
    }
    Ok(updated)
}

/// Delete a list together with its tasks
pub async fn remove_list(state: &AppState, identity: Option<&Identity>, args: IdArgs) -> DomainResult<CascadeReport> {
    let tenant = resolve_tenant(identity)?;
    let existing = state.repos.lists.find_by_id(args.id).await?;
    let list = tenant.authorize_found(existing, Action::Delete)?;

    let result = cascade::delete_list(&state.repos, list.id).await;
    state.publish(&tenant, Topic::Lists { space_id: list.space_id });
    state.publish(&tenant, Topic::Tasks { list_id: list.id });
    result
}

/// Persist the order of lists in a space; lists from other spaces move into it
pub async fn reorder_lists(state: &AppState, identity: Option<&Identity>, args: ReorderListsArgs) -> DomainResult<()> {
    let tenant = resolve_tenant(identity)?;
    let target = state.repos.spaces.find_by_id(args.space_id).await?;
    tenant.authorize_found(target, Action::Reorder)?;

    let mut touched_spaces = BTreeSet::from([args.space_id]);
    for id in &args.ordered_ids {
        let existing = state.repos.lists.find_by_id(*id).await?;
        let list = tenant.authorize_found(existing, Action::Reorder)?;
        touched_spaces.insert(list.space_id);
    }

    let scope = OrderScope::Lists { space_id: args.space_id };
    state.repos.lists.reorder(&scope, &args.ordered_ids).await?;
    log::debug!(target: "taskspace.commands", "Reordered {} lists in space {}", args.ordered_ids.len(), args.space_id);

    for space_id in touched_spaces {
        state.publish(&tenant, Topic::Lists { space_id });
    }
    Ok(())
}
