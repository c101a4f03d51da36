//! Space Commands
//!
//! Client bindings for space-related backend commands.

use serde_json::Value;
use taskspace_lib::cascade::CascadeReport;
use taskspace_lib::commands::{CreateSpaceArgs, IdArgs, ListSpacesArgs, ReorderSpacesArgs, UpdateSpaceArgs};

use super::{decode, encode, Backend};
use crate::models::{DomainResult, Page, PageRequest, Space, SpaceWithLists};

pub async fn list_spaces<B: Backend + ?Sized>(backend: &B, page: Option<PageRequest>) -> DomainResult<Page<Space>> {
    let args = encode(&ListSpacesArgs { pagination_opts: page })?;
    decode(backend.invoke("spaces.list", args).await?)
}

/// Sidebar snapshot: spaces with their lists
pub async fn list_spaces_with_lists<B: Backend + ?Sized>(backend: &B) -> DomainResult<Vec<SpaceWithLists>> {
    decode(backend.invoke("spaces.listWithLists", Value::Null).await?)
}

pub async fn get_space<B: Backend + ?Sized>(backend: &B, id: u32) -> DomainResult<Option<Space>> {
    decode(backend.invoke("spaces.get", encode(&IdArgs { id })?).await?)
}

pub async fn create_space<B: Backend + ?Sized>(backend: &B, args: &CreateSpaceArgs) -> DomainResult<Space> {
    decode(backend.invoke("spaces.create", encode(args)?).await?)
}

pub async fn update_space<B: Backend + ?Sized>(backend: &B, args: &UpdateSpaceArgs) -> DomainResult<Space> {
    decode(backend.invoke("spaces.update", encode(args)?).await?)
}

/// Delete a space with its lists and tasks
pub async fn remove_space<B: Backend + ?Sized>(backend: &B, id: u32) -> DomainResult<CascadeReport> {
    decode(backend.invoke("spaces.remove", encode(&IdArgs { id })?).await?)
}

pub async fn reorder_spaces<B: Backend + ?Sized>(backend: &B, ordered_ids: Vec<u32>) -> DomainResult<()> {
    let args = encode(&ReorderSpacesArgs { ordered_ids })?;
    backend.invoke("spaces.reorder", args).await?;
    Ok(())
}
