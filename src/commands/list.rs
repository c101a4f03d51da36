//! List Commands

use taskspace_lib::cascade::CascadeReport;
use taskspace_lib::commands::{CreateListArgs, IdArgs, ListBySpaceArgs, ReorderListsArgs, UpdateListArgs};

use super::{decode, encode, Backend};
use crate::models::{DomainResult, List, Page, PageRequest};

pub async fn list_lists_by_space<B: Backend + ?Sized>(
    backend: &B,
    space_id: u32,
    page: Option<PageRequest>,
) -> DomainResult<Page<List>> {
    let args = encode(&ListBySpaceArgs {
        space_id,
        pagination_opts: page,
    })?;
    decode(backend.invoke("lists.listBySpace", args).await?)
}

pub async fn get_list<B: Backend + ?Sized>(backend: &B, id: u32) -> DomainResult<Option<List>> {
    decode(backend.invoke("lists.get", encode(&IdArgs { id })?).await?)
}

pub async fn create_list<B: Backend + ?Sized>(backend: &B, args: &CreateListArgs) -> DomainResult<List> {
    decode(backend.invoke("lists.create", encode(args)?).await?)
}

pub async fn update_list<B: Backend + ?Sized>(backend: &B, args: &UpdateListArgs) -> DomainResult<List> {
    decode(backend.invoke("lists.update", encode(args)?).await?)
}

pub async fn remove_list<B: Backend + ?Sized>(backend: &B, id: u32) -> DomainResult<CascadeReport> {
    decode(backend.invoke("lists.remove", encode(&IdArgs { id })?).await?)
}

/// Persist the list order of a space; lists named here move into it
pub async fn reorder_lists<B: Backend + ?Sized>(backend: &B, space_id: u32, ordered_ids: Vec<u32>) -> DomainResult<()> {
    let args = encode(&ReorderListsArgs { space_id, ordered_ids })?;
    backend.invoke("lists.reorder", args).await?;
    Ok(())
}
