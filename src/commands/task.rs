//! Task Commands

use taskspace_lib::commands::{
    CreateTaskArgs, IdArgs, ListByListArgs, ListByStatusArgs, ReorderTasksArgs, StartOnboardingArgs, UpdateTaskArgs,
    UpdateTaskStatusArgs,
};
use taskspace_lib::domain::Onboarding;

use super::{decode, encode, Backend};
use crate::models::{DomainResult, Page, PageRequest, Task, TaskStatus};

pub async fn list_tasks_by_list<B: Backend + ?Sized>(
    backend: &B,
    list_id: u32,
    page: Option<PageRequest>,
) -> DomainResult<Page<Task>> {
    let args = encode(&ListByListArgs {
        list_id,
        pagination_opts: page,
    })?;
    decode(backend.invoke("tasks.listByList", args).await?)
}

pub async fn list_tasks_by_list_and_status<B: Backend + ?Sized>(
    backend: &B,
    list_id: u32,
    status: TaskStatus,
    page: Option<PageRequest>,
) -> DomainResult<Page<Task>> {
    let args = encode(&ListByStatusArgs {
        list_id,
        status,
        pagination_opts: page,
    })?;
    decode(backend.invoke("tasks.listByListAndStatus", args).await?)
}

pub async fn get_task<B: Backend + ?Sized>(backend: &B, id: u32) -> DomainResult<Option<Task>> {
    decode(backend.invoke("tasks.get", encode(&IdArgs { id })?).await?)
}

pub async fn create_task<B: Backend + ?Sized>(backend: &B, args: &CreateTaskArgs) -> DomainResult<Task> {
    decode(backend.invoke("tasks.create", encode(args)?).await?)
}

pub async fn update_task<B: Backend + ?Sized>(backend: &B, args: &UpdateTaskArgs) -> DomainResult<Task> {
    decode(backend.invoke("tasks.update", encode(args)?).await?)
}

pub async fn update_task_status<B: Backend + ?Sized>(
    backend: &B,
    id: u32,
    status: TaskStatus,
    sort_order: i32,
) -> DomainResult<Task> {
    let args = encode(&UpdateTaskStatusArgs { id, status, sort_order })?;
    decode(backend.invoke("tasks.updateStatus", args).await?)
}

pub async fn remove_task<B: Backend + ?Sized>(backend: &B, id: u32) -> DomainResult<()> {
    backend.invoke("tasks.remove", encode(&IdArgs { id })?).await?;
    Ok(())
}

/// Persist one column; tasks from other columns take its status
pub async fn reorder_tasks<B: Backend + ?Sized>(
    backend: &B,
    list_id: u32,
    status: TaskStatus,
    ordered_ids: Vec<u32>,
) -> DomainResult<()> {
    let args = encode(&ReorderTasksArgs {
        list_id,
        status,
        ordered_ids,
    })?;
    backend.invoke("tasks.reorder", args).await?;
    Ok(())
}

pub async fn start_onboarding<B: Backend + ?Sized>(
    backend: &B,
    workspace_type: Option<String>,
    manage_type: Option<String>,
) -> DomainResult<Onboarding> {
    let args = encode(&StartOnboardingArgs {
        workspace_type,
        manage_type,
    })?;
    decode(backend.invoke("onboarding.start", args).await?)
}
