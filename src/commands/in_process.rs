//! In-process transport: calls the backend router directly

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use taskspace_lib::auth::{resolve_tenant, Identity};
use taskspace_lib::live::{Interest, LiveSubscription};
use taskspace_lib::AppState;

use super::Backend;
use crate::models::DomainResult;

/// Backend bound to one signed-in identity
#[derive(Clone)]
pub struct InProcessBackend {
    state: Arc<AppState>,
    identity: Option<Identity>,
}

impl InProcessBackend {
    pub fn new(state: Arc<AppState>, identity: Option<Identity>) -> Self {
        Self { state, identity }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Same state, different caller
    pub fn as_identity(&self, identity: Option<Identity>) -> Self {
        Self {
            state: Arc::clone(&self.state),
            identity,
        }
    }
}

#[async_trait]
impl Backend for InProcessBackend {
    async fn invoke(&self, name: &str, args: Value) -> DomainResult<Value> {
        taskspace_lib::commands::invoke(&self.state, self.identity.as_ref(), name, args).await
    }

    fn watch(&self, interest: Interest) -> DomainResult<LiveSubscription> {
        let tenant = resolve_tenant(self.identity.as_ref())?;
        Ok(self.state.live.subscribe(&tenant.organization_id, interest))
    }
}
