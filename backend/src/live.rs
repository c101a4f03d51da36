//! Live change hub
//!
//! Every committed mutation publishes a [`ChangeEvent`]. Subscribers wait on
//! [`LiveSubscription::changed`] and re-run their query when it resolves.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::{DomainError, DomainResult};

/// What part of an organization's data changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Topic {
    Spaces,
    #[serde(rename_all = "camelCase")]
    Lists { space_id: u32 },
    #[serde(rename_all = "camelCase")]
    Tasks { list_id: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub organization_id: String,
    pub topic: Topic,
    /// Monotonic per hub
    pub revision: u64,
}

/// Which events a subscription cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    /// Spaces and lists (the sidebar query)
    Sidebar,
    /// Tasks of one list (the board query)
    Board { list_id: u32 },
    Everything,
}

impl Interest {
    fn wants(&self, topic: &Topic) -> bool {
        match (self, topic) {
            (Interest::Everything, _) => true,
            (Interest::Sidebar, Topic::Spaces | Topic::Lists { .. }) => true,
            (Interest::Board { list_id }, Topic::Tasks { list_id: changed }) => list_id == changed,
            _ => false,
        }
    }
}

pub struct LiveHub {
    tx: broadcast::Sender<ChangeEvent>,
    revision: AtomicU64,
}

impl LiveHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            revision: AtomicU64::new(0),
        }
    }

    /// Publish a change; returns the assigned revision
    pub fn publish(&self, organization_id: &str, topic: Topic) -> u64 {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!(target: "taskspace.live", "publish r{} {:?} for {}", revision, topic, organization_id);
        // No receivers is fine: nobody is watching yet
        let _ = self.tx.send(ChangeEvent {
            organization_id: organization_id.to_string(),
            topic,
            revision,
        });
        revision
    }

    pub fn subscribe(&self, organization_id: &str, interest: Interest) -> LiveSubscription {
        LiveSubscription {
            rx: self.tx.subscribe(),
            organization_id: organization_id.to_string(),
            interest,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

pub struct LiveSubscription {
    rx: broadcast::Receiver<ChangeEvent>,
    organization_id: String,
    interest: Interest,
}

impl LiveSubscription {
    /// Wait for the next event relevant to this subscription.
    ///
    /// A lagged receiver reports a synthetic event so the caller re-reads.
    pub async fn changed(&mut self) -> DomainResult<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if event.organization_id == self.organization_id && self.interest.wants(&event.topic) {
                        return Ok(event);
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    log::warn!(target: "taskspace.live", "Subscription lagged by {} events", n);
                    return Ok(ChangeEvent {
                        organization_id: self.organization_id.clone(),
                        topic: Topic::Spaces,
                        revision: 0,
                    });
                }
                Err(RecvError::Closed) => {
                    return Err(DomainError::Internal("Live hub closed".to_string()));
                }
            }
        }
    }

    /// Non-blocking drain: true when at least one relevant event is queued
    pub fn has_pending(&mut self) -> bool {
        let mut relevant = false;
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if event.organization_id == self.organization_id && self.interest.wants(&event.topic) {
                        relevant = true;
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => relevant = true,
                Err(_) => return relevant,
            }
        }
    }
}
