//! Tenant resolution and the single capability check
//!
//! Every command resolves the caller's tenant first and then runs each entity
//! it touches through [`Tenant::authorize`].

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult, TenantOwned};

/// Authenticated caller as handed over by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub subject: String,
    #[serde(default)]
    pub org_id: Option<String>,
}

impl Identity {
    pub fn new(subject: &str, org_id: &str) -> Self {
        Self {
            subject: subject.to_string(),
            org_id: Some(org_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
    Reorder,
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Action::Read => "view",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Reorder => "reorder",
        }
    }
}

/// Resolved tenant of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub organization_id: String,
    pub user_id: String,
}

pub fn resolve_tenant(identity: Option<&Identity>) -> DomainResult<Tenant> {
    let identity = identity.ok_or_else(|| DomainError::Unauthorized("Identity not found".to_string()))?;
    let organization_id = identity
        .org_id
        .as_ref()
        .filter(|org| !org.is_empty())
        .ok_or_else(|| DomainError::NotFound("Organization not found".to_string()))?;

    Ok(Tenant {
        organization_id: organization_id.clone(),
        user_id: identity.subject.clone(),
    })
}

fn capitalized(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Tenant {
    pub fn authorize<T: TenantOwned>(&self, entity: &T, action: Action) -> DomainResult<()> {
        if entity.organization_id() == self.organization_id {
            Ok(())
        } else {
            log::warn!(
                target: "taskspace.auth",
                "Denied {} on {} for {}",
                action.verb(),
                T::KIND,
                self.organization_id
            );
            Err(DomainError::Unauthorized(format!(
                "You are not authorized to {} this {}",
                action.verb(),
                T::KIND
            )))
        }
    }

    /// `NotFound` for a missing row, then the capability check
    pub fn authorize_found<T: TenantOwned>(&self, entity: Option<T>, action: Action) -> DomainResult<T> {
        let entity = entity.ok_or_else(|| DomainError::NotFound(format!("{} not found", capitalized(T::KIND))))?;
        self.authorize(&entity, action)?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Space;

    #[test]
    fn test_resolve_tenant() {
        assert!(matches!(resolve_tenant(None), Err(DomainError::Unauthorized(_))));

        let orphan = Identity { subject: "user_1".to_string(), org_id: None };
        assert!(matches!(resolve_tenant(Some(&orphan)), Err(DomainError::NotFound(_))));

        let tenant = resolve_tenant(Some(&Identity::new("user_1", "org_1"))).unwrap();
        assert_eq!(tenant.organization_id, "org_1");
        assert_eq!(tenant.user_id, "user_1");
    }

    #[test]
    fn test_authorize_messages() {
        let tenant = resolve_tenant(Some(&Identity::new("user_1", "org_1"))).unwrap();
        let foreign = Space::new("org_2", "Theirs".to_string());

        let err = tenant.authorize(&foreign, Action::Update).unwrap_err();
        assert_eq!(
            err,
            DomainError::Unauthorized("You are not authorized to update this space".to_string())
        );

        let missing = tenant.authorize_found::<Space>(None, Action::Read).unwrap_err();
        assert_eq!(missing, DomainError::NotFound("Space not found".to_string()));

        let own = Space::new("org_1", "Mine".to_string());
        assert!(tenant.authorize_found(Some(own), Action::Delete).is_ok());
    }
}
