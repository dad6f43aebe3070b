//! Tenant context resolution.
//!
//! Maps an authenticated identity record to a [`TenantContext`], verifying
//! that every company and team it references still exists and is active.
//! Resolution is all-or-nothing: any dangling reference yields
//! [`ScopeError::TenantInvalid`] and no context.

use crate::context::{ActorIdentity, TenantContext};
use crate::error::{ScopeError, ScopeResult};
use crate::model::UserId;
use crate::role::Role;
use crate::storage::Directory;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::future::Future;

/// Trait for resolving tenant contexts from identity records.
///
/// # Example Implementation
///
/// ```rust,no_run
/// use tenant_scope::context::{ActorIdentity, TenantContext, TenantResolver};
/// use tenant_scope::ScopeResult;
///
/// struct RejectAll;
///
/// impl TenantResolver for RejectAll {
///     async fn resolve(&self, identity: &ActorIdentity) -> ScopeResult<TenantContext> {
///         Err(tenant_scope::ScopeError::tenant_invalid(identity.user_id, "maintenance"))
///     }
/// }
/// ```
pub trait TenantResolver: Send + Sync {
    /// Resolve a context for an authenticated identity.
    ///
    /// # Errors
    /// Returns `TenantInvalid` if:
    /// * a non-platform role has no company
    /// * the company is missing or suspended
    /// * the team is missing, disabled, or belongs to another company
    fn resolve(
        &self,
        identity: &ActorIdentity,
    ) -> impl Future<Output = ScopeResult<TenantContext>> + Send;
}

/// Resolver backed by a [`Directory`].
#[derive(Debug, Clone)]
pub struct DirectoryTenantResolver<D> {
    directory: D,
}

impl<D: Directory> DirectoryTenantResolver<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Load the user record and resolve a context from it.
    ///
    /// Unknown and deactivated users are reported as `TenantInvalid`.
    pub async fn resolve_user(&self, user_id: &UserId) -> ScopeResult<TenantContext> {
        let user = self
            .directory
            .user(user_id)
            .await?
            .filter(|user| user.active)
            .ok_or_else(|| ScopeError::tenant_invalid(*user_id, "user missing or inactive"))?;
        self.resolve(&ActorIdentity::from(&user)).await
    }

    async fn verify(&self, identity: &ActorIdentity) -> ScopeResult<()> {
        let user_id = identity.user_id;

        let Some(company_id) = identity.company_id else {
            if identity.role != Role::PlatformAdmin {
                return Err(ScopeError::tenant_invalid(
                    user_id,
                    format!("role {} requires a company", identity.role),
                ));
            }
            if identity.team_id.is_some() {
                return Err(ScopeError::tenant_invalid(
                    user_id,
                    "team assignment without a company",
                ));
            }
            return Ok(());
        };

        match self.directory.company(&company_id).await? {
            Some(company) if company.is_active() => {}
            Some(_) => {
                return Err(ScopeError::tenant_invalid(
                    user_id,
                    format!("company {} is suspended", company_id),
                ));
            }
            None => {
                return Err(ScopeError::tenant_invalid(
                    user_id,
                    format!("company {} does not exist", company_id),
                ));
            }
        }

        if let Some(team_id) = identity.team_id {
            match self.directory.team(&team_id).await? {
                Some(team) if team.company_id != company_id => {
                    return Err(ScopeError::tenant_invalid(
                        user_id,
                        format!("team {} belongs to another company", team_id),
                    ));
                }
                Some(team) if !team.is_active() => {
                    return Err(ScopeError::tenant_invalid(
                        user_id,
                        format!("team {} is disabled", team_id),
                    ));
                }
                Some(_) => {}
                None => {
                    return Err(ScopeError::tenant_invalid(
                        user_id,
                        format!("team {} does not exist", team_id),
                    ));
                }
            }
        }

        Ok(())
    }
}

impl<D: Directory> TenantResolver for DirectoryTenantResolver<D> {
    async fn resolve(&self, identity: &ActorIdentity) -> ScopeResult<TenantContext> {
        if let Err(e) = self.verify(identity).await {
            warn!("Tenant resolution failed for {}: {}", identity.user_id, e);
            return Err(e);
        }

        // visibility-only memberships exist for the platform owner alone
        let visible_team_ids = if identity.role == Role::PlatformAdmin {
            self.directory.visible_team_ids(&identity.user_id).await?
        } else {
            BTreeSet::new()
        };

        let context = TenantContext::verified(identity.clone(), visible_team_ids);
        debug!(
            "Resolved tenant context: user={} role={} scope={}",
            context.user_id(),
            context.role(),
            context.scope_level()
        );
        Ok(context)
    }
}
