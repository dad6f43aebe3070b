//! Query scoping engine.
//!
//! Turns a [`TenantContext`] into the [`Predicate`] every read and write path
//! must apply before touching storage. Rules are evaluated top-down and the
//! first match wins; an actor always gets exactly one scope level.
//!
//! 1. Platform admin: unconstrained, or one company if a target is given
//! 2. Company admin: `company_id`
//! 3. Team manager with a team: `company_id AND owner_id IN members(team)`
//! 4. Team manager without a team: `company_id AND owner_id = self`
//! 5. Contributor: `company_id AND owner_id = self`
//!
//! Team membership is read from the directory on every call and never cached.

use crate::config::EngineConfig;
use crate::context::{ScopeLevel, TenantContext};
use crate::error::{ScopeError, ScopeResult};
use crate::model::{CompanyId, EntityKind, RecordStamp, Scoped, UserId};
use crate::role::{Capability, Role};
use crate::scoping::Predicate;
use crate::storage::Directory;
use log::{debug, warn};

/// Computes scoping predicates and checks single-record access.
#[derive(Debug, Clone)]
pub struct ScopingEngine<D> {
    directory: D,
    config: EngineConfig,
}

impl<D: Directory> ScopingEngine<D> {
    /// Create an engine with default configuration.
    pub fn new(directory: D) -> Self {
        Self::with_config(directory, EngineConfig::default())
    }

    pub fn with_config(directory: D, config: EngineConfig) -> Self {
        Self { directory, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// OWNER-level predicate for a specific user, independent of any actor.
    pub fn owner_predicate(entity: EntityKind, company_id: CompanyId, user_id: UserId) -> Predicate {
        Predicate::owner(entity, company_id, user_id)
    }

    /// Predicate an entity handler must apply for `ctx`.
    ///
    /// `target_company` narrows a platform admin to one company. For any
    /// other actor it must be absent or equal to their own company.
    ///
    /// # Errors
    /// `ScopeViolation` if the target company is outside the actor's reach or
    /// impersonation is disabled; `Storage` if membership cannot be read.
    pub async fn scope_filter(
        &self,
        entity: EntityKind,
        ctx: &TenantContext,
        target_company: Option<&CompanyId>,
    ) -> ScopeResult<Predicate> {
        let predicate = self.derive(entity, ctx, target_company).await?;
        debug!(
            "Scope for user={} role={}: {}",
            ctx.user_id(),
            ctx.role(),
            predicate
        );
        Ok(predicate)
    }

    async fn derive(
        &self,
        entity: EntityKind,
        ctx: &TenantContext,
        target_company: Option<&CompanyId>,
    ) -> ScopeResult<Predicate> {
        if ctx.is_platform_admin() {
            return match target_company {
                None => Ok(Predicate::unconstrained(entity)),
                Some(_) if !self.config.allow_company_impersonation => {
                    Err(self.violation(entity, ctx, "company impersonation is disabled"))
                }
                Some(company_id) => Ok(Predicate::company(entity, ScopeLevel::Company, *company_id)),
            };
        }

        let Some(company_id) = ctx.company_id().copied() else {
            return Err(self.violation(entity, ctx, "actor has no company"));
        };
        if let Some(target) = target_company {
            if *target != company_id {
                return Err(self.violation(
                    entity,
                    ctx,
                    format!("company {} is outside actor scope", target),
                ));
            }
        }

        let predicate = match (ctx.role(), ctx.team_id()) {
            (Role::PlatformAdmin, _) | (Role::CompanyAdmin, _) => {
                Predicate::company(entity, ScopeLevel::Company, company_id)
            }
            (Role::TeamManager, Some(team_id)) => {
                let members = self.directory.team_member_ids(team_id).await?;
                Predicate::team(entity, company_id, members)
            }
            (Role::TeamManager, None) | (Role::Contributor, _) => {
                Predicate::owner(entity, company_id, *ctx.user_id())
            }
        };
        Ok(predicate)
    }

    /// Check that `ctx` may read a single, already-loaded entity.
    pub async fn authorize_read<T>(
        &self,
        entity: EntityKind,
        ctx: &TenantContext,
        item: &T,
    ) -> ScopeResult<()>
    where
        T: Scoped + Sync + ?Sized,
    {
        self.authorize_existing(entity, ctx, item, "read").await
    }

    /// Check that `ctx` may update or delete a single entity.
    ///
    /// The target must satisfy the same predicate a read would apply.
    pub async fn authorize_mutation<T>(
        &self,
        entity: EntityKind,
        ctx: &TenantContext,
        item: &T,
    ) -> ScopeResult<()>
    where
        T: Scoped + Sync + ?Sized,
    {
        self.authorize_existing(entity, ctx, item, "mutate").await
    }

    async fn authorize_existing<T>(
        &self,
        entity: EntityKind,
        ctx: &TenantContext,
        item: &T,
        action: &str,
    ) -> ScopeResult<()>
    where
        T: Scoped + Sync + ?Sized,
    {
        let predicate = self.derive(entity, ctx, None).await?;
        if predicate.matches(item) {
            Ok(())
        } else {
            Err(self.violation(
                entity,
                ctx,
                format!("{} outside scope {}", action, predicate.level()),
            ))
        }
    }

    /// Build the tenancy stamp for a new record.
    ///
    /// The company always comes from the actor's context. A platform admin
    /// acting platform-wide must name the company explicitly.
    pub fn stamp_for_create(
        &self,
        entity: EntityKind,
        ctx: &TenantContext,
        assignee: Option<UserId>,
        target_company: Option<CompanyId>,
    ) -> ScopeResult<RecordStamp> {
        let company_id = match (ctx.company_id(), target_company) {
            (_, Some(target)) if ctx.is_platform_admin() => target,
            (Some(own), Some(target)) if *own != target => {
                return Err(self.violation(entity, ctx, "stamped company outside scope"));
            }
            (Some(own), _) => *own,
            (None, _) => {
                return Err(self.violation(entity, ctx, "a company is required to create records"));
            }
        };
        Ok(RecordStamp {
            company_id,
            owner_id: assignee.unwrap_or(*ctx.user_id()),
        })
    }

    /// Check that `ctx` may create an entity carrying `stamp`.
    ///
    /// Actors may always own what they create. Assigning another owner
    /// needs `ManageTeamUsers` (owner in the actor's team) or
    /// `ManageCompanyUsers` (owner anywhere in the company).
    pub async fn authorize_create(
        &self,
        entity: EntityKind,
        ctx: &TenantContext,
        stamp: &RecordStamp,
    ) -> ScopeResult<()> {
        if !entity.is_owned_record() {
            return Err(self.violation(entity, ctx, "entity kind has no owner"));
        }
        if !ctx.can_access_company(&stamp.company_id) {
            return Err(self.violation(entity, ctx, "stamped company outside scope"));
        }
        if ctx.is_platform_admin() {
            let active = self
                .directory
                .company(&stamp.company_id)
                .await?
                .is_some_and(|company| company.is_active());
            if !active {
                return Err(self.violation(entity, ctx, "stamped company is not active"));
            }
        }
        if stamp.owner_id == *ctx.user_id() {
            return Ok(());
        }

        let owner = self
            .directory
            .user(&stamp.owner_id)
            .await?
            .filter(|owner| owner.active && owner.belongs_to(&stamp.company_id));
        let Some(owner) = owner else {
            return Err(self.violation(entity, ctx, "assignee not in company"));
        };

        let allowed = ctx.is_platform_admin()
            || ctx.has_capability(Capability::ManageCompanyUsers)
            || (ctx.has_capability(Capability::ManageTeamUsers)
                && ctx.team_id().is_some()
                && owner.team_id.as_ref() == ctx.team_id());
        if allowed {
            Ok(())
        } else {
            Err(self.violation(entity, ctx, "assignee outside managed scope"))
        }
    }

    /// Stamp and authorize a create in one step.
    pub async fn prepare_create(
        &self,
        entity: EntityKind,
        ctx: &TenantContext,
        assignee: Option<UserId>,
        target_company: Option<CompanyId>,
    ) -> ScopeResult<RecordStamp> {
        let stamp = self.stamp_for_create(entity, ctx, assignee, target_company)?;
        self.authorize_create(entity, ctx, &stamp).await?;
        Ok(stamp)
    }

    fn violation(
        &self,
        entity: EntityKind,
        ctx: &TenantContext,
        reason: impl Into<String>,
    ) -> ScopeError {
        let err = ScopeError::scope_violation(entity, reason);
        warn!("Scope violation by user={} role={}: {}", ctx.user_id(), ctx.role(), err);
        err
    }
}
