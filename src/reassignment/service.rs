//! Team reassignment workflow.
//!
//! Moving a user between teams changes what every team manager sees, so the
//! service splits the operation into three steps:
//!
//! 1. [`TeamReassignmentService::preview_reassignment`] counts what the user
//!    owns, per entity kind
//! 2. [`TeamReassignmentService::validate_reassignment`] checks the request
//!    against the actor's scope and the directory, without writing
//! 3. [`TeamReassignmentService::apply_reassignment`] re-validates, then
//!    changes the team, hands off a lead role and transfers ownership inside
//!    one transaction
//!
//! The transaction re-counts the target's records before writing anything;
//! if the counts drifted from the preview the whole apply is rejected with
//! `PreviewStale` and nothing is written. Everything validation decided from
//! the directory is read again under the transaction: the destination team,
//! the new owner's eligibility, the source team's lead and the successor.
//! An ineligible owner or successor is `InvalidDestination`; a lead change on
//! the source team is `PreviewStale`.

use crate::config::{EngineConfig, SuccessorPolicy};
use crate::context::TenantContext;
use crate::error::{ScopeError, ScopeResult};
use crate::model::{CompanyId, EntityKind, Team, TeamId, User, UserId};
use crate::reassignment::{ImpactReport, LeadHandoff, ReassignmentOutcome, ReassignmentRequest};
use crate::role::Capability;
use crate::scoping::ScopingEngine;
use crate::storage::{StoreTransaction, TransactionalStore};
use log::{debug, info, warn};
use std::collections::BTreeMap;

const OPERATION: &str = "team reassignment";

/// A request that passed validation, with everything apply needs resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentPlan {
    pub target: User,
    pub company_id: CompanyId,
    pub destination: Team,
    pub new_owner_id: Option<UserId>,
    /// Whether the target led their source team when validated.
    pub leads_source: bool,
    pub lead_handoff: Option<LeadHandoff>,
    /// Counts the apply must find and move; all zero when not transferring.
    pub expected: ImpactReport,
}

impl ReassignmentPlan {
    pub fn previous_team_id(&self) -> Option<TeamId> {
        self.target.team_id
    }

    pub fn changes_team(&self) -> bool {
        self.target.team_id != Some(self.destination.id)
    }
}

/// Preview, validate and apply team moves.
#[derive(Debug, Clone)]
pub struct TeamReassignmentService<S> {
    engine: ScopingEngine<S>,
}

impl<S: TransactionalStore> TeamReassignmentService<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self {
            engine: ScopingEngine::with_config(store, config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    fn store(&self) -> &S {
        self.engine.directory()
    }

    /// Count the records `target_user_id` owns, per configured entity kind.
    ///
    /// Counts use the target's OWNER-level predicate, not the actor's scope,
    /// so a manager sees the full impact of the move.
    ///
    /// # Errors
    /// `Forbidden` without a user-management capability; `ScopeViolation` if
    /// the target is missing or outside the actor's reach.
    pub async fn preview_reassignment(
        &self,
        actor: &TenantContext,
        target_user_id: &UserId,
    ) -> ScopeResult<ImpactReport> {
        let target = self.authorize_target(actor, target_user_id).await?;
        let company_id = self.target_company(&target)?;
        let report = self.count_owned(&target.id, company_id).await?;
        debug!(
            "Reassignment preview by user={} for user={}: {} records",
            actor.user_id(),
            target.id,
            report.total_records()
        );
        Ok(report)
    }

    /// Check a request without writing anything.
    ///
    /// # Errors
    /// `Forbidden` and `ScopeViolation` as for a preview, `InvalidDestination`
    /// when the team, new owner or lead successor is unacceptable.
    pub async fn validate_reassignment(
        &self,
        actor: &TenantContext,
        request: &ReassignmentRequest,
    ) -> ScopeResult<ReassignmentPlan> {
        let target = self.authorize_target(actor, &request.target_user_id).await?;
        let company_id = self.target_company(&target)?;

        let destination = match self.store().team(&request.new_team_id).await? {
            Some(team) if team.company_id == company_id => team,
            _ => {
                return Err(self.reject(
                    actor,
                    ScopeError::team_outside_company(&request.new_team_id, &company_id),
                ));
            }
        };
        if !destination.is_active() {
            return Err(self.reject(
                actor,
                ScopeError::invalid_destination(format!("team {} is disabled", destination.id)),
            ));
        }

        let new_owner_id = if request.transfer_data {
            Some(self.check_new_owner(actor, request, &target, &destination).await?)
        } else {
            if request.new_owner_id.is_some() {
                debug!("Ignoring new owner for user={}: no transfer requested", target.id);
            }
            None
        };

        let (leads_source, lead_handoff) = self.plan_lead_handoff(actor, request, &target).await?;

        let expected = if request.transfer_data {
            match &request.expected_impact {
                Some(report) if report.user_id() == &target.id => report.clone(),
                Some(_) => {
                    return Err(self.reject(
                        actor,
                        ScopeError::invalid_destination("preview belongs to a different user"),
                    ));
                }
                None => self.count_owned(&target.id, company_id).await?,
            }
        } else {
            ImpactReport::empty(target.id, &self.config().transfer_kinds)
        };

        Ok(ReassignmentPlan {
            target,
            company_id,
            destination,
            new_owner_id,
            leads_source,
            lead_handoff,
            expected,
        })
    }

    /// Validate and apply a reassignment atomically.
    ///
    /// Either every write lands or none does. A failure after the
    /// transaction opened is logged and rolls everything back.
    ///
    /// # Errors
    /// Everything `validate_reassignment` reports, plus `PreviewStale` if
    /// the target's records or team changed since validation, and `Storage`
    /// if the backend fails.
    pub async fn apply_reassignment(
        &self,
        actor: &TenantContext,
        request: &ReassignmentRequest,
    ) -> ScopeResult<ReassignmentOutcome> {
        let plan = self.validate_reassignment(actor, request).await?;

        let mut tx = self.store().begin().await?;
        let outcome = match self.apply_in(&mut tx, &plan).await {
            Ok(outcome) => outcome,
            Err(err) => {
                drop(tx);
                warn!(
                    "Reassignment of user={} by user={} rolled back: {} ({})",
                    plan.target.id,
                    actor.user_id(),
                    err,
                    err.kind()
                );
                return Err(err);
            }
        };
        if let Err(err) = tx.commit().await {
            warn!(
                "Reassignment of user={} by user={} failed to commit: {}",
                plan.target.id,
                actor.user_id(),
                err
            );
            return Err(err.into());
        }

        info!(
            "User {} moved from {} to team {} by user={}; {} records transferred",
            outcome.user_id,
            outcome
                .previous_team_id
                .map_or_else(|| "no team".to_string(), |id| format!("team {}", id)),
            outcome.new_team_id,
            actor.user_id(),
            outcome.records_transferred.total_records()
        );
        Ok(outcome)
    }

    async fn apply_in(
        &self,
        tx: &mut S::Transaction,
        plan: &ReassignmentPlan,
    ) -> ScopeResult<ReassignmentOutcome> {
        let target_id = plan.target.id;
        let current = tx
            .user(&target_id)
            .await?
            .ok_or_else(|| ScopeError::scope_violation(EntityKind::User, "target no longer exists"))?;

        let found = self.count_in(tx, &target_id, plan.company_id).await?;
        let membership_moved =
            current.team_id != plan.target.team_id || current.company_id != plan.target.company_id;
        if membership_moved || (plan.new_owner_id.is_some() && !found.agrees_with(&plan.expected)) {
            return Err(stale(plan, &found));
        }

        let destination = match tx.team(&plan.destination.id).await? {
            Some(team) if team.is_active() && team.company_id == plan.company_id => team,
            _ => {
                return Err(ScopeError::invalid_destination(format!(
                    "team {} is no longer available",
                    plan.destination.id
                )));
            }
        };

        // Directory edits may have landed between validation and the lock.
        if let Some(new_owner_id) = &plan.new_owner_id {
            let still_fits = tx
                .user(new_owner_id)
                .await?
                .is_some_and(|owner| owner_fits(&owner, &destination));
            if !still_fits {
                return Err(ScopeError::invalid_destination(format!(
                    "new owner {} is no longer eligible for team {}",
                    new_owner_id, destination.id
                )));
            }
        }

        if let Some(source_id) = plan.previous_team_id().filter(|id| *id != destination.id) {
            let leads_now = tx
                .team(&source_id)
                .await?
                .is_some_and(|team| team.is_led_by(&target_id));
            if leads_now != plan.leads_source {
                return Err(stale(plan, &found));
            }
        }

        if let Some(LeadHandoff {
            team_id,
            new_lead_id: Some(successor_id),
        }) = plan.lead_handoff
        {
            let still_fits = tx
                .user(&successor_id)
                .await?
                .is_some_and(|successor| successor_fits(&successor, &current, team_id));
            if !still_fits {
                return Err(ScopeError::invalid_destination(format!(
                    "successor {} is no longer eligible to lead team {}",
                    successor_id, team_id
                )));
            }
        }

        tx.set_user_team(&target_id, Some(plan.destination.id)).await?;

        if let Some(handoff) = &plan.lead_handoff {
            tx.set_team_lead(&handoff.team_id, handoff.new_lead_id).await?;
        }

        let records_transferred = match &plan.new_owner_id {
            Some(new_owner_id) => {
                let mut moved = BTreeMap::new();
                for kind in &self.config().transfer_kinds {
                    let predicate = ScopingEngine::<S>::owner_predicate(*kind, plan.company_id, target_id);
                    let count = tx.transfer_ownership(&predicate, new_owner_id).await?;
                    moved.insert(*kind, count);
                }
                let moved = ImpactReport::new(target_id, moved);
                if !moved.agrees_with(&plan.expected) {
                    return Err(stale(plan, &moved));
                }
                moved
            }
            None => ImpactReport::empty(target_id, &self.config().transfer_kinds),
        };

        Ok(ReassignmentOutcome {
            user_id: target_id,
            previous_team_id: plan.previous_team_id(),
            new_team_id: plan.destination.id,
            team_changed: plan.changes_team(),
            records_transferred,
            lead_handoff: plan.lead_handoff,
        })
    }

    /// Capability and scope gate shared by preview and validate.
    async fn authorize_target(
        &self,
        actor: &TenantContext,
        target_user_id: &UserId,
    ) -> ScopeResult<User> {
        let company_wide = actor.has_capability(Capability::ManageCompanyUsers);
        if !company_wide && !actor.has_capability(Capability::ManageTeamUsers) {
            warn!(
                "Reassignment denied for user={} role={}: missing capability",
                actor.user_id(),
                actor.role()
            );
            return Err(ScopeError::forbidden(
                OPERATION,
                Capability::ManageTeamUsers.as_str(),
            ));
        }

        let Some(target) = self
            .store()
            .user(target_user_id)
            .await?
            .filter(|user| user.active)
        else {
            return Err(self.out_of_scope(actor, "target user missing or inactive"));
        };
        if actor.is_platform_admin() {
            return Ok(target);
        }

        let same_company = target
            .company_id
            .as_ref()
            .is_some_and(|company_id| actor.can_access_company(company_id));
        if !same_company {
            return Err(self.out_of_scope(actor, "target outside actor company"));
        }
        if target.role.breadth() > actor.role().breadth() {
            return Err(self.out_of_scope(actor, "target role is broader than actor role"));
        }
        if !company_wide {
            let on_actor_team = actor.team_id().is_some() && target.team_id.as_ref() == actor.team_id();
            if !on_actor_team {
                return Err(self.out_of_scope(actor, "target outside actor team"));
            }
        }
        Ok(target)
    }

    fn target_company(&self, target: &User) -> ScopeResult<CompanyId> {
        target.company_id.ok_or_else(|| {
            ScopeError::invalid_destination("platform users cannot be assigned to a team")
        })
    }

    async fn check_new_owner(
        &self,
        actor: &TenantContext,
        request: &ReassignmentRequest,
        target: &User,
        destination: &Team,
    ) -> ScopeResult<UserId> {
        let Some(new_owner_id) = request.new_owner_id else {
            return Err(self.reject(
                actor,
                ScopeError::invalid_destination("a new owner is required to transfer records"),
            ));
        };
        if new_owner_id == target.id {
            return Err(self.reject(
                actor,
                ScopeError::invalid_destination("records cannot be transferred to their current owner"),
            ));
        }
        let eligible = self
            .store()
            .user(&new_owner_id)
            .await?
            .is_some_and(|owner| owner_fits(&owner, destination));
        if !eligible {
            return Err(self.reject(
                actor,
                ScopeError::invalid_destination(format!(
                    "new owner must be an active member or lead of team {}",
                    destination.id
                )),
            ));
        }
        Ok(new_owner_id)
    }

    async fn plan_lead_handoff(
        &self,
        actor: &TenantContext,
        request: &ReassignmentRequest,
        target: &User,
    ) -> ScopeResult<(bool, Option<LeadHandoff>)> {
        let Some(source_id) = target.team_id else {
            return Ok((false, None));
        };
        if source_id == request.new_team_id {
            return Ok((false, None));
        }
        let leads_source = self
            .store()
            .team(&source_id)
            .await?
            .is_some_and(|team| team.is_led_by(&target.id));
        if !leads_source {
            return Ok((false, None));
        }

        if let Some(successor_id) = request.successor_lead_id {
            let eligible = self
                .store()
                .user(&successor_id)
                .await?
                .is_some_and(|successor| successor_fits(&successor, target, source_id));
            if !eligible {
                return Err(self.reject(
                    actor,
                    ScopeError::invalid_destination(format!(
                        "successor must be an active member of team {}",
                        source_id
                    )),
                ));
            }
            return Ok((
                true,
                Some(LeadHandoff {
                    team_id: source_id,
                    new_lead_id: Some(successor_id),
                }),
            ));
        }

        let handoff = match self.config().successor_policy {
            SuccessorPolicy::RequireSuccessor => {
                return Err(self.reject(
                    actor,
                    ScopeError::invalid_destination(format!(
                        "user {} leads team {}; a successor is required",
                        target.id, source_id
                    )),
                ));
            }
            SuccessorPolicy::ClearLead => Some(LeadHandoff {
                team_id: source_id,
                new_lead_id: None,
            }),
            SuccessorPolicy::KeepLead => None,
        };
        Ok((true, handoff))
    }

    async fn count_owned(&self, user_id: &UserId, company_id: CompanyId) -> ScopeResult<ImpactReport> {
        let mut counts = BTreeMap::new();
        for kind in &self.config().transfer_kinds {
            let predicate = ScopingEngine::<S>::owner_predicate(*kind, company_id, *user_id);
            counts.insert(*kind, self.store().count_matching(&predicate).await?);
        }
        Ok(ImpactReport::new(*user_id, counts))
    }

    async fn count_in(
        &self,
        tx: &mut S::Transaction,
        user_id: &UserId,
        company_id: CompanyId,
    ) -> ScopeResult<ImpactReport> {
        let mut counts = BTreeMap::new();
        for kind in &self.config().transfer_kinds {
            let predicate = ScopingEngine::<S>::owner_predicate(*kind, company_id, *user_id);
            counts.insert(*kind, tx.count_matching(&predicate).await?);
        }
        Ok(ImpactReport::new(*user_id, counts))
    }

    fn out_of_scope(&self, actor: &TenantContext, reason: &str) -> ScopeError {
        self.reject(actor, ScopeError::scope_violation(EntityKind::User, reason))
    }

    fn reject(&self, actor: &TenantContext, err: ScopeError) -> ScopeError {
        warn!(
            "Reassignment rejected for user={} role={}: {}",
            actor.user_id(),
            actor.role(),
            err
        );
        err
    }
}

/// Active member or lead of `destination`, in its company.
fn owner_fits(owner: &User, destination: &Team) -> bool {
    owner.active
        && owner.company_id == Some(destination.company_id)
        && (owner.team_id == Some(destination.id) || destination.is_led_by(&owner.id))
}

/// Active member of the source team other than the departing lead.
fn successor_fits(successor: &User, target: &User, source_id: TeamId) -> bool {
    successor.id != target.id
        && successor.active
        && successor.company_id == target.company_id
        && successor.team_id == Some(source_id)
}

fn stale(plan: &ReassignmentPlan, found: &ImpactReport) -> ScopeError {
    ScopeError::PreviewStale {
        user_id: plan.target.id,
        expected: plan.expected.total_records(),
        actual: found.total_records(),
    }
}
