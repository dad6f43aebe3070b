//! Per-request tenant context.
//!
//! A [`TenantContext`] is built once per authenticated request and passed
//! explicitly into every scoping call. It is never stored globally, so
//! concurrent requests cannot observe each other's actor.

use crate::model::{CompanyId, TeamId, User, UserId};
use crate::role::{Capability, Role, has_capability};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Breadth of visibility resolved for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeLevel {
    Platform,
    Company,
    Team,
    Owner,
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScopeLevel::Platform => "PLATFORM",
            ScopeLevel::Company => "COMPANY",
            ScopeLevel::Team => "TEAM",
            ScopeLevel::Owner => "OWNER",
        };
        f.write_str(name)
    }
}

/// Identity record of an authenticated caller.
///
/// Produced by the authentication layer; the engine trusts the user id and
/// role but verifies the company and team references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub user_id: UserId,
    pub role: Role,
    pub company_id: Option<CompanyId>,
    pub team_id: Option<TeamId>,
}

impl From<&User> for ActorIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            company_id: user.company_id,
            team_id: user.team_id,
        }
    }
}

/// Resolved actor for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    user_id: UserId,
    role: Role,
    company_id: Option<CompanyId>,
    team_id: Option<TeamId>,
    visible_team_ids: BTreeSet<TeamId>,
}

impl TenantContext {
    /// Build a context from an identity that has already been verified.
    pub(crate) fn verified(identity: ActorIdentity, visible_team_ids: BTreeSet<TeamId>) -> Self {
        Self {
            user_id: identity.user_id,
            role: identity.role,
            company_id: identity.company_id,
            team_id: identity.team_id,
            visible_team_ids,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Actor's company; `None` only for a platform admin acting platform-wide.
    pub fn company_id(&self) -> Option<&CompanyId> {
        self.company_id.as_ref()
    }

    /// Actor's primary team.
    pub fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    /// Teams the actor may see through visibility-only membership.
    ///
    /// Loaded for platform admins only. The engine never consults it to
    /// widen or narrow a predicate, since a platform admin already sees every
    /// team; it is carried for reporting layers that present the platform
    /// owner's own teams separately from tenant data.
    pub fn visible_team_ids(&self) -> &BTreeSet<TeamId> {
        &self.visible_team_ids
    }

    pub fn is_platform_admin(&self) -> bool {
        self.role == Role::PlatformAdmin
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        has_capability(self.role, capability)
    }

    /// True iff platform admin, or the actor belongs to `company_id`.
    pub fn can_access_company(&self, company_id: &CompanyId) -> bool {
        self.is_platform_admin() || self.company_id.as_ref() == Some(company_id)
    }

    /// Whether the actor sees a team's data. Company admins and platform
    /// admins see every team they can reach through company access; everyone
    /// else sees their primary team only.
    pub fn can_view_team(&self, team_id: &TeamId, team_company_id: &CompanyId) -> bool {
        match self.scope_level() {
            ScopeLevel::Platform => true,
            ScopeLevel::Company => self.can_access_company(team_company_id),
            ScopeLevel::Team | ScopeLevel::Owner => {
                self.can_access_company(team_company_id) && self.team_id.as_ref() == Some(team_id)
            }
        }
    }

    /// Resolved scope level.
    ///
    /// A team manager without a team falls back to `Owner`; the fallback
    /// never widens visibility.
    pub fn scope_level(&self) -> ScopeLevel {
        match (self.role, self.team_id) {
            (Role::PlatformAdmin, _) => ScopeLevel::Platform,
            (Role::CompanyAdmin, _) => ScopeLevel::Company,
            (Role::TeamManager, Some(_)) => ScopeLevel::Team,
            (Role::TeamManager, None) => ScopeLevel::Owner,
            (Role::Contributor, _) => ScopeLevel::Owner,
        }
    }

    /// Whether the actor's nominal scope could not be resolved and was
    /// narrowed.
    pub fn is_fallback(&self) -> bool {
        self.role == Role::TeamManager && self.team_id.is_none()
    }
}
