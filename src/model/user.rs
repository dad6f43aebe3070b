//! Users as actors and as scoped entities.

use crate::model::{CompanyId, Scoped, TeamId, UserId};
use crate::role::Role;
use serde::{Deserialize, Serialize};

/// A user account.
///
/// `company_id` is `None` only for platform administrators acting
/// platform-wide. `team_id` is the primary team and denotes management
/// scope; it changes only through team reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub company_id: Option<CompanyId>,
    pub team_id: Option<TeamId>,
    pub role: Role,
    pub display_name: String,
    pub active: bool,
}

impl User {
    /// Create an active user in a company with no team.
    pub fn new(company_id: CompanyId, role: Role, display_name: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            company_id: Some(company_id),
            team_id: None,
            role,
            display_name: display_name.into(),
            active: true,
        }
    }

    /// Create a platform administrator that belongs to no company.
    pub fn platform_admin(display_name: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            company_id: None,
            team_id: None,
            role: Role::PlatformAdmin,
            display_name: display_name.into(),
            active: true,
        }
    }

    /// Place the user on a primary team.
    pub fn on_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn belongs_to(&self, company_id: &CompanyId) -> bool {
        self.company_id.as_ref() == Some(company_id)
    }
}

/// A user's own id stands in for `owner_id`, so the same predicates that
/// scope records also scope user listings.
impl Scoped for User {
    fn company_id(&self) -> Option<&CompanyId> {
        self.company_id.as_ref()
    }

    fn owner_id(&self) -> &UserId {
        &self.id
    }
}
