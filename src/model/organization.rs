//! Companies and teams.
//!
//! A company is the tenant root and the unit of data isolation. Teams group
//! users inside exactly one company. Neither is ever hard-deleted while
//! records reference it; both are soft-disabled instead.

use crate::model::{CompanyId, TeamId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    #[default]
    Active,
    /// All member access is frozen; data is retained.
    Suspended,
}

/// A tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub status: CompanyStatus,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Create an active company with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CompanyId::generate(),
            name: name.into(),
            status: CompanyStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CompanyStatus::Active
    }

    /// Return a suspended copy of this company.
    pub fn suspended(mut self) -> Self {
        self.status = CompanyStatus::Suspended;
        self
    }
}

/// Lifecycle state of a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    #[default]
    Active,
    Disabled,
}

/// A team inside a single company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub company_id: CompanyId,
    pub name: String,
    /// Designated lead, if any. The lead is usually, but not necessarily,
    /// a primary member of the team.
    pub lead_id: Option<UserId>,
    pub status: TeamStatus,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Create an active team with a generated id and no lead.
    pub fn new(company_id: CompanyId, name: impl Into<String>) -> Self {
        Self {
            id: TeamId::generate(),
            company_id,
            name: name.into(),
            lead_id: None,
            status: TeamStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Set the team lead.
    pub fn with_lead(mut self, lead_id: UserId) -> Self {
        self.lead_id = Some(lead_id);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == TeamStatus::Active
    }

    /// Return a disabled copy of this team.
    pub fn disabled(mut self) -> Self {
        self.status = TeamStatus::Disabled;
        self
    }

    /// Whether `user_id` is the designated lead.
    pub fn is_led_by(&self, user_id: &UserId) -> bool {
        self.lead_id.as_ref() == Some(user_id)
    }
}
