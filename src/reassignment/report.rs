//! Request and result types for team reassignment.

use crate::model::{EntityKind, TeamId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-kind record counts for one user.
///
/// Returned by a preview, and again as the transferred counts of an apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    user_id: UserId,
    counts: BTreeMap<EntityKind, usize>,
    total_records: usize,
}

impl ImpactReport {
    pub fn new(user_id: UserId, counts: BTreeMap<EntityKind, usize>) -> Self {
        let total_records = counts.values().sum();
        Self {
            user_id,
            counts,
            total_records,
        }
    }

    /// A report with every listed kind at zero.
    pub fn empty(user_id: UserId, kinds: &[EntityKind]) -> Self {
        Self::new(user_id, kinds.iter().map(|kind| (*kind, 0)).collect())
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Count for a kind; kinds not covered by the report count as zero.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<EntityKind, usize> {
        &self.counts
    }

    pub fn deals_count(&self) -> usize {
        self.count(EntityKind::Deal)
    }

    pub fn contacts_count(&self) -> usize {
        self.count(EntityKind::Contact)
    }

    pub fn activities_count(&self) -> usize {
        self.count(EntityKind::Activity)
    }

    pub fn pipelines_count(&self) -> usize {
        self.count(EntityKind::Pipeline)
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }

    /// Same user and identical count for every kind either report mentions.
    pub fn agrees_with(&self, other: &ImpactReport) -> bool {
        self.user_id == other.user_id
            && self
                .counts
                .keys()
                .chain(other.counts.keys())
                .all(|kind| self.count(*kind) == other.count(*kind))
    }
}

/// Administrative request to move a user to another team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentRequest {
    pub target_user_id: UserId,
    pub new_team_id: TeamId,
    pub transfer_data: bool,
    pub new_owner_id: Option<UserId>,
    /// Replacement lead when the target currently leads their source team.
    pub successor_lead_id: Option<UserId>,
    /// Preview the caller saw; when absent a fresh preview is taken
    /// immediately before the transaction.
    pub expected_impact: Option<ImpactReport>,
}

impl ReassignmentRequest {
    /// Move `target_user_id` without transferring any records.
    pub fn new(target_user_id: UserId, new_team_id: TeamId) -> Self {
        Self {
            target_user_id,
            new_team_id,
            transfer_data: false,
            new_owner_id: None,
            successor_lead_id: None,
            expected_impact: None,
        }
    }

    /// Also hand every owned record to `new_owner_id`.
    pub fn with_transfer_to(mut self, new_owner_id: UserId) -> Self {
        self.transfer_data = true;
        self.new_owner_id = Some(new_owner_id);
        self
    }

    pub fn with_successor(mut self, successor_lead_id: UserId) -> Self {
        self.successor_lead_id = Some(successor_lead_id);
        self
    }

    /// Pin the apply to a previously returned preview.
    pub fn with_expected_impact(mut self, report: ImpactReport) -> Self {
        self.expected_impact = Some(report);
        self
    }
}

/// Lead change applied to the source team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadHandoff {
    pub team_id: TeamId,
    pub new_lead_id: Option<UserId>,
}

/// Result of a committed reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentOutcome {
    pub user_id: UserId,
    pub previous_team_id: Option<TeamId>,
    pub new_team_id: TeamId,
    pub team_changed: bool,
    pub records_transferred: ImpactReport,
    pub lead_handoff: Option<LeadHandoff>,
}
