//! Owned business records and the entity kinds the engine scopes.

use crate::model::{CompanyId, RecordId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of entity subject to scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Deal,
    Contact,
    Activity,
    Pipeline,
    /// User accounts; scoped, but never owned or transferred.
    User,
}

impl EntityKind {
    /// Kinds that carry an `owner_id` and take part in ownership transfer.
    pub const OWNED: [EntityKind; 4] = [
        EntityKind::Deal,
        EntityKind::Contact,
        EntityKind::Activity,
        EntityKind::Pipeline,
    ];

    pub fn is_owned_record(&self) -> bool {
        !matches!(self, EntityKind::User)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Deal => "deal",
            EntityKind::Contact => "contact",
            EntityKind::Activity => "activity",
            EntityKind::Pipeline => "pipeline",
            EntityKind::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything carrying the two tenancy attributes a predicate inspects.
pub trait Scoped {
    /// Owning company; `None` only for platform-level users.
    fn company_id(&self) -> Option<&CompanyId>;

    /// Accountable user.
    fn owner_id(&self) -> &UserId;
}

/// A deal, contact, activity or pipeline.
///
/// `company_id` is fixed at creation. `owner_id` changes only through
/// reassignment or explicit re-ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedRecord {
    pub id: RecordId,
    pub kind: EntityKind,
    pub company_id: CompanyId,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedRecord {
    /// Create a record from a stamp produced by the scoping engine.
    pub fn new(kind: EntityKind, stamp: RecordStamp) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::generate(),
            kind,
            company_id: stamp.company_id,
            owner_id: stamp.owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move ownership to another user.
    pub fn transfer_to(&mut self, owner_id: UserId) {
        self.owner_id = owner_id;
        self.updated_at = Utc::now();
    }
}

impl Scoped for OwnedRecord {
    fn company_id(&self) -> Option<&CompanyId> {
        Some(&self.company_id)
    }

    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}

/// Tenancy attributes proposed for a record about to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStamp {
    pub company_id: CompanyId,
    pub owner_id: UserId,
}

impl Scoped for RecordStamp {
    fn company_id(&self) -> Option<&CompanyId> {
        Some(&self.company_id)
    }

    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}
