//! Scoping predicates.
//!
//! A [`Predicate`] is a conjunction of [`Constraint`]s on the two tenancy
//! attributes of a scoped entity. Entity handlers translate it into their own
//! query language; [`Predicate::matches`] is the reference evaluation used by
//! the in-memory backend and by single-record write checks.

use crate::context::ScopeLevel;
use crate::model::{CompanyId, EntityKind, Scoped, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single condition on a scoped entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum Constraint {
    /// `company_id == value`
    CompanyEquals { company_id: CompanyId },
    /// `owner_id == value`
    OwnerEquals { owner_id: UserId },
    /// `owner_id IN values`; an empty set matches nothing.
    OwnerIn { owner_ids: BTreeSet<UserId> },
}

impl Constraint {
    fn holds<T: Scoped + ?Sized>(&self, item: &T) -> bool {
        match self {
            Constraint::CompanyEquals { company_id } => item.company_id() == Some(company_id),
            Constraint::OwnerEquals { owner_id } => item.owner_id() == owner_id,
            Constraint::OwnerIn { owner_ids } => owner_ids.contains(item.owner_id()),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::CompanyEquals { company_id } => write!(f, "company_id = {}", company_id),
            Constraint::OwnerEquals { owner_id } => write!(f, "owner_id = {}", owner_id),
            Constraint::OwnerIn { owner_ids } => write!(f, "owner_id IN ({} ids)", owner_ids.len()),
        }
    }
}

/// Conjunction of constraints for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    entity: EntityKind,
    level: ScopeLevel,
    constraints: Vec<Constraint>,
}

impl Predicate {
    /// Full visibility over an entity kind.
    pub fn unconstrained(entity: EntityKind) -> Self {
        Self {
            entity,
            level: ScopeLevel::Platform,
            constraints: Vec::new(),
        }
    }

    /// `company_id == company_id`.
    pub fn company(entity: EntityKind, level: ScopeLevel, company_id: CompanyId) -> Self {
        Self {
            entity,
            level,
            constraints: vec![Constraint::CompanyEquals { company_id }],
        }
    }

    /// `company_id == company_id AND owner_id == owner_id`.
    pub fn owner(entity: EntityKind, company_id: CompanyId, owner_id: UserId) -> Self {
        Self::company(entity, ScopeLevel::Owner, company_id)
            .and(Constraint::OwnerEquals { owner_id })
    }

    /// `company_id == company_id AND owner_id IN member_ids`.
    pub fn team(entity: EntityKind, company_id: CompanyId, member_ids: BTreeSet<UserId>) -> Self {
        Self::company(entity, ScopeLevel::Team, company_id).and(Constraint::OwnerIn {
            owner_ids: member_ids,
        })
    }

    /// Add another constraint to the conjunction.
    pub fn and(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// Scope level this predicate was derived for.
    pub fn level(&self) -> ScopeLevel {
        self.level
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Company every match must belong to, if the predicate fixes one.
    pub fn company_id(&self) -> Option<&CompanyId> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::CompanyEquals { company_id } => Some(company_id),
            _ => None,
        })
    }

    /// Whether `item` satisfies every constraint.
    pub fn matches<T: Scoped + ?Sized>(&self, item: &T) -> bool {
        self.constraints.iter().all(|c| c.holds(item))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.entity, self.level)?;
        if self.constraints.is_empty() {
            return write!(f, " TRUE");
        }
        for (i, constraint) in self.constraints.iter().enumerate() {
            let joiner = if i == 0 { " " } else { " AND " };
            write!(f, "{}{}", joiner, constraint)?;
        }
        Ok(())
    }
}
