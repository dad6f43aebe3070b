//! Storage seams consumed by the engine.
//!
//! The engine never issues queries of its own against entity tables: it reads
//! the tenant directory (companies, teams, users, memberships) and, for team
//! reassignment only, asks a transactional store to count and move owned
//! records. Everything else is the entity handlers' business.
//!
//! # Traits
//!
//! - [`Directory`] - read access to tenants, teams and users
//! - [`RecordStore`] - predicate-filtered reads of owned records
//! - [`TransactionalStore`] / [`StoreTransaction`] - all-or-nothing writes
//!
//! A transaction that is dropped without [`StoreTransaction::commit`] must
//! leave the store exactly as it was.
//!
//! # Example Usage
//!
//! ```rust
//! use tenant_scope::model::{Company, EntityKind, Team, User};
//! use tenant_scope::role::Role;
//! use tenant_scope::scoping::Predicate;
//! use tenant_scope::storage::{Directory, InMemoryStorage, RecordStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//! let company = storage.insert_company(Company::new("Acme")).await;
//! let team = storage.insert_team(Team::new(company.id, "Sales")).await;
//! let user = storage
//!     .insert_user(User::new(company.id, Role::Contributor, "Uma").on_team(team.id))
//!     .await;
//!
//! let members = storage.team_member_ids(&team.id).await?;
//! assert!(members.contains(&user.id));
//!
//! let everything = Predicate::unconstrained(EntityKind::Deal);
//! assert_eq!(storage.count_matching(&everything).await?, 0);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::StorageError;
pub use in_memory::{InMemoryStorage, InMemoryTransaction};

use crate::model::{Company, CompanyId, OwnedRecord, Team, TeamId, User, UserId};
use crate::scoping::Predicate;
use std::collections::BTreeSet;
use std::future::Future;

/// Read access to the tenant directory.
///
/// Implementations must answer from current state on every call; the engine
/// relies on this to see team membership changes immediately.
pub trait Directory: Send + Sync {
    /// Look up a company, including suspended ones.
    fn company(
        &self,
        id: &CompanyId,
    ) -> impl Future<Output = Result<Option<Company>, StorageError>> + Send;

    /// Look up a team, including disabled ones.
    fn team(&self, id: &TeamId) -> impl Future<Output = Result<Option<Team>, StorageError>> + Send;

    /// Look up a user.
    fn user(&self, id: &UserId) -> impl Future<Output = Result<Option<User>, StorageError>> + Send;

    /// Ids of users whose primary team is `team_id`.
    ///
    /// Visibility-only memberships are not included.
    fn team_member_ids(
        &self,
        team_id: &TeamId,
    ) -> impl Future<Output = Result<BTreeSet<UserId>, StorageError>> + Send;

    /// Teams a user may see without managing them.
    fn visible_team_ids(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<BTreeSet<TeamId>, StorageError>> + Send;

    /// Users matching a user-kind predicate.
    fn users_matching(
        &self,
        predicate: &Predicate,
    ) -> impl Future<Output = Result<Vec<User>, StorageError>> + Send;
}

/// Predicate-filtered reads over owned records.
pub trait RecordStore: Send + Sync {
    /// Number of records of the predicate's entity kind that satisfy it.
    fn count_matching(
        &self,
        predicate: &Predicate,
    ) -> impl Future<Output = Result<usize, StorageError>> + Send;

    /// Records of the predicate's entity kind that satisfy it.
    fn find_matching(
        &self,
        predicate: &Predicate,
    ) -> impl Future<Output = Result<Vec<OwnedRecord>, StorageError>> + Send;
}

/// A store able to open all-or-nothing transactions.
pub trait TransactionalStore: Directory + RecordStore {
    type Transaction: StoreTransaction;

    /// Open a transaction.
    ///
    /// Concurrent transactions touching the same user must not interleave.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, StorageError>> + Send;
}

/// Operations available inside a transaction.
///
/// Reads observe the transaction's own uncommitted writes.
pub trait StoreTransaction: Send {
    fn user(
        &mut self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<User>, StorageError>> + Send;

    fn team(
        &mut self,
        id: &TeamId,
    ) -> impl Future<Output = Result<Option<Team>, StorageError>> + Send;

    fn count_matching(
        &mut self,
        predicate: &Predicate,
    ) -> impl Future<Output = Result<usize, StorageError>> + Send;

    /// Change a user's primary team.
    fn set_user_team(
        &mut self,
        user_id: &UserId,
        team_id: Option<TeamId>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Change or clear a team's lead.
    fn set_team_lead(
        &mut self,
        team_id: &TeamId,
        lead_id: Option<UserId>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Give every record matching `predicate` to `new_owner`.
    ///
    /// Returns the number of records moved.
    fn transfer_ownership(
        &mut self,
        predicate: &Predicate,
        new_owner: &UserId,
    ) -> impl Future<Output = Result<usize, StorageError>> + Send;

    /// Make every write in this transaction visible atomically.
    fn commit(self) -> impl Future<Output = Result<(), StorageError>> + Send;
}
