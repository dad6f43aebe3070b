//! In-memory storage implementation.
//!
//! Thread-safe backend built on `tokio::sync::RwLock`, intended for tests,
//! development and embedding. Transactions take an owned write guard on the
//! whole store and work on a private copy of the state; commit swaps the copy
//! in, drop discards it. Reassignments therefore never interleave, and a
//! failure at any point leaves no partial writes behind.
//!
//! # Fault injection
//!
//! [`InMemoryStorage::fail_next_transfer`] and
//! [`InMemoryStorage::fail_next_commit`] make the next corresponding
//! transaction step fail with [`StorageError::Unavailable`], which is how the
//! rollback paths are exercised in tests.

use crate::model::{Company, CompanyId, EntityKind, OwnedRecord, RecordId, Team, TeamId, User, UserId};
use crate::scoping::Predicate;
use crate::storage::{Directory, RecordStore, StorageError, StoreTransaction, TransactionalStore};
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

#[derive(Debug, Clone, Default)]
struct State {
    companies: HashMap<CompanyId, Company>,
    teams: HashMap<TeamId, Team>,
    users: HashMap<UserId, User>,
    // user -> teams visible without management rights
    visibility: HashMap<UserId, BTreeSet<TeamId>>,
    records: HashMap<EntityKind, BTreeMap<RecordId, OwnedRecord>>,
}

impl State {
    fn team_member_ids(&self, team_id: &TeamId) -> BTreeSet<UserId> {
        self.users
            .values()
            .filter(|user| user.team_id.as_ref() == Some(team_id))
            .map(|user| user.id)
            .collect()
    }

    fn matching<'a>(&'a self, predicate: &'a Predicate) -> impl Iterator<Item = &'a OwnedRecord> {
        self.records
            .get(&predicate.entity())
            .into_iter()
            .flat_map(|by_id| by_id.values())
            .filter(move |record| predicate.matches(*record))
    }
}

#[derive(Debug, Default)]
struct FaultPlan {
    fail_next_transfer: AtomicBool,
    fail_next_commit: AtomicBool,
}

/// Thread-safe in-memory tenant directory and record store.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    state: Arc<RwLock<State>>,
    faults: Arc<FaultPlan>,
}

/// Summary counts, useful for assertions and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InMemoryStorageStats {
    pub company_count: usize,
    pub team_count: usize,
    pub user_count: usize,
    pub record_count: usize,
}

impl InMemoryStorage {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a company.
    pub async fn insert_company(&self, company: Company) -> Company {
        let mut state = self.state.write().await;
        state.companies.insert(company.id, company.clone());
        company
    }

    /// Insert or replace a team.
    pub async fn insert_team(&self, team: Team) -> Team {
        let mut state = self.state.write().await;
        state.teams.insert(team.id, team.clone());
        team
    }

    /// Insert or replace a user.
    pub async fn insert_user(&self, user: User) -> User {
        let mut state = self.state.write().await;
        state.users.insert(user.id, user.clone());
        user
    }

    /// Insert or replace an owned record.
    pub async fn insert_record(&self, record: OwnedRecord) -> OwnedRecord {
        let mut state = self.state.write().await;
        state
            .records
            .entry(record.kind)
            .or_default()
            .insert(record.id, record.clone());
        record
    }

    /// Grant a visibility-only membership in a team.
    pub async fn grant_team_visibility(&self, user_id: UserId, team_id: TeamId) {
        let mut state = self.state.write().await;
        state.visibility.entry(user_id).or_default().insert(team_id);
    }

    /// Suspend a company in place.
    pub async fn suspend_company(&self, company_id: &CompanyId) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let company = state
            .companies
            .get_mut(company_id)
            .ok_or_else(|| StorageError::not_found("company", company_id))?;
        *company = company.clone().suspended();
        Ok(())
    }

    /// Disable a team in place.
    pub async fn disable_team(&self, team_id: &TeamId) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let team = state
            .teams
            .get_mut(team_id)
            .ok_or_else(|| StorageError::not_found("team", team_id))?;
        *team = team.clone().disabled();
        Ok(())
    }

    /// Move a user to another team outside any reassignment workflow.
    ///
    /// Stands in for administrative membership edits made elsewhere.
    pub async fn move_user(
        &self,
        user_id: &UserId,
        team_id: Option<TeamId>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| StorageError::not_found("user", user_id))?;
        user.team_id = team_id;
        Ok(())
    }

    /// Re-own a single record outside any reassignment workflow.
    pub async fn set_record_owner(
        &self,
        kind: EntityKind,
        record_id: &RecordId,
        owner_id: UserId,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let record = state
            .records
            .get_mut(&kind)
            .and_then(|by_id| by_id.get_mut(record_id))
            .ok_or_else(|| StorageError::not_found(kind.as_str(), record_id))?;
        record.transfer_to(owner_id);
        Ok(())
    }

    /// Every record of a kind, unfiltered.
    pub async fn records(&self, kind: EntityKind) -> Vec<OwnedRecord> {
        let state = self.state.read().await;
        state
            .records
            .get(&kind)
            .map(|by_id| by_id.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Make the next `transfer_ownership` call inside a transaction fail.
    pub fn fail_next_transfer(&self) {
        self.faults.fail_next_transfer.store(true, Ordering::SeqCst);
    }

    /// Make the next transaction commit fail.
    pub fn fail_next_commit(&self) {
        self.faults.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Get storage statistics for debugging and monitoring.
    pub async fn stats(&self) -> InMemoryStorageStats {
        let state = self.state.read().await;
        InMemoryStorageStats {
            company_count: state.companies.len(),
            team_count: state.teams.len(),
            user_count: state.users.len(),
            record_count: state.records.values().map(BTreeMap::len).sum(),
        }
    }

    /// Clear all data (useful for testing).
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = State::default();
    }
}

impl Directory for InMemoryStorage {
    async fn company(&self, id: &CompanyId) -> Result<Option<Company>, StorageError> {
        Ok(self.state.read().await.companies.get(id).cloned())
    }

    async fn team(&self, id: &TeamId) -> Result<Option<Team>, StorageError> {
        Ok(self.state.read().await.teams.get(id).cloned())
    }

    async fn user(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn team_member_ids(&self, team_id: &TeamId) -> Result<BTreeSet<UserId>, StorageError> {
        Ok(self.state.read().await.team_member_ids(team_id))
    }

    async fn visible_team_ids(&self, user_id: &UserId) -> Result<BTreeSet<TeamId>, StorageError> {
        Ok(self
            .state
            .read()
            .await
            .visibility
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn users_matching(&self, predicate: &Predicate) -> Result<Vec<User>, StorageError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|user| predicate.matches(*user))
            .cloned()
            .collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }
}

impl RecordStore for InMemoryStorage {
    async fn count_matching(&self, predicate: &Predicate) -> Result<usize, StorageError> {
        let state = self.state.read().await;
        Ok(state.matching(predicate).count())
    }

    async fn find_matching(&self, predicate: &Predicate) -> Result<Vec<OwnedRecord>, StorageError> {
        let state = self.state.read().await;
        Ok(state.matching(predicate).cloned().collect())
    }
}

impl TransactionalStore for InMemoryStorage {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction, StorageError> {
        let guard = Arc::clone(&self.state).write_owned().await;
        let working = guard.clone();
        trace!("in-memory transaction opened");
        Ok(InMemoryTransaction {
            guard,
            working,
            faults: Arc::clone(&self.faults),
        })
    }
}

/// Transaction over [`InMemoryStorage`].
///
/// Holds the store's write lock until committed or dropped.
pub struct InMemoryTransaction {
    guard: OwnedRwLockWriteGuard<State>,
    working: State,
    faults: Arc<FaultPlan>,
}

impl StoreTransaction for InMemoryTransaction {
    async fn user(&mut self, id: &UserId) -> Result<Option<User>, StorageError> {
        Ok(self.working.users.get(id).cloned())
    }

    async fn team(&mut self, id: &TeamId) -> Result<Option<Team>, StorageError> {
        Ok(self.working.teams.get(id).cloned())
    }

    async fn count_matching(&mut self, predicate: &Predicate) -> Result<usize, StorageError> {
        Ok(self.working.matching(predicate).count())
    }

    async fn set_user_team(
        &mut self,
        user_id: &UserId,
        team_id: Option<TeamId>,
    ) -> Result<(), StorageError> {
        let user = self
            .working
            .users
            .get_mut(user_id)
            .ok_or_else(|| StorageError::not_found("user", user_id))?;
        user.team_id = team_id;
        Ok(())
    }

    async fn set_team_lead(
        &mut self,
        team_id: &TeamId,
        lead_id: Option<UserId>,
    ) -> Result<(), StorageError> {
        let team = self
            .working
            .teams
            .get_mut(team_id)
            .ok_or_else(|| StorageError::not_found("team", team_id))?;
        team.lead_id = lead_id;
        Ok(())
    }

    async fn transfer_ownership(
        &mut self,
        predicate: &Predicate,
        new_owner: &UserId,
    ) -> Result<usize, StorageError> {
        if self.faults.fail_next_transfer.swap(false, Ordering::SeqCst) {
            return Err(StorageError::unavailable("injected transfer failure"));
        }
        let Some(by_id) = self.working.records.get_mut(&predicate.entity()) else {
            return Ok(0);
        };
        let mut moved = 0;
        for record in by_id.values_mut().filter(|record| predicate.matches(&**record)) {
            record.transfer_to(*new_owner);
            moved += 1;
        }
        Ok(moved)
    }

    async fn commit(self) -> Result<(), StorageError> {
        if self.faults.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StorageError::unavailable("injected commit failure"));
        }
        let InMemoryTransaction {
            mut guard, working, ..
        } = self;
        *guard = working;
        debug!("in-memory transaction committed");
        Ok(())
    }
}
