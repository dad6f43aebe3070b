//! Tenant authorization and data scoping for multi-company applications.
//!
//! Every request is resolved to a [`TenantContext`]: who is acting, for which
//! company, from which team, with which role. The [`ScopingEngine`] turns that
//! context into the [`Predicate`] each storage query must apply, so a
//! contributor sees only what they own, a team manager sees their team, a
//! company admin sees their company and a platform admin sees everything.
//!
//! Moving a user between teams changes those answers for other people, so
//! [`TeamReassignmentService`] previews the impact and applies the move,
//! ownership transfer included, in one transaction.
//!
//! # Core Components
//!
//! - [`role`] - the fixed role to capability table
//! - [`context`] - tenant context and its resolution from the directory
//! - [`scoping`] - predicates and single-record authorization
//! - [`reassignment`] - preview, validate and apply team moves
//! - [`storage`] - storage seams and the in-memory backend
//!
//! # Quick Start
//!
//! ```rust
//! use tenant_scope::model::{Company, EntityKind, Team, User};
//! use tenant_scope::role::Role;
//! use tenant_scope::storage::InMemoryStorage;
//! use tenant_scope::{DirectoryTenantResolver, ScopeLevel, ScopingEngine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//! let company = storage.insert_company(Company::new("Acme")).await;
//! let team = storage.insert_team(Team::new(company.id, "Sales")).await;
//! let manager = storage
//!     .insert_user(User::new(company.id, Role::TeamManager, "Mia").on_team(team.id))
//!     .await;
//!
//! let resolver = DirectoryTenantResolver::new(storage.clone());
//! let ctx = resolver.resolve_user(&manager.id).await?;
//!
//! let engine = ScopingEngine::new(storage);
//! let predicate = engine.scope_filter(EntityKind::Deal, &ctx, None).await?;
//! assert_eq!(predicate.level(), ScopeLevel::Team);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod reassignment;
pub mod role;
pub mod scoping;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{ConfigurationError, EngineConfig, SuccessorPolicy};
pub use context::{ActorIdentity, DirectoryTenantResolver, ScopeLevel, TenantContext, TenantResolver};
pub use error::{ErrorKind, ScopeError, ScopeResult};
pub use reassignment::{
    ImpactReport, ReassignmentOutcome, ReassignmentRequest, TeamReassignmentService,
};
pub use role::{Capability, Role, has_capability};
pub use scoping::{Constraint, Predicate, ScopingEngine};
pub use storage::{InMemoryStorage, StorageError};
