//! Actor and tenant context model.
//!
//! - [`TenantContext`] - resolved per-request actor
//! - [`TenantResolver`] - identity to context resolution
//! - [`ScopeLevel`] - the breadth of visibility an actor is granted

pub mod resolver;
pub mod tenant;

pub use resolver::{DirectoryTenantResolver, TenantResolver};
pub use tenant::{ActorIdentity, ScopeLevel, TenantContext};
