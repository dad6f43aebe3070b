//! Query scoping.
//!
//! - [`Predicate`] / [`Constraint`] - what a storage query must apply
//! - [`ScopingEngine`] - derives predicates from a tenant context and checks
//!   single-record reads, writes and creates

pub mod engine;
pub mod predicate;


pub use engine::ScopingEngine;
pub use predicate::{Constraint, Predicate};
