//! Moving users between teams.
//!
//! - [`TeamReassignmentService`] - preview, validate and apply
//! - [`ImpactReport`] - per-kind counts of what a user owns
//! - [`ReassignmentRequest`] / [`ReassignmentOutcome`] - apply input and result

pub mod report;
pub mod service;


pub use report::{ImpactReport, LeadHandoff, ReassignmentOutcome, ReassignmentRequest};
pub use service::{ReassignmentPlan, TeamReassignmentService};
