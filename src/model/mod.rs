//! Data model: tenants, teams, users and the records they own.

pub mod ids;
pub mod organization;
pub mod record;
pub mod user;

pub use ids::{CompanyId, RecordId, TeamId, UserId};
pub use organization::{Company, CompanyStatus, Team, TeamStatus};
pub use record::{EntityKind, OwnedRecord, RecordStamp, Scoped};
pub use user::User;
