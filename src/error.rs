//! Error types for scoping and reassignment operations.
//!
//! Every failure the engine can report maps onto one of a small set of
//! [`ErrorKind`]s. Operators get the precise kind through logging; end users
//! only ever see [`ScopeError::public_message`], which never confirms the
//! existence of out-of-scope data.

use crate::model::{CompanyId, EntityKind, TeamId, UserId};
use crate::storage::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for tenant scoping operations.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// The identity record references a missing or disabled company or team.
    #[error("Tenant invalid for user {user_id}: {reason}")]
    TenantInvalid { user_id: UserId, reason: String },

    /// The actor has no visibility of the targeted record or action.
    #[error("Scope violation on {entity}: {reason}")]
    ScopeViolation { entity: EntityKind, reason: String },

    /// The actor lacks the capability to invoke the operation at all.
    #[error("Forbidden: {operation} requires {required}")]
    Forbidden { operation: String, required: String },

    /// Ownership changed between preview and apply.
    #[error("Preview stale for user {user_id}: expected {expected} records, found {actual}")]
    PreviewStale {
        user_id: UserId,
        expected: usize,
        actual: usize,
    },

    /// Reassignment destination team or owner is not acceptable.
    #[error("Invalid destination: {reason}")]
    InvalidDestination { reason: String },

    /// The storage backend failed; the operation may be retried.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for scoping operations.
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Coarse classification of a [`ScopeError`], suitable for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    TenantInvalid,
    ScopeViolation,
    Forbidden,
    PreviewStale,
    InvalidDestination,
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::TenantInvalid => "TENANT_INVALID",
            ErrorKind::ScopeViolation => "SCOPE_VIOLATION",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::PreviewStale => "PREVIEW_STALE",
            ErrorKind::InvalidDestination => "INVALID_DESTINATION",
            ErrorKind::Storage => "STORAGE",
        };
        f.write_str(name)
    }
}

impl ScopeError {
    /// Create a tenant-invalid error.
    pub fn tenant_invalid(user_id: UserId, reason: impl Into<String>) -> Self {
        Self::TenantInvalid {
            user_id,
            reason: reason.into(),
        }
    }

    /// Create a scope violation for an entity kind.
    pub fn scope_violation(entity: EntityKind, reason: impl Into<String>) -> Self {
        Self::ScopeViolation {
            entity,
            reason: reason.into(),
        }
    }

    /// Create a forbidden error naming the missing requirement.
    pub fn forbidden(operation: impl Into<String>, required: impl Into<String>) -> Self {
        Self::Forbidden {
            operation: operation.into(),
            required: required.into(),
        }
    }

    /// Create an invalid-destination error.
    pub fn invalid_destination(reason: impl Into<String>) -> Self {
        Self::InvalidDestination {
            reason: reason.into(),
        }
    }

    pub(crate) fn team_outside_company(team_id: &TeamId, company_id: &CompanyId) -> Self {
        Self::invalid_destination(format!(
            "team {} does not belong to company {}",
            team_id, company_id
        ))
    }

    /// The classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScopeError::TenantInvalid { .. } => ErrorKind::TenantInvalid,
            ScopeError::ScopeViolation { .. } => ErrorKind::ScopeViolation,
            ScopeError::Forbidden { .. } => ErrorKind::Forbidden,
            ScopeError::PreviewStale { .. } => ErrorKind::PreviewStale,
            ScopeError::InvalidDestination { .. } => ErrorKind::InvalidDestination,
            ScopeError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Whether the caller may retry the same operation unchanged.
    ///
    /// Stale previews are retryable after re-running the preview; storage
    /// failures are retryable if the backend reports them as transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScopeError::PreviewStale { .. } => true,
            ScopeError::Storage(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Message safe to show to an end user.
    ///
    /// Scope violations render exactly like a missing record.
    pub fn public_message(&self) -> &'static str {
        match self {
            ScopeError::TenantInvalid { .. } => "Your account is not currently active",
            ScopeError::ScopeViolation { .. } => "Not found",
            ScopeError::Forbidden { .. } => "You do not have permission to perform this action",
            ScopeError::PreviewStale { .. } => {
                "The affected records changed; please review the impact again"
            }
            ScopeError::InvalidDestination { .. } => "The selected destination is not valid",
            ScopeError::Storage(_) => "Temporary failure; please retry",
        }
    }

    /// HTTP-equivalent status the administrative layer should render.
    pub fn status_code(&self) -> u16 {
        match self {
            ScopeError::TenantInvalid { .. } => 401,
            ScopeError::ScopeViolation { .. } => 404,
            ScopeError::Forbidden { .. } => 403,
            ScopeError::PreviewStale { .. } => 409,
            ScopeError::InvalidDestination { .. } => 422,
            ScopeError::Storage(_) => 503,
        }
    }
}
