//! Engine configuration.
//!
//! The role table itself is compiled in. What an operator can tune is policy
//! around it: how team leads are handled during reassignment, whether
//! platform admins may narrow their view to one company, and which entity
//! kinds reassignment counts and moves.
//!
//! ```rust
//! use tenant_scope::config::{EngineConfig, SuccessorPolicy};
//!
//! let config = EngineConfig::from_json(r#"{ "successor_policy": "clear_lead" }"#).unwrap();
//! assert_eq!(config.successor_policy, SuccessorPolicy::ClearLead);
//! assert!(config.allow_company_impersonation);
//! ```

use crate::model::EntityKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Configuration validation failed: {message}")]
    ValidationError { message: String },
    #[error("Serialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },
}

/// What happens when the user being moved is the lead of their source team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessorPolicy {
    /// Reject the move unless the request names a successor.
    #[default]
    RequireSuccessor,
    /// Clear the lead; a named successor is still honoured.
    ClearLead,
    /// Leave the lead reference pointing at the departed user.
    KeepLead,
}

/// Tunable policy for the scoping engine and reassignment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub successor_policy: SuccessorPolicy,
    /// Let platform admins pass a target company to `scope_filter`.
    pub allow_company_impersonation: bool,
    /// Entity kinds counted by previews and moved by transfers.
    pub transfer_kinds: Vec<EntityKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            successor_policy: SuccessorPolicy::default(),
            allow_company_impersonation: true,
            transfer_kinds: EntityKind::OWNED.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_successor_policy(mut self, policy: SuccessorPolicy) -> Self {
        self.successor_policy = policy;
        self
    }

    pub fn with_company_impersonation(mut self, allowed: bool) -> Self {
        self.allow_company_impersonation = allowed;
        self
    }

    pub fn with_transfer_kinds(mut self, kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        self.transfer_kinds = kinds.into_iter().collect();
        self
    }

    /// Validate the configuration for consistency.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.transfer_kinds.is_empty() {
            return Err(ConfigurationError::ValidationError {
                message: "transfer_kinds must not be empty".to_string(),
            });
        }
        if let Some(kind) = self.transfer_kinds.iter().find(|k| !k.is_owned_record()) {
            return Err(ConfigurationError::ValidationError {
                message: format!("{} records are not owned and cannot be transferred", kind),
            });
        }
        let mut seen = self.transfer_kinds.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != self.transfer_kinds.len() {
            return Err(ConfigurationError::ValidationError {
                message: "transfer_kinds contains duplicates".to_string(),
            });
        }
        Ok(())
    }
}
