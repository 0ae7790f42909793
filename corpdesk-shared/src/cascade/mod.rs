/// Cascade rule engine
///
/// Enforces the cross-entity rules between users, companies and adds:
///
/// - When a company's `status` changes, every add of that company takes the new
///   status, inside the same transaction as the company update.
/// - When a user is deleted, every company they own (soft-deleted ones
///   included) is deleted with them; each company's adds are then handled
///   according to the configured [`AddDeletePolicy`].
///
/// Nothing here is implicit. [`CascadeEngine`] is the only entry point for
/// company mutations and user deletion; it opens a transaction, performs the
/// row change, and calls every registered [`CompanyObserver`] hook with the
/// live connection before committing.
///
/// # Modules
///
/// - `rules`: the propagation and deletion rules as plain functions
/// - `observer`: lifecycle hook trait and the built-in status propagation
/// - `engine`: transactional orchestration
///
/// # Example
///
/// ```no_run
/// use corpdesk_shared::cascade::{CascadeConfig, CascadeEngine};
/// use corpdesk_shared::models::company::{Status, UpdateCompany};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let engine = CascadeEngine::new(pool, CascadeConfig::default());
///
/// // Every add of company 42 becomes suspended in the same transaction
/// engine
///     .update_company(42, UpdateCompany {
///         status: Some(Status::Suspended),
///         ..Default::default()
///     })
///     .await?;
///
/// // Removes the user, their companies and the companies' adds
/// engine.delete_user(7).await?;
/// # Ok(())
/// # }
/// ```

pub mod engine;
pub mod observer;
pub mod rules;

pub use engine::{CascadeEngine, UserDeletion};
pub use observer::{CompanyObserver, StatusPropagation};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cascade error types
#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    /// Underlying database failure; the transaction has been rolled back
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A company still has adds and the policy forbids deleting them
    #[error("Company {company_id} still has {adds} add(s)")]
    Restricted { company_id: i64, adds: i64 },

    /// A company was pointed at a user that doesn't exist
    #[error("User {0} does not exist")]
    OwnerNotFound(i64),

    /// A lifecycle hook rejected the mutation
    #[error("Observer '{observer}' failed: {message}")]
    Observer { observer: String, message: String },
}

/// Cascade result type alias
pub type CascadeResult<T> = Result<T, CascadeError>;

/// What happens to a company's adds when the company is permanently deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddDeletePolicy {
    /// Delete the adds together with the company
    #[default]
    Delete,

    /// Refuse to delete a company that still has adds
    Restrict,
}

impl AddDeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddDeletePolicy::Delete => "delete",
            AddDeletePolicy::Restrict => "restrict",
        }
    }

    /// Parses the policy name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delete" | "cascade" => Some(AddDeletePolicy::Delete),
            "restrict" => Some(AddDeletePolicy::Restrict),
            _ => None,
        }
    }
}

impl fmt::Display for AddDeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cascade engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Policy for adds when their company is permanently deleted
    pub add_policy: AddDeletePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_policy_parse() {
        assert_eq!(AddDeletePolicy::parse("delete"), Some(AddDeletePolicy::Delete));
        assert_eq!(AddDeletePolicy::parse("CASCADE"), Some(AddDeletePolicy::Delete));
        assert_eq!(AddDeletePolicy::parse(" restrict "), Some(AddDeletePolicy::Restrict));
        assert_eq!(AddDeletePolicy::parse("nullify"), None);
    }

    #[test]
    fn test_default_config_deletes_adds() {
        assert_eq!(CascadeConfig::default().add_policy, AddDeletePolicy::Delete);
    }

    #[test]
    fn test_restricted_error_message() {
        let err = CascadeError::Restricted {
            company_id: 12,
            adds: 3,
        };
        assert_eq!(err.to_string(), "Company 12 still has 3 add(s)");
    }
}
