/// Company model and database operations
///
/// A company belongs to exactly one user and owns zero or more adds
/// (see [`crate::models::add`]). Companies are soft-deleted by default:
/// `deleted_at` is set and the row is hidden from the regular lookups until it
/// is restored or force-deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE companies (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users (id),
///     name VARCHAR(255) NOT NULL,
///     status VARCHAR(32) NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ,
///     CONSTRAINT companies_status_check CHECK (
///         status IN ('active', 'inactive', 'suspended')
///     )
/// );
/// ```
///
/// Mutations that must fire lifecycle hooks (status propagation, cascading
/// deletes) go through [`crate::cascade::CascadeEngine`]; the functions here
/// are the raw row operations it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use std::fmt;

const COMPANY_COLUMNS: &str = "id, user_id, name, status, created_at, updated_at, deleted_at";

/// Status shared by companies and their adds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// Error returned when a stored or submitted status is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}' (expected active, inactive or suspended)")]
pub struct StatusParseError(pub String);

impl Status {
    /// All known statuses, in declaration order
    pub const ALL: [Status; 3] = [Status::Active, Status::Inactive, Status::Suspended];

    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Suspended => "suspended",
        }
    }

    /// Parses status from its stored form
    pub fn parse(s: &str) -> Result<Self, StatusParseError> {
        match s {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            "suspended" => Ok(Status::Suspended),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Status {
    type Error = StatusParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Status::parse(&value)
    }
}

/// Company model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    /// Unique company ID
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Company name
    pub name: String,

    /// Current status, mirrored onto every add of this company
    #[sqlx(try_from = "String")]
    pub status: Status,

    /// When the company was created
    pub created_at: DateTime<Utc>,

    /// When the company was last updated
    pub updated_at: DateTime<Utc>,

    /// Set when the company is soft-deleted
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Company {
    /// Whether the company is currently soft-deleted
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating a new company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Owning user
    pub user_id: i64,

    /// Company name
    pub name: String,

    /// Initial status (defaults to Active)
    #[serde(default)]
    pub status: Status,
}

/// Input for updating an existing company
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompany {
    /// New owner
    pub user_id: Option<i64>,

    /// New name
    pub name: Option<String>,

    /// New status
    pub status: Option<Status>,
}

impl Company {
    /// Creates a new company
    ///
    /// # Errors
    ///
    /// Returns an error if the owning user does not exist (foreign key
    /// violation) or the database connection fails.
    pub async fn create<'e, E>(executor: E, data: CreateCompany) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO companies (user_id, name, status) VALUES ($1, $2, $3) RETURNING {}",
            COMPANY_COLUMNS
        );

        let company = sqlx::query_as::<_, Company>(&query)
            .bind(data.user_id)
            .bind(data.name)
            .bind(data.status.as_str())
            .fetch_one(executor)
            .await?;

        Ok(company)
    }

    /// Finds a live (not soft-deleted) company by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {} FROM companies WHERE id = $1 AND deleted_at IS NULL",
            COMPANY_COLUMNS
        );

        let company = sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(company)
    }

    /// Finds a company by ID and locks the row until the transaction ends
    ///
    /// Soft-deleted rows are included when `with_trashed` is true.
    pub async fn find_for_update<'e, E>(
        executor: E,
        id: i64,
        with_trashed: bool,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {} FROM companies WHERE id = $1 AND ($2 OR deleted_at IS NULL) FOR UPDATE",
            COMPANY_COLUMNS
        );

        let company = sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .bind(with_trashed)
            .fetch_optional(executor)
            .await?;

        Ok(company)
    }

    /// Updates a live company
    ///
    /// Only non-None fields in `data` are written. Returns None when the
    /// company doesn't exist or is soft-deleted.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: UpdateCompany,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("UPDATE companies SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.user_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", user_id = ${}", bind_count));
        }
        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            COMPANY_COLUMNS
        ));

        let mut q = sqlx::query_as::<_, Company>(&query).bind(id);

        if let Some(user_id) = data.user_id {
            q = q.bind(user_id);
        }
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }

        let company = q.fetch_optional(executor).await?;

        Ok(company)
    }

    /// Soft-deletes a live company
    ///
    /// Returns the trashed row, or None if it was missing or already trashed.
    pub async fn soft_delete<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE companies SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            COMPANY_COLUMNS
        );

        let company = sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(company)
    }

    /// Restores a soft-deleted company
    ///
    /// Returns None if the company doesn't exist or isn't trashed.
    pub async fn restore<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE companies SET deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NOT NULL RETURNING {}",
            COMPANY_COLUMNS
        );

        let company = sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(company)
    }

    /// Permanently deletes a company row, trashed or not
    ///
    /// The company's adds must already be gone; the foreign key rejects the
    /// delete otherwise.
    pub async fn force_delete<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("DELETE FROM companies WHERE id = $1 RETURNING {}", COMPANY_COLUMNS);

        let company = sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(company)
    }

    /// Permanently deletes every company owned by a user, trashed ones included
    ///
    /// Returns the deleted rows.
    pub async fn force_delete_by_user<'e, E>(
        executor: E,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "DELETE FROM companies WHERE user_id = $1 RETURNING {}",
            COMPANY_COLUMNS
        );

        let companies = sqlx::query_as::<_, Company>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await?;

        Ok(companies)
    }

    /// IDs of every company owned by a user, trashed ones included
    pub async fn ids_by_user<'e, E>(executor: E, user_id: i64) -> Result<Vec<i64>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM companies WHERE user_id = $1 ORDER BY id")
                .bind(user_id)
                .fetch_all(executor)
                .await?;

        Ok(ids)
    }

    /// Lists live companies, optionally filtered by owner, oldest first
    pub async fn list<'e, E>(
        executor: E,
        user_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {} FROM companies \
             WHERE deleted_at IS NULL AND ($1::BIGINT IS NULL OR user_id = $1) \
             ORDER BY id ASC LIMIT $2 OFFSET $3",
            COMPANY_COLUMNS
        );

        let companies = sqlx::query_as::<_, Company>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await?;

        Ok(companies)
    }

    /// Counts live companies, optionally filtered by owner
    pub async fn count<'e, E>(executor: E, user_id: Option<i64>) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM companies \
             WHERE deleted_at IS NULL AND ($1::BIGINT IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// Counts all companies of a user, trashed ones included
    pub async fn count_by_user_with_trashed<'e, E>(
        executor: E,
        user_id: i64,
    ) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(Status::Active.as_str(), "active");
        assert_eq!(Status::Inactive.as_str(), "inactive");
        assert_eq!(Status::Suspended.as_str(), "suspended");
    }

    #[test]
    fn test_status_parse() {
        for status in Status::ALL {
            assert_eq!(Status::parse(status.as_str()), Ok(status));
        }
        assert_eq!(
            Status::parse("closed"),
            Err(StatusParseError("closed".to_string()))
        );
        assert!(Status::parse("Active").is_err());
    }

    #[test]
    fn test_status_serde_uses_lowercase() {
        assert_eq!(serde_json::to_value(Status::Suspended).unwrap(), "suspended");
        let parsed: Status = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(parsed, Status::Inactive);
    }

    #[test]
    fn test_create_company_default_status() {
        let create: CreateCompany =
            serde_json::from_value(serde_json::json!({ "user_id": 1, "name": "Acme" })).unwrap();
        assert_eq!(create.status, Status::Active);
    }

    #[test]
    fn test_is_trashed() {
        let mut company = Company {
            id: 1,
            user_id: 1,
            name: "Acme".to_string(),
            status: Status::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        assert!(!company.is_trashed());

        company.deleted_at = Some(Utc::now());
        assert!(company.is_trashed());
    }
}
