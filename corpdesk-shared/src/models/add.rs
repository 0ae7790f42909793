/// Add model and database operations
///
/// An add is a dependent record of a company. Its `status` mirrors the owning
/// company's status: whenever the company's status changes, every add is
/// rewritten by [`crate::cascade::rules::propagate_status`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE adds (
///     id BIGSERIAL PRIMARY KEY,
///     company_id BIGINT NOT NULL REFERENCES companies (id),
///     title VARCHAR(255) NOT NULL,
///     status VARCHAR(32) NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use crate::models::company::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

const ADD_COLUMNS: &str = "id, company_id, title, status, created_at, updated_at";

/// Add model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Add {
    /// Unique add ID
    pub id: i64,

    /// Owning company
    pub company_id: i64,

    /// Title
    pub title: String,

    /// Status, kept equal to the owning company's status
    #[sqlx(try_from = "String")]
    pub status: Status,

    /// When the add was created
    pub created_at: DateTime<Utc>,

    /// When the add was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new add
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdd {
    /// Owning company
    pub company_id: i64,

    /// Title
    pub title: String,

    /// Initial status
    pub status: Status,
}

impl Add {
    /// Creates a new add
    pub async fn create<'e, E>(executor: E, data: CreateAdd) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO adds (company_id, title, status) VALUES ($1, $2, $3) RETURNING {}",
            ADD_COLUMNS
        );

        let add = sqlx::query_as::<_, Add>(&query)
            .bind(data.company_id)
            .bind(data.title)
            .bind(data.status.as_str())
            .fetch_one(executor)
            .await?;

        Ok(add)
    }

    /// Lists every add of a company, oldest first
    pub async fn list_by_company<'e, E>(
        executor: E,
        company_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {} FROM adds WHERE company_id = $1 ORDER BY id ASC",
            ADD_COLUMNS
        );

        let adds = sqlx::query_as::<_, Add>(&query)
            .bind(company_id)
            .fetch_all(executor)
            .await?;

        Ok(adds)
    }

    /// Sets the status of every add of a company
    ///
    /// Returns the number of rows written.
    pub async fn update_status_by_company<'e, E>(
        executor: E,
        company_id: i64,
        status: Status,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE adds
            SET status = $2, updated_at = NOW()
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .bind(status.as_str())
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Counts adds per company for the given companies
    ///
    /// Companies without adds are omitted. Ordered by company ID.
    pub async fn counts_by_company<'e, E>(
        executor: E,
        company_ids: &[i64],
    ) -> Result<Vec<(i64, i64)>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let counts: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT company_id, COUNT(*)
            FROM adds
            WHERE company_id = ANY($1)
            GROUP BY company_id
            ORDER BY company_id
            "#,
        )
        .bind(company_ids)
        .fetch_all(executor)
        .await?;

        Ok(counts)
    }

    /// Deletes every add belonging to any of the given companies
    ///
    /// Returns the number of rows deleted.
    pub async fn delete_by_companies<'e, E>(
        executor: E,
        company_ids: &[i64],
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM adds WHERE company_id = ANY($1)")
            .bind(company_ids)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_serializes_status_lowercase() {
        let add = Add {
            id: 3,
            company_id: 9,
            title: "Spring promo".to_string(),
            status: Status::Inactive,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&add).unwrap();
        assert_eq!(json["status"], "inactive");
        assert_eq!(json["company_id"], 9);
    }
}
