/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user accounts.
/// A user owns zero or more companies (see [`crate::models::company`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX users_email_key ON users (LOWER(email));
/// ```
///
/// Every query takes any Postgres executor, so the same functions run against
/// the pool or inside a transaction (`&mut *tx`).
///
/// # Example
///
/// ```no_run
/// use corpdesk_shared::models::user::{User, CreateUser};
/// use corpdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     name: "Jane Doe".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// let found = User::find_by_email(&pool, "JANE@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address, unique across all users (case-insensitive)
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the user account was created
    pub created_at: DateTime<Utc>,

    /// When the user account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,
}

impl UpdateUser {
    /// Returns true when no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique index `users_email_key`)
    /// - Database connection fails
    pub async fn create<'e, E>(executor: E, data: CreateUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.name)
            .bind(data.email)
            .bind(data.password_hash)
            .fetch_one(executor)
            .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use corpdesk_shared::models::user::User;
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool, user_id: i64) -> Result<(), sqlx::Error> {
    /// if let Some(user) = User::find_by_id(&pool, user_id).await? {
    ///     println!("Found user: {}", user.email);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    /// Finds a user by ID and locks the row until the surrounding transaction ends
    ///
    /// Only meaningful inside a transaction.
    pub async fn find_by_id_for_update<'e, E>(
        executor: E,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {} FROM users WHERE id = $1 FOR UPDATE", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    /// Checks whether an email is already used by a user other than `except_id`
    ///
    /// Pass `None` when creating a user, or the user's own ID when updating.
    pub async fn email_taken<'e, E>(
        executor: E,
        email: &str,
        except_id: Option<i64>,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE LOWER(email) = LOWER($1)
                  AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except_id)
        .fetch_one(executor)
        .await?;

        Ok(taken)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at` timestamp
    /// is automatically set to the current time.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if user doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists for another user
    /// - Database connection fails
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", USER_COLUMNS));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }

        let user = q.fetch_optional(executor).await?;

        Ok(user)
    }

    /// Deletes a user row by ID
    ///
    /// This does not touch the user's companies; the foreign key rejects the
    /// delete while any remain. Use [`crate::cascade::CascadeEngine::delete_user`]
    /// to remove a user together with everything they own.
    ///
    /// # Returns
    ///
    /// True if user was deleted, false if user didn't exist
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users with pagination, oldest first
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use corpdesk_shared::models::user::User;
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// let page1 = User::list(&pool, 10, 0).await?;
    /// let page2 = User::list(&pool, 10, 10).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list<'e, E>(executor: E, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {} FROM users ORDER BY id ASC LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );

        let users = sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(executor)
            .await?;

        Ok(count)
    }
}
