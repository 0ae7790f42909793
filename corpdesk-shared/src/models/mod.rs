/// Database models for corpdesk
///
/// This module contains all database models and their row-level operations.
///
/// # Models
///
/// - `user`: User accounts; a user owns companies
/// - `company`: Companies (soft-deletable) and the shared [`company::Status`]
/// - `add`: Dependent records of a company whose status mirrors it
///
/// Cross-entity rules (status propagation, cascading deletes) live in
/// [`crate::cascade`], not here.
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
///     name: "John Doe".to_string(),
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod add;
pub mod company;
pub mod user;
