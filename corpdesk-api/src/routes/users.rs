/// User endpoints
///
/// # Endpoints
///
/// - `GET /api/users` - List users
/// - `POST /api/users` - Create user
/// - `GET /api/users/:id` - Show user
/// - `PUT /api/users/:id` - Update user
/// - `DELETE /api/users/:id` - Delete user and every company they own
///
/// Password hashes are never serialized.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{not_blank, not_found, parse_id, DataResponse, ListResponse, Pagination},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use corpdesk_shared::{
    auth::password,
    models::user::{CreateUser, UpdateUser, User},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};

/// Field a confirmation mismatch is reported under
const CONFIRMATION_FIELD: &str = "password_confirmation";

/// Create user request
///
/// Missing fields deserialize as empty so they are reported by validation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateUserRequest {
    #[validate(
        custom(function = "not_blank", message = "The name field is required"),
        length(max = 255, message = "The name may not be greater than 255 characters")
    )]
    pub name: String,

    #[validate(
        email(message = "The email must be a valid email address"),
        length(max = 255, message = "The email may not be greater than 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 6, message = "The password must be at least 6 characters"))]
    pub password: String,

    #[validate(must_match(
        other = "password",
        message = "The password confirmation does not match"
    ))]
    pub password_confirmation: String,
}

/// Update user request
///
/// Every field is optional; a new password needs a matching confirmation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "confirmation_matches", skip_on_field_errors = false))]
pub struct UpdateUserRequest {
    #[validate(
        custom(function = "not_blank", message = "The name field must not be empty"),
        length(max = 255, message = "The name may not be greater than 255 characters")
    )]
    pub name: Option<String>,

    #[validate(
        email(message = "The email must be a valid email address"),
        length(max = 255, message = "The email may not be greater than 255 characters")
    )]
    pub email: Option<String>,

    #[validate(length(min = 6, message = "The password must be at least 6 characters"))]
    pub password: Option<String>,

    pub password_confirmation: Option<String>,
}

/// A password and its confirmation travel together or not at all
fn confirmation_matches(req: &UpdateUserRequest) -> Result<(), ValidationError> {
    if req.password != req.password_confirmation {
        return Err(ValidationError::new(CONFIRMATION_FIELD)
            .with_message("The password confirmation does not match".into()));
    }

    Ok(())
}

/// Delete user response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    /// ID of the deleted user
    pub id: i64,

    /// Companies removed with the user
    pub companies_deleted: usize,

    /// Adds removed with those companies
    pub adds_deleted: u64,
}

/// List users
///
/// ```text
/// GET /api/users?limit=50&offset=0
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: `limit` or `offset` is not an integer
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Json<ListResponse<User>>> {
    let Query(page) = query?;

    let users = User::list(&state.db, page.limit(), page.offset()).await?;
    let total = User::count(&state.db).await?;

    Ok(Json(ListResponse {
        data: users,
        meta: page.meta(total),
    }))
}

/// Create a user
///
/// ```text
/// POST /api/users
/// Content-Type: application/json
///
/// {
///   "name": "Jane Doe",
///   "email": "jane@example.com",
///   "password": "secret123",
///   "password_confirmation": "secret123"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed or email already taken
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<User>>> {
    let Json(req) = payload?;
    req.validate()?;

    if User::email_taken(&state.db, &req.email, None).await? {
        return Err(ApiError::email_taken());
    }

    let password_hash = password::hash_password_blocking(req.password).await?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    info!(user_id = user.id, "User created");

    Ok(Json(DataResponse::new(user)))
}

/// Show a user
///
/// # Errors
///
/// - `404 Not Found`: unknown or non-numeric ID
pub async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<User>>> {
    let id = parse_id(&id, "User")?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found("User"))?;

    Ok(Json(DataResponse::new(user)))
}

/// Update a user
///
/// # Errors
///
/// - `404 Not Found`: unknown user
/// - `422 Unprocessable Entity`: validation failed or email used by another user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<User>>> {
    let id = parse_id(&id, "User")?;
    let Json(req) = payload?;
    req.validate()?;

    let existing = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found("User"))?;

    if let Some(email) = &req.email {
        if User::email_taken(&state.db, email, Some(id)).await? {
            return Err(ApiError::email_taken());
        }
    }

    let password_hash = match req.password {
        Some(password) => Some(password::hash_password_blocking(password).await?),
        None => None,
    };

    let changes = UpdateUser {
        name: req.name,
        email: req.email,
        password_hash,
    };

    if changes.is_empty() {
        return Ok(Json(DataResponse::new(existing)));
    }

    let user = User::update(&state.db, id, changes)
        .await?
        .ok_or_else(|| not_found("User"))?;

    info!(user_id = id, "User updated");

    Ok(Json(DataResponse::new(user)))
}

/// Delete a user
///
/// Every company the user owns is removed in the same transaction, soft-deleted
/// ones included, with their adds handled per the configured add policy.
///
/// # Response
///
/// ```json
/// { "data": { "id": 7, "companies_deleted": 30, "adds_deleted": 0 } }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: unknown user
/// - `409 Conflict`: the add policy is `restrict` and a company still has adds
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<DeleteUserResponse>>> {
    let id = parse_id(&id, "User")?;

    let deletion = state
        .cascade
        .delete_user(id)
        .await?
        .ok_or_else(|| not_found("User"))?;

    Ok(Json(DataResponse::new(DeleteUserResponse {
        id: deletion.user.id,
        companies_deleted: deletion.companies_deleted,
        adds_deleted: deletion.adds_deleted,
    })))
}
