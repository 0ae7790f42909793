/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`, which converts to a JSON body
/// of the form:
///
/// ```json
/// {
///   "error": "validation_error",
///   "message": "The given data was invalid",
///   "error_list": [{ "field": "email", "message": "The email has already been taken" }]
/// }
/// ```
///
/// `error_list` is always present, empty for errors that aren't tied to a
/// field.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use corpdesk_shared::{auth::password::PasswordError, cascade::CascadeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the unique index on `users.email`
const USERS_EMAIL_KEY: &str = "users_email_key";

/// Key validator files struct-level (schema) errors under
const SCHEMA_ERRORS_KEY: &str = "__all__";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. a delete blocked by the add policy
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "validation_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Per-field errors
    pub error_list: Vec<ValidationErrorDetail>,
}

impl ApiError {
    /// Single-field validation error
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }

    /// The duplicate-email validation error
    pub fn email_taken() -> Self {
        Self::invalid("email", "The email has already been taken")
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error_code, message, error_list) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, Vec::new()),
            ApiError::NotFound(msg) => ("not_found", msg, Vec::new()),
            ApiError::Conflict(msg) => ("conflict", msg, Vec::new()),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "The given data was invalid".to_string(),
                errors,
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            error_list,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // A concurrent insert can still hit the unique index after the pre-check
                if db_err.constraint() == Some(USERS_EMAIL_KEY) {
                    return ApiError::email_taken();
                }

                if db_err.is_foreign_key_violation() {
                    return ApiError::invalid("user_id", "The selected user does not exist");
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert cascade errors to API errors
impl From<CascadeError> for ApiError {
    fn from(err: CascadeError) -> Self {
        match err {
            CascadeError::Database(e) => e.into(),
            CascadeError::Restricted { .. } => ApiError::Conflict(err.to_string()),
            CascadeError::OwnerNotFound(_) => {
                ApiError::invalid("user_id", "The selected user does not exist")
            }
            CascadeError::Observer { .. } => ApiError::InternalError(err.to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JSON body rejections to API errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid("body", rejection.body_text())
    }
}

/// Convert query string rejections to API errors
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convert validator errors to API errors
///
/// Struct-level errors are reported under their error code, which names the
/// field they concern. Fields are reported in name order so responses are
/// stable.
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let field = if field == SCHEMA_ERRORS_KEY {
                        error.code.to_string()
                    } else {
                        field.to_string()
                    };

                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("The {} field is invalid", field));

                    ValidationErrorDetail { field, message }
                })
            })
            .collect();

        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}
