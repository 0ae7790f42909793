/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: User CRUD; deletion removes the user's companies
/// - `companies`: Company CRUD, soft delete, restore and permanent delete
/// - `adds`: Adds of a company
///
/// Successful responses wrap their payload in `{"data": ...}`; lists add a
/// `meta` object with pagination details.

pub mod adds;
pub mod companies;
pub mod health;
pub mod users;

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use validator::ValidationError;

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size a client may request
pub const MAX_LIMIT: i64 = 100;

/// Single-resource response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Pagination details of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total number of matching rows
    pub total: i64,

    /// Page size used
    pub limit: i64,

    /// Rows skipped
    pub offset: i64,
}

/// List response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// `limit` / `offset` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Page size, clamped to `1..=MAX_LIMIT`
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Rows to skip, never negative
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            total,
            limit: self.limit(),
            offset: self.offset(),
        }
    }
}

/// Parses a path ID
///
/// Anything that isn't a positive integer can't name a row, so it is reported
/// as not found rather than as a bad request.
pub fn parse_id(raw: &str, resource: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(not_found(resource)),
    }
}

/// The 404 for a missing resource
pub fn not_found(resource: &str) -> ApiError {
    ApiError::NotFound(format!("{} not found", resource))
}

/// Rejects strings that are empty once surrounding whitespace is trimmed
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }

    Ok(())
}
