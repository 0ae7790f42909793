/// Company endpoints
///
/// Every mutation goes through the [`CascadeEngine`](corpdesk_shared::cascade::CascadeEngine),
/// so a status change reaches the company's adds before the response is sent.
///
/// # Endpoints
///
/// - `GET /api/companies` - List live companies (`?user_id=` filter)
/// - `POST /api/companies` - Create company
/// - `GET /api/companies/:id` - Show company
/// - `PUT /api/companies/:id` - Update company
/// - `DELETE /api/companies/:id` - Move company to trash
/// - `POST /api/companies/:id/restore` - Restore from trash
/// - `DELETE /api/companies/:id/force` - Delete permanently, with its adds

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
use corpdesk_shared::models::company::{Company, CreateCompany, Status, UpdateCompany};
use serde::Deserialize;
use validator::Validate;

/// Company list query
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CompanyListQuery {
    /// Only companies owned by this user
    pub user_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl CompanyListQuery {
    fn page(&self) -> Pagination {
        Pagination {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Create company request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateCompanyRequest {
    #[validate(required(message = "The user_id field is required"))]
    pub user_id: Option<i64>,

    #[validate(
        custom(function = "not_blank", message = "The name field is required"),
        length(max = 255, message = "The name may not be greater than 255 characters")
    )]
    pub name: String,

    /// Defaults to `active`
    pub status: Option<Status>,
}

/// Update company request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateCompanyRequest {
    pub user_id: Option<i64>,

    #[validate(
        custom(function = "not_blank", message = "The name field must not be empty"),
        length(max = 255, message = "The name may not be greater than 255 characters")
    )]
    pub name: Option<String>,

    pub status: Option<Status>,
}

/// List live companies
pub async fn list_companies(
    State(state): State<AppState>,
    query: Result<Query<CompanyListQuery>, QueryRejection>,
) -> ApiResult<Json<ListResponse<Company>>> {
    let Query(query) = query?;
    let page = query.page();

    let companies = Company::list(&state.db, query.user_id, page.limit(), page.offset()).await?;
    let total = Company::count(&state.db, query.user_id).await?;

    Ok(Json(ListResponse {
        data: companies,
        meta: page.meta(total),
    }))
}

/// Create a company
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed or the owner doesn't exist
pub async fn create_company(
    State(state): State<AppState>,
    payload: Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<Company>>> {
    let Json(req) = payload?;
    req.validate()?;

    let user_id = req
        .user_id
        .ok_or_else(|| ApiError::invalid("user_id", "The user_id field is required"))?;

    let company = state
        .cascade
        .create_company(CreateCompany {
            user_id,
            name: req.name,
            status: req.status.unwrap_or_default(),
        })
        .await?;

    Ok(Json(DataResponse::new(company)))
}

/// Show a live company
pub async fn show_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Company>>> {
    let id = parse_id(&id, "Company")?;

    let company = Company::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Company"))?;

    Ok(Json(DataResponse::new(company)))
}

/// Update a live company
///
/// A changed `status` is written to all of the company's adds in the same
/// transaction.
///
/// # Errors
///
/// - `404 Not Found`: unknown or trashed company
/// - `422 Unprocessable Entity`: validation failed or the new owner doesn't exist
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCompanyRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<Company>>> {
    let id = parse_id(&id, "Company")?;
    let Json(req) = payload?;
    req.validate()?;

    let company = state
        .cascade
        .update_company(
            id,
            UpdateCompany {
                user_id: req.user_id,
                name: req.name,
                status: req.status,
            },
        )
        .await?
        .ok_or_else(|| not_found("Company"))?;

    Ok(Json(DataResponse::new(company)))
}

/// Move a company to the trash
///
/// Its adds are kept and come back on restore.
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Company>>> {
    let id = parse_id(&id, "Company")?;

    let company = state
        .cascade
        .delete_company(id)
        .await?
        .ok_or_else(|| not_found("Company"))?;

    Ok(Json(DataResponse::new(company)))
}

/// Restore a trashed company
pub async fn restore_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Company>>> {
    let id = parse_id(&id, "Company")?;

    let company = state
        .cascade
        .restore_company(id)
        .await?
        .ok_or_else(|| not_found("Company"))?;

    Ok(Json(DataResponse::new(company)))
}

/// Permanently delete a company, trashed or not
///
/// # Errors
///
/// - `404 Not Found`: unknown company
/// - `409 Conflict`: the add policy is `restrict` and the company has adds
pub async fn force_delete_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Company>>> {
    let id = parse_id(&id, "Company")?;

    let company = state
        .cascade
        .force_delete_company(id)
        .await?
        .ok_or_else(|| not_found("Company"))?;

    Ok(Json(DataResponse::new(company)))
}
