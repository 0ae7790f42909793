/// Add endpoints, nested under a live company
///
/// - `GET /api/companies/:id/adds`
/// - `POST /api/companies/:id/adds`

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{not_blank, not_found, parse_id, DataResponse},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use corpdesk_shared::models::{
    add::{Add, CreateAdd},
    company::{Company, Status},
};
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

/// Create add request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateAddRequest {
    #[validate(
        custom(function = "not_blank", message = "The title field is required"),
        length(max = 255, message = "The title may not be greater than 255 characters")
    )]
    pub title: String,

    /// Defaults to the company's current status
    pub status: Option<Status>,
}

async fn live_company(state: &AppState, raw_id: &str) -> ApiResult<Company> {
    let id = parse_id(raw_id, "Company")?;

    Company::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Company"))
}

/// List a company's adds
pub async fn list_adds(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Vec<Add>>>> {
    let company = live_company(&state, &id).await?;
    let adds = Add::list_by_company(&state.db, company.id).await?;

    Ok(Json(DataResponse::new(adds)))
}

/// Create an add for a company
///
/// The company row stays locked until the add is inserted, so a concurrent
/// status change or delete waits for it and the new add starts with the
/// status the company has at commit.
///
/// # Errors
///
/// - `404 Not Found`: unknown or trashed company
/// - `422 Unprocessable Entity`: validation failed
pub async fn create_add(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CreateAddRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<Add>>> {
    let id = parse_id(&id, "Company")?;
    let Json(req) = payload?;
    req.validate()?;

    let mut tx = state.db.begin().await?;

    let company = Company::find_for_update(&mut *tx, id, false)
        .await?
        .ok_or_else(|| not_found("Company"))?;

    let add = Add::create(
        &mut *tx,
        CreateAdd {
            company_id: company.id,
            title: req.title,
            status: req.status.unwrap_or(company.status),
        },
    )
    .await?;

    tx.commit().await?;

    debug!(add_id = add.id, company_id = company.id, "Add created");

    Ok(Json(DataResponse::new(add)))
}
