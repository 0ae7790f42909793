//! Company and add endpoint tests against a real database
//!
//! Requires PostgreSQL via DATABASE_URL; skipped otherwise.

mod common;

use axum::http::StatusCode;
use common::{error_fields, TestContext};
use corpdesk_shared::cascade::AddDeletePolicy;
use serde_json::json;

#[tokio::test]
async fn test_create_company_defaults_to_active() {
    let Some(ctx) = TestContext::new().await else { return };
    let user_id = ctx.create_user().await;

    let (status, body) = ctx
        .send(
            "POST",
            "/api/companies",
            Some(json!({ "user_id": user_id, "name": "Acme" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["user_id"], user_id);
    assert!(body["data"]["deleted_at"].is_null());
}

#[tokio::test]
async fn test_create_company_for_unknown_user() {
    let Some(ctx) = TestContext::new().await else { return };

    let (status, body) = ctx
        .send(
            "POST",
            "/api/companies",
            Some(json!({ "user_id": 99999999, "name": "Orphan" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&body), vec!["user_id"]);
}

#[tokio::test]
async fn test_list_companies_filtered_by_user() {
    let Some(ctx) = TestContext::new().await else { return };
    let owner = ctx.create_user().await;
    let other = ctx.create_user().await;
    ctx.create_company(owner, "active").await;
    ctx.create_company(owner, "inactive").await;
    ctx.create_company(other, "active").await;

    let (status, body) = ctx
        .send("GET", &format!("/api/companies?user_id={}", owner), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert!(data.iter().all(|c| c["user_id"] == owner));
}

#[tokio::test]
async fn test_status_update_propagates_to_adds() {
    let Some(ctx) = TestContext::new().await else { return };
    let user_id = ctx.create_user().await;
    let company_id = ctx.create_company(user_id, "active").await;
    for _ in 0..4 {
        ctx.create_add(company_id).await;
    }

    let (status, body) = ctx
        .send(
            "PUT",
            &format!("/api/companies/{}", company_id),
            Some(json!({ "status": "suspended" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "suspended");

    let (status, body) = ctx
        .send("GET", &format!("/api/companies/{}/adds", company_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let adds = body["data"].as_array().unwrap();
    assert_eq!(adds.len(), 4);
    assert!(adds.iter().all(|a| a["status"] == "suspended"));
}

#[tokio::test]
async fn test_new_add_inherits_company_status() {
    let Some(ctx) = TestContext::new().await else { return };
    let user_id = ctx.create_user().await;
    let company_id = ctx.create_company(user_id, "inactive").await;

    let (status, body) = ctx
        .send(
            "POST",
            &format!("/api/companies/{}/adds", company_id),
            Some(json!({ "title": "Spring sale" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["company_id"], company_id);
}

#[tokio::test]
async fn test_add_follows_status_committed_before_it() {
    let Some(ctx) = TestContext::new().await else { return };
    let user_id = ctx.create_user().await;
    let company_id = ctx.create_company(user_id, "active").await;
    let company_uri = format!("/api/companies/{}", company_id);
    let adds_uri = format!("{}/adds", company_uri);

    let update = ctx.send("PUT", &company_uri, Some(json!({ "status": "suspended" })));
    let create = ctx.send("POST", &adds_uri, Some(json!({ "title": "Racing" })));
    let ((update_status, _), (create_status, _)) = tokio::join!(update, create);
    assert_eq!(update_status, StatusCode::OK);
    assert_eq!(create_status, StatusCode::OK);

    // Whichever order the two ran in, no add is left on the old status
    let (_, body) = ctx.send("GET", &adds_uri, None).await;
    let adds = body["data"].as_array().unwrap();
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0]["status"], "suspended");
}

#[tokio::test]
async fn test_create_add_on_trashed_company_is_not_found() {
    let Some(ctx) = TestContext::new().await else { return };
    let user_id = ctx.create_user().await;
    let company_id = ctx.create_company(user_id, "active").await;
    ctx.send("DELETE", &format!("/api/companies/{}", company_id), None).await;

    let (status, body) = ctx
        .send(
            "POST",
            &format!("/api/companies/{}/adds", company_id),
            Some(json!({ "title": "Too late" })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(
        ctx.count_rows("SELECT COUNT(*) FROM adds WHERE company_id = $1", company_id).await,
        0
    );
}

#[tokio::test]
async fn test_soft_delete_and_restore() {
    let Some(ctx) = TestContext::new().await else { return };
    let user_id = ctx.create_user().await;
    let company_id = ctx.create_company(user_id, "active").await;
    let uri = format!("/api/companies/{}", company_id);

    let (status, body) = ctx.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["deleted_at"].is_string());

    let (status, _) = ctx.send("GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx.send("POST", &format!("{}/restore", uri), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["deleted_at"].is_null());

    let (status, _) = ctx.send("GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_force_delete_removes_company_and_adds() {
    let Some(ctx) = TestContext::new().await else { return };
    let user_id = ctx.create_user().await;
    let company_id = ctx.create_company(user_id, "active").await;
    ctx.create_add(company_id).await;

    let (status, _) = ctx
        .send("DELETE", &format!("/api/companies/{}/force", company_id), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ctx.count_rows("SELECT COUNT(*) FROM companies WHERE id = $1", company_id).await,
        0
    );
    assert_eq!(
        ctx.count_rows("SELECT COUNT(*) FROM adds WHERE company_id = $1", company_id).await,
        0
    );
}

#[tokio::test]
async fn test_restrict_policy_blocks_deletes() {
    let Some(ctx) = TestContext::with_policy(AddDeletePolicy::Restrict).await else { return };
    let user_id = ctx.create_user().await;
    let company_id = ctx.create_company(user_id, "active").await;
    ctx.create_add(company_id).await;

    let (status, body) = ctx
        .send("DELETE", &format!("/api/companies/{}/force", company_id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, _) = ctx.send("DELETE", &format!("/api/users/{}", user_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(ctx.count_rows("SELECT COUNT(*) FROM users WHERE id = $1", user_id).await, 1);
    assert_eq!(
        ctx.count_rows("SELECT COUNT(*) FROM adds WHERE company_id = $1", company_id).await,
        1
    );
}

#[tokio::test]
async fn test_delete_user_removes_trashed_companies() {
    let Some(ctx) = TestContext::new().await else { return };
    let user_id = ctx.create_user().await;
    let company_id = ctx.create_company(user_id, "active").await;
    ctx.create_add(company_id).await;
    ctx.send("DELETE", &format!("/api/companies/{}", company_id), None).await;

    let (status, body) = ctx.send("DELETE", &format!("/api/users/{}", user_id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["companies_deleted"], 1);
    assert_eq!(body["data"]["adds_deleted"], 1);
}
