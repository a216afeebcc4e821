mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn retailer_overview_reflects_activity() {
    let app = TestApp::new().await;
    let (_r_user, retailer_id, retailer_token) = app.register_user("db_buyer", 3).await;
    let (_s_user, supplier_id, _supplier_token) = app.register_user("db_seller", 2).await;
    let quotation_id = app.seed_quotation(retailer_id, supplier_id).await;

    let response = app
        .post(
            "/api/v1/purchases/create",
            json!({
                "quotation_id": quotation_id,
                "retailer_id": retailer_id,
                "supplier_id": supplier_id,
                "payment_amount": "42",
            }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post("/api/v1/dashboards/retailer/overview", json!({}), &retailer_token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["purchase_count"], 1);
    assert_eq!(body["data"]["retailer"]["id"], retailer_id);
    assert!(body["data"]["establishment"]["name"].as_str().is_some());
}

#[tokio::test]
async fn dashboards_are_gated_by_role() {
    let app = TestApp::new().await;
    let (_r_user, _retailer_id, retailer_token) = app.register_user("dg_buyer", 3).await;

    let response = app
        .post("/api/v1/dashboards/supplier/overview", json!({}), &retailer_token)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post("/api/v1/dashboards/admin/summary", json!({}), &retailer_token)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn trading_profile_updates_persist() {
    let app = TestApp::new().await;
    let (_s_user, _supplier_id, supplier_token) = app.register_user("dp_seller", 2).await;

    let response = app
        .post(
            "/api/v1/dashboards/supplier/profile",
            json!({ "iban": "JO71CBJO0000000000001234567890" }),
            &supplier_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["iban"], "JO71CBJO0000000000001234567890");

    let response = app
        .post(
            "/api/v1/dashboards/supplier/factory",
            json!({ "name": "Renamed Works", "contact_email": "works@souk.example" }),
            &supplier_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Renamed Works");
}

#[tokio::test]
async fn notifications_feed_tracks_reads() {
    let app = TestApp::new().await;
    let (_r_user, retailer_id, retailer_token) = app.register_user("dn_buyer", 3).await;
    let (_s_user, supplier_id, supplier_token) = app.register_user("dn_seller", 2).await;
    let quotation_id = app.seed_quotation(retailer_id, supplier_id).await;

    let response = app
        .post(
            "/api/v1/purchases/create",
            json!({
                "quotation_id": quotation_id,
                "retailer_id": retailer_id,
                "supplier_id": supplier_id,
                "payment_amount": "10",
            }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    app.outbox_worker().drain_once().await.unwrap();

    let response = app
        .post(
            "/api/v1/dashboards/notifications",
            json!({ "page_index": 1, "page_size": 10 }),
            &supplier_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["unread_count"], 1);
    let notifications = body["data"]["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    let notification_id = notifications[0]["id"].as_i64().unwrap();

    let response = app
        .post(
            "/api/v1/dashboards/notifications/read",
            json!({ "notification_id": notification_id }),
            &supplier_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post(
            "/api/v1/dashboards/notifications",
            json!({ "page_index": 1, "page_size": 10 }),
            &supplier_token,
        )
        .await;
    assert_eq!(body_json(response).await["data"]["unread_count"], 0);

    // A notification can only be read by its owner
    let response = app
        .post(
            "/api/v1/dashboards/notifications/read",
            json!({ "notification_id": notification_id }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_summary_counts_the_platform() {
    let app = TestApp::new().await;
    let (_a_user, _a_id, admin_token) = app.register_user("da_admin", 1).await;
    let (_r_user, _retailer_id, _retailer_token) = app.register_user("da_buyer", 3).await;
    let (_s_user, _supplier_id, supplier_token) = app.register_user("da_seller", 2).await;

    let response = app
        .post(
            "/api/v1/products/add",
            json!({
                "name": "Gravel",
                "category": "Construction",
                "industry": "Manufacturing",
                "unit_price": "3.10",
                "currency": "JOD",
            }),
            &supplier_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post("/api/v1/dashboards/admin/summary", json!({}), &admin_token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["pending_users"], 3);
    assert_eq!(body["data"]["listed_products"], 1);
    assert_eq!(body["data"]["open_complaints"], 0);
}

#[tokio::test]
async fn admins_review_pending_registrations() {
    let app = TestApp::new().await;
    let (_a_user, _a_id, admin_token) = app.register_user("dr_admin", 1).await;
    let (r_user, _retailer_id, _retailer_token) = app.register_user("dr_buyer", 3).await;

    let response = app
        .post(
            "/api/v1/users/review",
            json!({ "user_id": r_user, "approve": true }),
            &admin_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], 2);

    // A second review of the same account is invalid
    let response = app
        .post(
            "/api/v1/users/review",
            json!({ "user_id": r_user, "approve": true }),
            &admin_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
