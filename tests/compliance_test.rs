mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};
use sea_orm::EntityTrait;
use serde_json::json;
use souk_api::entities::{retailer, supplier};

#[tokio::test]
async fn complaint_types_are_listed() {
    let app = TestApp::new().await;
    let (_u, _p, token) = app.register_user("ct_user", 3).await;

    let response = app.post("/api/v1/compliance/types", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let types = body["data"].as_array().unwrap();
    assert!(types.len() >= 5);
    assert!(types.iter().any(|t| t["label"] == "Late Delivery"));
}

#[tokio::test]
async fn filing_a_complaint_bumps_the_counterpart_counter() {
    let app = TestApp::new().await;
    let (_r_user, retailer_id, retailer_token) = app.register_user("cc_buyer", 3).await;
    let (s_user, supplier_id, _supplier_token) = app.register_user("cc_seller", 2).await;
    let quotation_id = app.seed_quotation(retailer_id, supplier_id).await;

    let response = app
        .post(
            "/api/v1/compliance/complaints/create",
            json!({
                "quotation_id": quotation_id,
                "complaint_type": 1,
                "description": "Shipment arrived two weeks late.",
            }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["quotation_id"], quotation_id);
    assert_eq!(body["data"]["against_user_id"], s_user);
    assert_eq!(body["data"]["status"], 1);

    let target = supplier::Entity::find_by_id(supplier_id)
        .one(app.state.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(target.complaint_count, 1);
}

#[tokio::test]
async fn outsiders_cannot_complain_about_a_quotation() {
    let app = TestApp::new().await;
    let (_r_user, retailer_id, _retailer_token) = app.register_user("co_buyer", 3).await;
    let (_s_user, supplier_id, _supplier_token) = app.register_user("co_seller", 2).await;
    let (_x_user, _x_id, outsider_token) = app.register_user("co_outsider", 3).await;
    let quotation_id = app.seed_quotation(retailer_id, supplier_id).await;

    let response = app
        .post(
            "/api/v1/compliance/complaints/create",
            json!({
                "quotation_id": quotation_id,
                "complaint_type": 2,
                "description": "Not my quotation but I have opinions.",
            }),
            &outsider_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_complaint_type_is_rejected() {
    let app = TestApp::new().await;
    let (_r_user, retailer_id, retailer_token) = app.register_user("cu_buyer", 3).await;
    let (_s_user, supplier_id, _supplier_token) = app.register_user("cu_seller", 2).await;
    let quotation_id = app.seed_quotation(retailer_id, supplier_id).await;

    let response = app
        .post(
            "/api/v1/compliance/complaints/create",
            json!({
                "quotation_id": quotation_id,
                "complaint_type": 42,
                "description": "Mystery complaint.",
            }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "E0045");
}

#[tokio::test]
async fn quotation_actors_resolves_both_parties() {
    let app = TestApp::new().await;
    let (r_user, retailer_id, retailer_token) = app.register_user("ca_buyer", 3).await;
    let (s_user, supplier_id, _supplier_token) = app.register_user("ca_seller", 2).await;
    let quotation_id = app.seed_quotation(retailer_id, supplier_id).await;

    let response = app
        .post(
            "/api/v1/compliance/quotation-actors",
            json!({ "quotation_id": quotation_id }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["retailer_user_id"], r_user);
    assert_eq!(body["data"]["supplier_user_id"], s_user);
    assert_eq!(body["data"]["retailer_username"], "ca_buyer");
    assert_eq!(body["data"]["supplier_username"], "ca_seller");
}

#[tokio::test]
async fn complaint_resolution_is_admin_only() {
    let app = TestApp::new().await;
    let (_r_user, retailer_id, retailer_token) = app.register_user("cr_buyer", 3).await;
    let (_s_user, supplier_id, _supplier_token) = app.register_user("cr_seller", 2).await;
    let (_a_user, _a_id, admin_token) = app.register_user("cr_admin", 1).await;
    let quotation_id = app.seed_quotation(retailer_id, supplier_id).await;

    let response = app
        .post(
            "/api/v1/compliance/complaints/create",
            json!({
                "quotation_id": quotation_id,
                "complaint_type": 4,
                "description": "Invoice total does not match the quotation.",
            }),
            &retailer_token,
        )
        .await;
    let complaint_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Non-admin gets the role gate
    let response = app
        .post(
            "/api/v1/compliance/complaints/update",
            json!({ "complaint_id": complaint_id, "status": 3 }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post(
            "/api/v1/compliance/complaints/update",
            json!({
                "complaint_id": complaint_id,
                "status": 3,
                "resolution_notes": "Supplier refunded the difference.",
            }),
            &admin_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], 3);

    // Admin queue can filter by status
    let response = app
        .post(
            "/api/v1/compliance/complaints/list",
            json!({ "status": 3, "page_index": 1, "page_size": 10 }),
            &admin_token,
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["complaints"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn positive_reviews_bump_the_supplier_counter() {
    let app = TestApp::new().await;
    let (_r_user, _retailer_id, retailer_token) = app.register_user("cv_buyer", 3).await;
    let (_s_user, supplier_id, _supplier_token) = app.register_user("cv_seller", 2).await;

    let response = app
        .post(
            "/api/v1/compliance/reviews/submit",
            json!({ "supplier_id": supplier_id, "rating": 5, "comments": "Reliable." }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post(
            "/api/v1/compliance/reviews/submit",
            json!({ "supplier_id": supplier_id, "rating": 2 }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let target = supplier::Entity::find_by_id(supplier_id)
        .one(app.state.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    // Only the four-star-or-better review counts
    assert_eq!(target.positive_review_count, 1);

    // Retailer profiles are untouched
    let retailers = retailer::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .unwrap();
    assert!(retailers.iter().all(|r| r.complaint_count == 0));
}

#[tokio::test]
async fn rating_out_of_range_is_rejected() {
    let app = TestApp::new().await;
    let (_r_user, _retailer_id, retailer_token) = app.register_user("cz_buyer", 3).await;
    let (_s_user, supplier_id, _supplier_token) = app.register_user("cz_seller", 2).await;

    let response = app
        .post(
            "/api/v1/compliance/reviews/submit",
            json!({ "supplier_id": supplier_id, "rating": 6 }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "E0001");
}
