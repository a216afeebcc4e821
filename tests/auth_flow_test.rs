mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use souk_api::entities::{establishment, factory, retail_store, user};

#[tokio::test]
async fn supplier_registration_creates_the_full_profile() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "username": "acme_supplies",
                "email": "acme@souk.example",
                "password": "S3cure!Passw0rd",
                "role": 2,
                "tax_identification_number": "TIN-9",
                "bank_account_number": "ACC-9",
                "iban": "JO94CBJO0010000000000131000302",
                "establishment": {
                    "name": "Acme Industrial",
                    "registration_number": "REG-ACME",
                },
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let data = &body["data"];

    assert!(data["user_id"].as_i64().is_some());
    let supplier_id = data["supplier_id"].as_i64().unwrap();
    assert!(data["access_token"].as_str().is_some());

    // Composite premises id is `{establishment_id}-{supplier_id}`
    let factory_id = data["factory_id"].as_str().unwrap();
    assert!(factory_id.ends_with(&format!("-{supplier_id}")));

    let factories = factory::Entity::find()
        .count(app.state.db.as_ref())
        .await
        .unwrap();
    assert_eq!(factories, 1);
    let establishments = establishment::Entity::find()
        .count(app.state.db.as_ref())
        .await
        .unwrap();
    assert_eq!(establishments, 1);
}

#[tokio::test]
async fn retailer_registration_without_establishment_rolls_back() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "username": "corner_store",
                "email": "corner@souk.example",
                "password": "S3cure!Passw0rd",
                "role": 3,
                "tax_identification_number": "TIN-1",
                "bank_account_number": "ACC-1",
                "iban": "JO94CBJO0010000000000131000302",
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Establishment data is required for retailers.");

    // All-or-nothing: the user insert rolled back with the profile
    let users = user::Entity::find()
        .count(app.state.db.as_ref())
        .await
        .unwrap();
    assert_eq!(users, 0);
    let stores = retail_store::Entity::find()
        .count(app.state.db.as_ref())
        .await
        .unwrap();
    assert_eq!(stores, 0);
}

#[tokio::test]
async fn unknown_role_code_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "username": "mystery",
                "email": "mystery@souk.example",
                "password": "S3cure!Passw0rd",
                "role": 9,
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid user type.");
    assert_eq!(body["code"], "E0006");
}

#[tokio::test]
async fn duplicate_usernames_conflict() {
    let app = TestApp::new().await;
    app.register_user("taken_name", 3).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "username": "taken_name",
                "email": "other@souk.example",
                "password": "S3cure!Passw0rd",
                "role": 1,
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn sign_in_round_trip_and_bad_credentials() {
    let app = TestApp::new().await;
    app.register_user("login_user", 3).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "username": "login_user", "password": "S3cure!Passw0rd" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], 3);
    assert!(body["data"]["access_token"].as_str().is_some());

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "username": "login_user", "password": "wrong-password1" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "E0008");
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = TestApp::new().await;
    let (_user_id, _profile_id, token) = app.register_user("logout_user", 3).await;

    let response = app.post("/api/v1/users/me", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post("/api/v1/auth/logout", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post("/api/v1/users/me", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn username_availability_flips_after_registration() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/username-availability",
            Some(json!({ "username": "fresh_name" })),
            None,
        )
        .await;
    assert_eq!(body_json(response).await["data"]["available"], true);

    app.register_user("fresh_name", 3).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/username-availability",
            Some(json!({ "username": "fresh_name" })),
            None,
        )
        .await;
    assert_eq!(body_json(response).await["data"]["available"], false);
}

#[tokio::test]
async fn password_reset_is_silent_for_unknown_emails() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/password-reset/request",
            Some(json!({ "email": "ghost@souk.example" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.mailer.delivered_count(), 0);
}

#[tokio::test]
async fn password_reset_round_trip() {
    let app = TestApp::new().await;
    app.register_user("reset_user", 3).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/password-reset/request",
            Some(json!({ "email": "reset_user@souk.example" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.mailer.delivered_count(), 1);

    // Read the issued token straight from the table
    let row = souk_api::entities::password_reset_token::Entity::find()
        .one(app.state.db.as_ref())
        .await
        .unwrap()
        .expect("reset token row");

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/password-reset/confirm",
            Some(json!({ "token": row.token, "new_password": "N3w!Passphrase" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works, new one does
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "username": "reset_user", "password": "S3cure!Passw0rd" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "username": "reset_user", "password": "N3w!Passphrase" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Single use
    let row = souk_api::entities::password_reset_token::Entity::find()
        .filter(souk_api::entities::password_reset_token::Column::Used.eq(true))
        .one(app.state.db.as_ref())
        .await
        .unwrap();
    assert!(row.is_some());
}

#[tokio::test]
async fn health_reports_a_reachable_database() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/health", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["checks"]["database"], "healthy");
}
