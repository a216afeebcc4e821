mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};
use serde_json::json;

async fn add_product(app: &TestApp, token: &str, name: &str, category: &str, industry: &str) -> i64 {
    let response = app
        .post(
            "/api/v1/products/add",
            json!({
                "name": name,
                "category": category,
                "industry": industry,
                "unit_price": "4.25",
                "currency": "JOD",
            }),
            token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn marketplace_lists_only_visible_products() {
    let app = TestApp::new().await;
    let (_s_user, _s_id, supplier_token) = app.register_user("mk_seller", 2).await;
    let (_r_user, _r_id, retailer_token) = app.register_user("mk_buyer", 3).await;

    let visible = add_product(&app, &supplier_token, "Olive Oil 1L", "Food", "Agriculture").await;
    let hidden = add_product(&app, &supplier_token, "Olive Oil 5L", "Food", "Agriculture").await;

    let response = app
        .post(
            "/api/v1/products/status",
            json!({ "product_id": hidden, "is_active": false }),
            &supplier_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post(
            "/api/v1/products/marketplace",
            json!({ "page_index": 1, "page_size": 10 }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let products = body["data"]["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], visible);

    // The owner still sees both in the catalog
    let response = app
        .post(
            "/api/v1/products/catalog",
            json!({ "page_index": 1, "page_size": 10 }),
            &supplier_token,
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn filter_requires_category_or_industry() {
    let app = TestApp::new().await;
    let (_r_user, _r_id, retailer_token) = app.register_user("mf_buyer", 3).await;

    let response = app
        .post(
            "/api/v1/products/filter",
            json!({ "page_index": 1, "page_size": 10 }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "E0013");
}

#[tokio::test]
async fn filter_and_search_narrow_the_feed() {
    let app = TestApp::new().await;
    let (_s_user, _s_id, supplier_token) = app.register_user("mn_seller", 2).await;
    let (_r_user, _r_id, retailer_token) = app.register_user("mn_buyer", 3).await;

    add_product(&app, &supplier_token, "Steel Rods", "Construction", "Manufacturing").await;
    add_product(&app, &supplier_token, "Steel Sheets", "Construction", "Manufacturing").await;
    add_product(&app, &supplier_token, "Flour 25kg", "Food", "Agriculture").await;

    let response = app
        .post(
            "/api/v1/products/filter",
            json!({ "category": "Construction", "page_index": 1, "page_size": 10 }),
            &retailer_token,
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 2);

    let response = app
        .post(
            "/api/v1/products/search",
            json!({ "term": "Sheets", "page_index": 1, "page_size": 10 }),
            &retailer_token,
        )
        .await;
    let body = body_json(response).await;
    let products = body["data"]["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Steel Sheets");
}

#[tokio::test]
async fn retailers_cannot_manage_the_catalog() {
    let app = TestApp::new().await;
    let (_r_user, _r_id, retailer_token) = app.register_user("mg_buyer", 3).await;

    let response = app
        .post(
            "/api/v1/products/add",
            json!({
                "name": "Bootleg Item",
                "category": "Food",
                "industry": "Agriculture",
                "unit_price": "1.00",
                "currency": "JOD",
            }),
            &retailer_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "E0011");
}

#[tokio::test]
async fn suppliers_cannot_touch_a_competitors_product() {
    let app = TestApp::new().await;
    let (_a_user, _a_id, owner_token) = app.register_user("mc_owner", 2).await;
    let (_b_user, _b_id, rival_token) = app.register_user("mc_rival", 2).await;

    let product_id = add_product(&app, &owner_token, "Cement 50kg", "Construction", "Manufacturing").await;

    let response = app
        .post(
            "/api/v1/products/update",
            json!({ "product_id": product_id, "unit_price": "0.01" }),
            &rival_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn product_updates_apply_in_place() {
    let app = TestApp::new().await;
    let (_s_user, _s_id, supplier_token) = app.register_user("mu_seller", 2).await;

    let product_id = add_product(&app, &supplier_token, "Rebar 12mm", "Construction", "Manufacturing").await;

    let response = app
        .post(
            "/api/v1/products/update",
            json!({ "product_id": product_id, "unit_price": "9.99", "in_stock": false }),
            &supplier_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["unit_price"], "9.99");
    assert_eq!(body["data"]["in_stock"], false);

    let response = app
        .post(
            "/api/v1/products/details",
            json!({ "product_id": product_id }),
            &supplier_token,
        )
        .await;
    assert_eq!(body_json(response).await["data"]["in_stock"], false);
}

#[tokio::test]
async fn new_listings_default_to_in_stock_and_active() {
    let app = TestApp::new().await;
    let (_s_user, _s_id, supplier_token) = app.register_user("mk_defaults", 2).await;

    let response = app
        .post(
            "/api/v1/products/add",
            json!({
                "name": "Date Syrup 750ml",
                "category": "Food",
                "industry": "Agriculture",
                "unit_price": "6.50",
                "currency": "JOD",
            }),
            &supplier_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let product = &body["data"];
    assert_eq!(product["in_stock"], true);
    assert_eq!(product["is_active"], true);
    assert_eq!(product["minimum_order_quantity"], 1);
}
