//! Souk API Library
//!
//! This crate provides the core functionality for the Souk B2B
//! marketplace API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod mailer;
pub mod middleware_helpers;
pub mod migrator;
pub mod observability;
pub mod openapi;
pub mod services;

use axum::{extract::State, response::Json, routing::post, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::{AuthRouterExt, UserRole};
use crate::db::DbPool;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::observability::current_request_id(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// All v1 routes. Every domain endpoint is a POST carrying a JSON body;
/// role gates wrap whole sub-routers and handlers re-check where the
/// rule is narrower than a role.
pub fn api_v1_routes() -> Router<AppState> {
    let auth_public = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/username-availability",
            post(handlers::auth::username_availability),
        )
        .route(
            "/auth/password-reset/request",
            post(handlers::auth::password_reset_request),
        )
        .route(
            "/auth/password-reset/confirm",
            post(handlers::auth::password_reset_confirm),
        );

    let auth_private = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .with_auth();

    let purchases = Router::new()
        .route("/purchases/create", post(handlers::purchases::create_purchase))
        .route(
            "/purchases/by-retailer",
            post(handlers::purchases::purchases_by_retailer),
        )
        .route(
            "/purchases/by-supplier",
            post(handlers::purchases::purchases_by_supplier),
        )
        .route("/purchases/details", post(handlers::purchases::purchase_details))
        .route(
            "/purchases/status",
            post(handlers::purchases::update_purchase_status),
        )
        .with_auth();

    let products_browse = Router::new()
        .route("/products/marketplace", post(handlers::products::marketplace))
        .route("/products/filter", post(handlers::products::filter_products))
        .route("/products/search", post(handlers::products::search_products))
        .route(
            "/products/by-supplier",
            post(handlers::products::products_by_supplier),
        )
        .route("/products/details", post(handlers::products::product_details))
        .with_auth();

    let products_manage = Router::new()
        .route("/products/catalog", post(handlers::products::supplier_catalog))
        .route("/products/add", post(handlers::products::add_product))
        .route("/products/update", post(handlers::products::update_product))
        .route("/products/status", post(handlers::products::set_product_status))
        .with_role(UserRole::Supplier);

    let users_self = Router::new()
        .route("/users/me", post(handlers::users::me))
        .route("/users/update", post(handlers::users::update_me))
        .route("/users/delete", post(handlers::users::delete_me))
        .with_auth();

    let users_admin = Router::new()
        .route("/users/list", post(handlers::users::list_users))
        .route("/users/review", post(handlers::users::review_user))
        .with_role(UserRole::Admin);

    let dashboards = Router::new()
        .route(
            "/dashboards/retailer/overview",
            post(handlers::dashboards::retailer_overview),
        )
        .route(
            "/dashboards/retailer/profile",
            post(handlers::dashboards::update_retailer_profile),
        )
        .route(
            "/dashboards/retailer/store",
            post(handlers::dashboards::update_store),
        )
        .route(
            "/dashboards/supplier/overview",
            post(handlers::dashboards::supplier_overview),
        )
        .route(
            "/dashboards/supplier/profile",
            post(handlers::dashboards::update_supplier_profile),
        )
        .route(
            "/dashboards/supplier/factory",
            post(handlers::dashboards::update_factory),
        )
        .route(
            "/dashboards/notifications",
            post(handlers::dashboards::notifications),
        )
        .route(
            "/dashboards/notifications/read",
            post(handlers::dashboards::mark_notification_read),
        )
        .with_auth();

    let dashboards_admin = Router::new()
        .route(
            "/dashboards/admin/summary",
            post(handlers::dashboards::admin_summary),
        )
        .with_role(UserRole::Admin);

    let compliance = Router::new()
        .route("/compliance/types", post(handlers::compliance::complaint_types))
        .route(
            "/compliance/complaints/create",
            post(handlers::compliance::create_complaint),
        )
        .route(
            "/compliance/complaints/details",
            post(handlers::compliance::complaint_details),
        )
        .route(
            "/compliance/complaints/mine",
            post(handlers::compliance::my_complaints),
        )
        .route(
            "/compliance/quotation-actors",
            post(handlers::compliance::quotation_actors),
        )
        .route(
            "/compliance/reviews/submit",
            post(handlers::compliance::submit_review),
        )
        .with_auth();

    let compliance_admin = Router::new()
        .route(
            "/compliance/complaints/list",
            post(handlers::compliance::list_complaints),
        )
        .route(
            "/compliance/complaints/search",
            post(handlers::compliance::search_complaints),
        )
        .route(
            "/compliance/complaints/update",
            post(handlers::compliance::update_complaint),
        )
        .with_role(UserRole::Admin);

    Router::new()
        // Status and health endpoints
        .route("/status", axum::routing::get(api_status))
        .route("/health", axum::routing::get(health_check))
        // Accounts
        .merge(auth_public)
        .merge(auth_private)
        .merge(users_self)
        .merge(users_admin)
        // Marketplace
        .merge(products_browse)
        .merge(products_manage)
        .merge(purchases)
        // Role dashboards
        .merge(dashboards)
        .merge(dashboards_admin)
        // Compliance
        .merge(compliance)
        .merge(compliance_admin)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "build_time": build_time,
        "service": "souk-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match db::check_connection(state.db.as_ref()).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::observability::scope_request_id("meta-123".to_string(), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::observability::scope_request_id("meta-err".to_string(), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::observability::scope_request_id(
            "meta-validation".to_string(),
            async { ApiResponse::<()>::validation_errors(vec!["missing".into()]) },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }
}
