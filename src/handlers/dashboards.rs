use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::{AuthUser, UserRole};
use crate::errors::ServiceError;
use crate::handlers::common::{PaginationMeta, PaginationParams};
use crate::services::dashboards::{UpdateEstablishmentRequest, UpdateTradingProfileRequest};
use crate::{ApiResponse, AppState};

// deny_unknown_fields does not combine with flatten, so the paged
// request body tolerates extra keys.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NotificationsRequest {
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct MarkNotificationReadRequest {
    pub notification_id: i64,
}

fn require_role(auth_user: &AuthUser, role: UserRole) -> Result<(), ServiceError> {
    if auth_user.has_role(role) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "{role} dashboard requires the {role} role"
        )))
    }
}

/// Retailer home: profile, establishment and activity counters.
#[utoipa::path(
    post,
    path = "/api/v1/dashboards/retailer/overview",
    responses((status = 200, description = "Retailer overview")),
    security(("bearer_auth" = [])),
    tag = "dashboards"
)]
pub async fn retailer_overview(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    require_role(&auth_user, UserRole::Retailer)?;
    let overview = state
        .services
        .dashboards
        .retailer_overview(auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(overview)))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboards/retailer/profile",
    request_body = UpdateTradingProfileRequest,
    responses((status = 200, description = "Trading profile updated")),
    security(("bearer_auth" = [])),
    tag = "dashboards"
)]
pub async fn update_retailer_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpdateTradingProfileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    require_role(&auth_user, UserRole::Retailer)?;
    let updated = state
        .services
        .dashboards
        .update_retailer_profile(auth_user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboards/retailer/store",
    request_body = UpdateEstablishmentRequest,
    responses((status = 200, description = "Store details updated")),
    security(("bearer_auth" = [])),
    tag = "dashboards"
)]
pub async fn update_store(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpdateEstablishmentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    require_role(&auth_user, UserRole::Retailer)?;
    let updated = state
        .services
        .dashboards
        .update_store(auth_user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Supplier home: profile, establishment and activity counters.
#[utoipa::path(
    post,
    path = "/api/v1/dashboards/supplier/overview",
    responses((status = 200, description = "Supplier overview")),
    security(("bearer_auth" = [])),
    tag = "dashboards"
)]
pub async fn supplier_overview(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    require_role(&auth_user, UserRole::Supplier)?;
    let overview = state
        .services
        .dashboards
        .supplier_overview(auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(overview)))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboards/supplier/profile",
    request_body = UpdateTradingProfileRequest,
    responses((status = 200, description = "Trading profile updated")),
    security(("bearer_auth" = [])),
    tag = "dashboards"
)]
pub async fn update_supplier_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpdateTradingProfileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    require_role(&auth_user, UserRole::Supplier)?;
    let updated = state
        .services
        .dashboards
        .update_supplier_profile(auth_user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboards/supplier/factory",
    request_body = UpdateEstablishmentRequest,
    responses((status = 200, description = "Factory details updated")),
    security(("bearer_auth" = [])),
    tag = "dashboards"
)]
pub async fn update_factory(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpdateEstablishmentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    require_role(&auth_user, UserRole::Supplier)?;
    let updated = state
        .services
        .dashboards
        .update_factory(auth_user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// The caller's notification feed plus unread counter.
#[utoipa::path(
    post,
    path = "/api/v1/dashboards/notifications",
    request_body = NotificationsRequest,
    responses((status = 200, description = "Page of notifications")),
    security(("bearer_auth" = [])),
    tag = "dashboards"
)]
pub async fn notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<NotificationsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .notifications
        .list_for_user(auth_user.user_id, page_index, page_size)
        .await?;
    let unread = state
        .services
        .notifications
        .unread_count(auth_user.user_id)
        .await?;
    let meta = PaginationMeta::new(page.page_index, page.page_size, page.total);
    Ok(Json(ApiResponse::success(serde_json::json!({
        "notifications": page.items,
        "unread_count": unread,
        "pagination": meta,
    }))))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboards/notifications/read",
    request_body = MarkNotificationReadRequest,
    responses((status = 200, description = "Notification marked read")),
    security(("bearer_auth" = [])),
    tag = "dashboards"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<MarkNotificationReadRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .notifications
        .mark_read(auth_user.user_id, request.notification_id)
        .await?;
    Ok(Json(ApiResponse::success("marked read")))
}

/// Platform-wide counters for the admin console.
#[utoipa::path(
    post,
    path = "/api/v1/dashboards/admin/summary",
    responses((status = 200, description = "Platform summary")),
    security(("bearer_auth" = [])),
    tag = "dashboards"
)]
pub async fn admin_summary(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.services.dashboards.admin_summary().await?;
    Ok(Json(ApiResponse::success(summary)))
}
