use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::common::{PaginationMeta, PaginationParams};
use crate::services::users::UpdateUserRequest;
use crate::{ApiResponse, AppState};

// deny_unknown_fields does not combine with flatten, so the paged
// request body tolerates extra keys.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListUsersRequest {
    pub role: Option<i16>,
    pub status: Option<i16>,
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ReviewUserRequest {
    pub user_id: i64,
    pub approve: bool,
}

/// The caller's own profile with role profile ids.
#[utoipa::path(
    post,
    path = "/api/v1/users/me",
    responses((status = 200, description = "Profile for the authenticated user")),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state.services.users.get_profile(auth_user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/update",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state
        .services
        .users
        .update_profile(auth_user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Soft-delete the caller's account.
#[utoipa::path(
    post,
    path = "/api/v1/users/delete",
    responses((status = 200, description = "Account deleted")),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.users.delete_account(auth_user.user_id).await?;
    Ok(Json(ApiResponse::success("account deleted")))
}

/// Admin listing of accounts, filterable by role and status.
#[utoipa::path(
    post,
    path = "/api/v1/users/list",
    request_body = ListUsersRequest,
    responses((status = 200, description = "Page of users")),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<ListUsersRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .users
        .list_users(page_index, page_size, request.role, request.status)
        .await?;
    let meta = PaginationMeta::new(page.page_index, page.page_size, page.total);
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "users": page.items, "pagination": meta }),
    )))
}

/// Approve or reject a pending registration.
#[utoipa::path(
    post,
    path = "/api/v1/users/review",
    request_body = ReviewUserRequest,
    responses(
        (status = 200, description = "Account reviewed"),
        (status = 400, description = "Account is not pending")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn review_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<ReviewUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state
        .services
        .users
        .review_user(request.user_id, request.approve, auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}
