use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::{AuthUser, Claims};
use crate::errors::ServiceError;
use crate::services::auth::{RegisterRequest, SignInRequest};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UsernameAvailabilityRequest {
    pub username: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PasswordResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

/// Register a new account with its role profile.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, pending admin review"),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Username or email already taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.services.auth_flows.register(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

/// Exchange credentials for a token pair.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.services.auth_flows.sign_in(request).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// Revoke the presented token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "Token revoked")),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    claims: axum::Extension<Claims>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.auth_flows.sign_out(&claims).await?;
    Ok(Json(ApiResponse::success("signed out")))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/username-availability",
    request_body = UsernameAvailabilityRequest,
    responses((status = 200, description = "Availability flag")),
    tag = "auth"
)]
pub async fn username_availability(
    State(state): State<AppState>,
    Json(request): Json<UsernameAvailabilityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let available = state
        .services
        .auth_flows
        .username_available(&request.username)
        .await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "available": available }),
    )))
}

/// Start a password reset. Responds identically whether or not the email
/// is registered.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/request",
    request_body = PasswordResetRequest,
    responses((status = 200, description = "Reset token issued if the account exists")),
    tag = "auth"
)]
pub async fn password_reset_request(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .auth_flows
        .request_password_reset(&request.email)
        .await?;
    Ok(Json(ApiResponse::success("reset requested")))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/confirm",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 401, description = "Invalid or expired token")
    ),
    tag = "auth"
)]
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetConfirmRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .auth_flows
        .confirm_password_reset(&request.token, &request.new_password)
        .await?;
    Ok(Json(ApiResponse::success("password updated")))
}
