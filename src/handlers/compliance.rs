use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::{permissions, AuthUser};
use crate::errors::ServiceError;
use crate::handlers::common::{PaginationMeta, PaginationParams};
use crate::services::compliance::{
    ComplaintPage, CreateComplaintRequest, SubmitReviewRequest, UpdateComplaintRequest,
};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ComplaintDetailsRequest {
    pub complaint_id: i64,
}

// deny_unknown_fields does not combine with flatten, so the paged
// request bodies tolerate extra keys.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MyComplaintsRequest {
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListComplaintsRequest {
    pub status: Option<i16>,
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchComplaintsRequest {
    pub term: String,
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct QuotationActorsRequest {
    pub quotation_id: i64,
}

fn complaint_page_envelope(page: ComplaintPage) -> Json<ApiResponse<serde_json::Value>> {
    let meta = PaginationMeta::new(page.page_index, page.page_size, page.total);
    Json(ApiResponse::success(
        serde_json::json!({ "complaints": page.items, "pagination": meta }),
    ))
}

/// The static complaint type catalog.
#[utoipa::path(
    post,
    path = "/api/v1/compliance/types",
    responses((status = 200, description = "Complaint type catalog")),
    security(("bearer_auth" = [])),
    tag = "compliance"
)]
pub async fn complaint_types(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let types = state.services.compliance.complaint_types();
    Ok(Json(ApiResponse::success(types)))
}

/// File a complaint against the other party of a quotation.
#[utoipa::path(
    post,
    path = "/api/v1/compliance/complaints/create",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint filed"),
        (status = 403, description = "Caller is not a party of the quotation")
    ),
    security(("bearer_auth" = [])),
    tag = "compliance"
)]
pub async fn create_complaint(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateComplaintRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let filed = state
        .services
        .compliance
        .create_complaint(auth_user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(filed))))
}

#[utoipa::path(
    post,
    path = "/api/v1/compliance/complaints/details",
    request_body = ComplaintDetailsRequest,
    responses(
        (status = 200, description = "Complaint details"),
        (status = 404, description = "Unknown complaint")
    ),
    security(("bearer_auth" = [])),
    tag = "compliance"
)]
pub async fn complaint_details(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<ComplaintDetailsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state
        .services
        .compliance
        .get_complaint(request.complaint_id)
        .await?;
    Ok(Json(ApiResponse::success(found)))
}

/// Complaints the caller filed or is named in.
#[utoipa::path(
    post,
    path = "/api/v1/compliance/complaints/mine",
    request_body = MyComplaintsRequest,
    responses((status = 200, description = "Page of complaints")),
    security(("bearer_auth" = [])),
    tag = "compliance"
)]
pub async fn my_complaints(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<MyComplaintsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .compliance
        .complaints_for_user(auth_user.user_id, page_index, page_size)
        .await?;
    Ok(complaint_page_envelope(page))
}

/// Admin view of the whole complaint queue.
#[utoipa::path(
    post,
    path = "/api/v1/compliance/complaints/list",
    request_body = ListComplaintsRequest,
    responses((status = 200, description = "Page of complaints")),
    security(("bearer_auth" = [])),
    tag = "compliance"
)]
pub async fn list_complaints(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<ListComplaintsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .compliance
        .list_complaints(request.status, page_index, page_size)
        .await?;
    Ok(complaint_page_envelope(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/compliance/complaints/search",
    request_body = SearchComplaintsRequest,
    responses((status = 200, description = "Page of matching complaints")),
    security(("bearer_auth" = [])),
    tag = "compliance"
)]
pub async fn search_complaints(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<SearchComplaintsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .compliance
        .search_complaints(&request.term, page_index, page_size)
        .await?;
    Ok(complaint_page_envelope(page))
}

/// Admin resolution: move a complaint through its lifecycle.
#[utoipa::path(
    post,
    path = "/api/v1/compliance/complaints/update",
    request_body = UpdateComplaintRequest,
    responses(
        (status = 200, description = "Complaint updated"),
        (status = 400, description = "Unknown status")
    ),
    security(("bearer_auth" = [])),
    tag = "compliance"
)]
pub async fn update_complaint(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<UpdateComplaintRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.compliance.update_complaint(request).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Both user accounts behind a quotation, for complaint routing.
#[utoipa::path(
    post,
    path = "/api/v1/compliance/quotation-actors",
    request_body = QuotationActorsRequest,
    responses(
        (status = 200, description = "Retailer and supplier accounts"),
        (status = 404, description = "Unknown quotation")
    ),
    security(("bearer_auth" = [])),
    tag = "compliance"
)]
pub async fn quotation_actors(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<QuotationActorsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let actors = state
        .services
        .compliance
        .quotation_actors(request.quotation_id)
        .await?;
    Ok(Json(ApiResponse::success(actors)))
}

/// Retailer review of a supplier.
#[utoipa::path(
    post,
    path = "/api/v1/compliance/reviews/submit",
    request_body = SubmitReviewRequest,
    responses(
        (status = 201, description = "Review recorded"),
        (status = 403, description = "Caller is not a retailer")
    ),
    security(("bearer_auth" = [])),
    tag = "compliance"
)]
pub async fn submit_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if !permissions::role_has_permission(auth_user.role, permissions::REVIEWS_SUBMIT) {
        return Err(ServiceError::Forbidden(
            "only retailers can review suppliers".to_string(),
        ));
    }
    let saved = state
        .services
        .compliance
        .submit_review(auth_user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(saved))))
}
