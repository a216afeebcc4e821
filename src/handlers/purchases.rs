use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::{permissions, AuthUser, UserRole};
use crate::errors::ServiceError;
use crate::handlers::common::{PaginationMeta, PaginationParams};
use crate::services::purchases::CreatePurchaseRequest;
use crate::{ApiResponse, AppState};

// deny_unknown_fields does not combine with flatten, so the paged
// request bodies tolerate extra keys.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RetailerPurchasesRequest {
    pub retailer_id: i64,
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SupplierPurchasesRequest {
    pub supplier_id: i64,
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PurchaseDetailsRequest {
    pub purchase_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePurchaseStatusRequest {
    pub purchase_id: i64,
    pub status: i16,
}

/// Create a purchase from an accepted quotation.
///
/// The purchase, its audit record and the notification trigger commit
/// atomically; fan-out (buyer email, party notifications) happens after
/// commit, off the request path.
#[utoipa::path(
    post,
    path = "/api/v1/purchases/create",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase created", body = Object),
        (status = 400, description = "Missing fields or failed creation"),
        (status = 403, description = "Caller is not a retailer")
    ),
    security(("bearer_auth" = [])),
    tag = "purchases"
)]
pub async fn create_purchase(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreatePurchaseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if !permissions::role_has_permission(auth_user.role, permissions::PURCHASES_CREATE) {
        return Err(ServiceError::Forbidden(
            "only retailers can create purchases".to_string(),
        ));
    }
    let purchase = state
        .services
        .purchases
        .create_purchase(request, auth_user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(purchase))))
}

/// Purchases made by a retailer, newest first.
#[utoipa::path(
    post,
    path = "/api/v1/purchases/by-retailer",
    request_body = RetailerPurchasesRequest,
    responses((status = 200, description = "Page of purchases")),
    security(("bearer_auth" = [])),
    tag = "purchases"
)]
pub async fn purchases_by_retailer(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<RetailerPurchasesRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .purchases
        .list_for_retailer(request.retailer_id, page_index, page_size)
        .await?;
    let meta = PaginationMeta::new(page.page_index, page.page_size, page.total);
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "purchases": page.items, "pagination": meta }),
    )))
}

/// Purchases received by a supplier, newest first.
#[utoipa::path(
    post,
    path = "/api/v1/purchases/by-supplier",
    request_body = SupplierPurchasesRequest,
    responses((status = 200, description = "Page of purchases")),
    security(("bearer_auth" = [])),
    tag = "purchases"
)]
pub async fn purchases_by_supplier(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<SupplierPurchasesRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .purchases
        .list_for_supplier(request.supplier_id, page_index, page_size)
        .await?;
    let meta = PaginationMeta::new(page.page_index, page.page_size, page.total);
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "purchases": page.items, "pagination": meta }),
    )))
}

/// One purchase with its audit trail.
#[utoipa::path(
    post,
    path = "/api/v1/purchases/details",
    request_body = PurchaseDetailsRequest,
    responses(
        (status = 200, description = "Purchase with transactions"),
        (status = 404, description = "Unknown purchase")
    ),
    security(("bearer_auth" = [])),
    tag = "purchases"
)]
pub async fn purchase_details(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<PurchaseDetailsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let details = state
        .services
        .purchases
        .get_details(request.purchase_id)
        .await?;
    Ok(Json(ApiResponse::success(details)))
}

/// Move a purchase through its lifecycle. Suppliers settle and deliver;
/// admins can do anything.
#[utoipa::path(
    post,
    path = "/api/v1/purchases/status",
    request_body = UpdatePurchaseStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 403, description = "Caller may not update purchases")
    ),
    security(("bearer_auth" = [])),
    tag = "purchases"
)]
pub async fn update_purchase_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpdatePurchaseStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if !auth_user.has_role(UserRole::Supplier) && !auth_user.is_admin() {
        return Err(ServiceError::Forbidden(
            "only suppliers and admins can update purchase status".to_string(),
        ));
    }
    let updated = state
        .services
        .purchases
        .update_status(request.purchase_id, request.status, auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
