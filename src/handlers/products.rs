use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::{AuthUser, UserRole};
use crate::errors::ServiceError;
use crate::handlers::common::{PaginationMeta, PaginationParams};
use crate::services::products::{AddProductRequest, ProductPage, UpdateProductRequest};
use crate::{ApiResponse, AppState};

// deny_unknown_fields does not combine with flatten, so the paged
// request bodies tolerate extra keys.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MarketplaceRequest {
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FilterProductsRequest {
    pub category: Option<String>,
    pub industry: Option<String>,
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchProductsRequest {
    pub term: String,
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SupplierProductsRequest {
    pub supplier_id: i64,
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CatalogRequest {
    #[serde(flatten)]
    pub page: PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProductDetailsRequest {
    pub product_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProductStatusRequest {
    pub product_id: i64,
    pub is_active: bool,
}

fn product_page_envelope(page: ProductPage) -> Json<ApiResponse<serde_json::Value>> {
    let meta = PaginationMeta::new(page.page_index, page.page_size, page.total);
    Json(ApiResponse::success(
        serde_json::json!({ "products": page.items, "pagination": meta }),
    ))
}

/// The marketplace feed: active, in-stock products across all suppliers.
#[utoipa::path(
    post,
    path = "/api/v1/products/marketplace",
    request_body = MarketplaceRequest,
    responses((status = 200, description = "Page of products")),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn marketplace(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<MarketplaceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .products
        .marketplace(page_index, page_size)
        .await?;
    Ok(product_page_envelope(page))
}

/// Filter by category and/or industry. At least one filter is required.
#[utoipa::path(
    post,
    path = "/api/v1/products/filter",
    request_body = FilterProductsRequest,
    responses((status = 200, description = "Page of products")),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn filter_products(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<FilterProductsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .products
        .filtered(request.category, request.industry, page_index, page_size)
        .await?;
    Ok(product_page_envelope(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/search",
    request_body = SearchProductsRequest,
    responses((status = 200, description = "Page of products matching the term")),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<SearchProductsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .products
        .search(&request.term, page_index, page_size)
        .await?;
    Ok(product_page_envelope(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/by-supplier",
    request_body = SupplierProductsRequest,
    responses((status = 200, description = "Page of the supplier's visible products")),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn products_by_supplier(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<SupplierProductsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .products
        .by_supplier(request.supplier_id, page_index, page_size)
        .await?;
    Ok(product_page_envelope(page))
}

/// The caller's own catalog, including hidden and out-of-stock items.
#[utoipa::path(
    post,
    path = "/api/v1/products/catalog",
    request_body = CatalogRequest,
    responses((status = 200, description = "Page of the caller's products")),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn supplier_catalog(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CatalogRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page_index, page_size) = request.page.require()?;
    let page = state
        .services
        .products
        .supplier_catalog(auth_user.user_id, page_index, page_size)
        .await?;
    Ok(product_page_envelope(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/details",
    request_body = ProductDetailsRequest,
    responses(
        (status = 200, description = "Product details"),
        (status = 404, description = "Unknown product")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn product_details(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<ProductDetailsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.get_product(request.product_id).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/add",
    request_body = AddProductRequest,
    responses(
        (status = 201, description = "Product listed"),
        (status = 400, description = "Invalid product data")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn add_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<AddProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if !auth_user.has_role(UserRole::Supplier) {
        return Err(ServiceError::Forbidden(
            "only suppliers can list products".to_string(),
        ));
    }
    let created = state
        .services
        .products
        .add_product(auth_user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/update",
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 403, description = "Product belongs to another supplier")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .products
        .update_product(auth_user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Show or hide a listing on the marketplace without deleting it.
#[utoipa::path(
    post,
    path = "/api/v1/products/status",
    request_body = ProductStatusRequest,
    responses((status = 200, description = "Visibility updated")),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn set_product_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<ProductStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .products
        .set_product_status(auth_user.user_id, request.product_id, request.is_active)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
