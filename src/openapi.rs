use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Souk API",
        version = "1.0.0",
        description = r#"
# Souk B2B Marketplace API

A wholesale marketplace connecting retailers with suppliers: account
registration with role profiles, a product marketplace, quotation-backed
purchases, role dashboards and a compliance desk.

## Authentication

All endpoints except registration, login and password reset require a
JWT access token:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Errors use a consistent envelope with a platform error code:

```json
{
  "success": false,
  "error": "Failed to Create Purchase",
  "code": "E0052",
  "message": "Purchase operation failed",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints take mandatory `page_index` (1-based) and `page_size`
fields in the request body and echo a `pagination` block in the
response.
        "#,
        contact(
            name = "Souk Support",
            email = "support@souk.example"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Registration, sign-in and password reset"),
        (name = "users", description = "Account profiles and the admin review queue"),
        (name = "products", description = "Marketplace browsing and the supplier catalog"),
        (name = "purchases", description = "Purchase creation and tracking"),
        (name = "dashboards", description = "Role dashboards and notifications"),
        (name = "compliance", description = "Complaints and supplier reviews")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::username_availability,
        crate::handlers::auth::password_reset_request,
        crate::handlers::auth::password_reset_confirm,

        // Users
        crate::handlers::users::me,
        crate::handlers::users::update_me,
        crate::handlers::users::delete_me,
        crate::handlers::users::list_users,
        crate::handlers::users::review_user,

        // Products
        crate::handlers::products::marketplace,
        crate::handlers::products::filter_products,
        crate::handlers::products::search_products,
        crate::handlers::products::products_by_supplier,
        crate::handlers::products::supplier_catalog,
        crate::handlers::products::product_details,
        crate::handlers::products::add_product,
        crate::handlers::products::update_product,
        crate::handlers::products::set_product_status,

        // Purchases
        crate::handlers::purchases::create_purchase,
        crate::handlers::purchases::purchases_by_retailer,
        crate::handlers::purchases::purchases_by_supplier,
        crate::handlers::purchases::purchase_details,
        crate::handlers::purchases::update_purchase_status,

        // Dashboards
        crate::handlers::dashboards::retailer_overview,
        crate::handlers::dashboards::update_retailer_profile,
        crate::handlers::dashboards::update_store,
        crate::handlers::dashboards::supplier_overview,
        crate::handlers::dashboards::update_supplier_profile,
        crate::handlers::dashboards::update_factory,
        crate::handlers::dashboards::notifications,
        crate::handlers::dashboards::mark_notification_read,
        crate::handlers::dashboards::admin_summary,

        // Compliance
        crate::handlers::compliance::complaint_types,
        crate::handlers::compliance::create_complaint,
        crate::handlers::compliance::complaint_details,
        crate::handlers::compliance::my_complaints,
        crate::handlers::compliance::list_complaints,
        crate::handlers::compliance::search_complaints,
        crate::handlers::compliance::update_complaint,
        crate::handlers::compliance::quotation_actors,
        crate::handlers::compliance::submit_review,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,
            crate::handlers::common::PaginationParams,
            crate::handlers::common::PaginationMeta,

            // Auth types
            crate::services::auth::RegisterRequest,
            crate::services::auth::SignInRequest,

            // User types
            crate::services::users::UserProfileResponse,
            crate::services::users::UpdateUserRequest,

            // Product types
            crate::services::products::AddProductRequest,
            crate::services::products::UpdateProductRequest,
            crate::entities::product::Model,

            // Purchase types
            crate::services::purchases::CreatePurchaseRequest,
            crate::services::purchases::PurchaseResponse,
            crate::services::purchases::PurchaseDetailsResponse,

            // Dashboard types
            crate::services::dashboards::RetailerOverview,
            crate::services::dashboards::SupplierOverview,
            crate::services::dashboards::AdminSummary,
            crate::services::dashboards::UpdateTradingProfileRequest,
            crate::services::dashboards::UpdateEstablishmentRequest,

            // Compliance types
            crate::services::compliance::CreateComplaintRequest,
            crate::services::compliance::UpdateComplaintRequest,
            crate::services::compliance::SubmitReviewRequest,
            crate::services::compliance::QuotationActors,
            crate::entities::complaint::Model,
            crate::entities::review::Model,

            // Error types
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Souk API"));
        assert!(json.contains("/api/v1/purchases/create"));
        assert!(json.contains("bearer_auth"));
    }
}
