use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{product, supplier};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Marketplace browsing and the supplier-side catalog.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductPage {
    pub items: Vec<product::Model>,
    pub total: u64,
    pub page_index: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AddProductRequest {
    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 128, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, max = 128, message = "Industry is required"))]
    pub industry: String,
    pub unit_price: Decimal,
    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    pub minimum_order_quantity: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductRequest {
    pub product_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub unit_price: Option<Decimal>,
    pub minimum_order_quantity: Option<i32>,
    pub in_stock: Option<bool>,
    pub image_url: Option<String>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    async fn page(
        &self,
        condition: Condition,
        page_index: u64,
        page_size: u64,
    ) -> Result<ProductPage, ServiceError> {
        let paginator = product::Entity::find()
            .filter(condition)
            .order_by_desc(product::Column::CreatedAt)
            .paginate(self.db.as_ref(), page_size.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_index.saturating_sub(1)).await?;

        Ok(ProductPage {
            items,
            total,
            page_index,
            page_size,
        })
    }

    fn visible() -> Condition {
        Condition::all()
            .add(product::Column::IsActive.eq(true))
            .add(product::Column::InStock.eq(true))
    }

    /// The retailer marketplace feed.
    #[instrument(skip(self))]
    pub async fn marketplace(
        &self,
        page_index: u64,
        page_size: u64,
    ) -> Result<ProductPage, ServiceError> {
        self.page(Self::visible(), page_index, page_size).await
    }

    /// Category and industry filters, both optional but not both empty.
    #[instrument(skip(self))]
    pub async fn filtered(
        &self,
        category: Option<String>,
        industry: Option<String>,
        page_index: u64,
        page_size: u64,
    ) -> Result<ProductPage, ServiceError> {
        if category.is_none() && industry.is_none() {
            return Err(ServiceError::MissingFields(
                "category or industry filter is required".to_string(),
            ));
        }
        let mut condition = Self::visible();
        if let Some(category) = category {
            condition = condition.add(product::Column::Category.eq(category));
        }
        if let Some(industry) = industry {
            condition = condition.add(product::Column::Industry.eq(industry));
        }
        self.page(condition, page_index, page_size).await
    }

    /// Substring search over product names and descriptions.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        term: &str,
        page_index: u64,
        page_size: u64,
    ) -> Result<ProductPage, ServiceError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ServiceError::MissingFields(
                "search term is required".to_string(),
            ));
        }
        let condition = Self::visible().add(
            Condition::any()
                .add(product::Column::Name.contains(term))
                .add(product::Column::Description.contains(term)),
        );
        self.page(condition, page_index, page_size).await
    }

    /// Public view of one supplier's active products.
    #[instrument(skip(self))]
    pub async fn by_supplier(
        &self,
        supplier_id: i64,
        page_index: u64,
        page_size: u64,
    ) -> Result<ProductPage, ServiceError> {
        let condition = Self::visible().add(product::Column::SupplierId.eq(supplier_id));
        self.page(condition, page_index, page_size).await
    }

    /// The supplier's own catalog, including inactive items.
    #[instrument(skip(self))]
    pub async fn supplier_catalog(
        &self,
        supplier_user_id: i64,
        page_index: u64,
        page_size: u64,
    ) -> Result<ProductPage, ServiceError> {
        let supplier = self.supplier_for_user(supplier_user_id).await?;
        let condition = Condition::all().add(product::Column::SupplierId.eq(supplier.id));
        self.page(condition, page_index, page_size).await
    }

    pub async fn get_product(&self, product_id: i64) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product".to_string()))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn add_product(
        &self,
        supplier_user_id: i64,
        request: AddProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        let supplier = self.supplier_for_user(supplier_user_id).await?;

        let created = product::ActiveModel {
            supplier_id: Set(supplier.id),
            name: Set(request.name),
            description: Set(request.description),
            category: Set(request.category),
            industry: Set(request.industry),
            unit_price: Set(request.unit_price),
            currency: Set(request.currency),
            minimum_order_quantity: Set(request.minimum_order_quantity.unwrap_or(1)),
            image_url: Set(request.image_url),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(product_id = created.id, supplier_id = supplier.id, "product listed");

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::ProductListed {
                    product_id: created.id,
                    supplier_id: supplier.id,
                })
                .await;
        }

        Ok(created)
    }

    #[instrument(skip(self, request), fields(product_id = request.product_id))]
    pub async fn update_product(
        &self,
        supplier_user_id: i64,
        request: UpdateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        let existing = self
            .owned_product(supplier_user_id, request.product_id)
            .await?;

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = request.category {
            active.category = Set(category);
        }
        if let Some(industry) = request.industry {
            active.industry = Set(industry);
        }
        if let Some(unit_price) = request.unit_price {
            active.unit_price = Set(unit_price);
        }
        if let Some(moq) = request.minimum_order_quantity {
            active.minimum_order_quantity = Set(moq);
        }
        if let Some(in_stock) = request.in_stock {
            active.in_stock = Set(in_stock);
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(Some(image_url));
        }

        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated)
    }

    /// Show or hide a product on the marketplace.
    #[instrument(skip(self))]
    pub async fn set_product_status(
        &self,
        supplier_user_id: i64,
        product_id: i64,
        is_active: bool,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.owned_product(supplier_user_id, product_id).await?;
        let mut active: product::ActiveModel = existing.into();
        active.is_active = Set(is_active);
        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated)
    }

    async fn supplier_for_user(&self, user_id: i64) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find()
            .filter(supplier::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier profile".to_string()))
    }

    async fn owned_product(
        &self,
        supplier_user_id: i64,
        product_id: i64,
    ) -> Result<product::Model, ServiceError> {
        let supplier = self.supplier_for_user(supplier_user_id).await?;
        let existing = self.get_product(product_id).await?;
        if existing.supplier_id != supplier.id {
            return Err(ServiceError::Forbidden(
                "product belongs to another supplier".to_string(),
            ));
        }
        Ok(existing)
    }
}
