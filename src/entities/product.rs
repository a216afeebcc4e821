use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Supplier catalog item shown on the marketplace.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate, ToSchema)]
#[schema(as = Product)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub supplier_id: i64,

    #[validate(length(min = 1, max = 255, message = "Product name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    /// Marketplace category label
    pub category: String,

    /// Industry label used by the industry filter
    pub industry: String,

    pub unit_price: Decimal,

    /// 3-letter currency code
    pub currency: String,

    pub minimum_order_quantity: i32,

    pub in_stock: bool,

    /// Hidden from the marketplace when false
    pub is_active: bool,

    pub image_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.is_active {
                active_model.is_active = Set(true);
            }
            if let ActiveValue::NotSet = active_model.in_stock {
                active_model.in_stock = Set(true);
            }
            active_model.created_at = Set(Utc::now());
        }
        active_model.updated_at = Set(Some(Utc::now()));

        // On insert the id is NotSet, so a full Model conversion is not
        // possible; check the constrained columns directly.
        if let ActiveValue::Set(ref name) = active_model.name {
            if name.is_empty() || name.len() > 255 {
                return Err(DbErr::Custom(
                    "Product name must be 1-255 characters".to_string(),
                ));
            }
        }
        if let ActiveValue::Set(Some(ref description)) = active_model.description {
            if description.len() > 2000 {
                return Err(DbErr::Custom(
                    "Description cannot exceed 2000 characters".to_string(),
                ));
            }
        }

        Ok(active_model)
    }
}
