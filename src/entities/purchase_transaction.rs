use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Audit record written in the same transaction as its purchase.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = PurchaseTransaction)]
#[sea_orm(table_name = "purchase_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub purchase_id: i64,

    /// Mirrors the purchase status at the time of the entry
    pub status: i16,

    /// Free-form JSON payload describing the transition
    pub details: Json,

    pub last_modified_by: i64,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::purchase::Column::Id"
    )]
    Purchase,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
