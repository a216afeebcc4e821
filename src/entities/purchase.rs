use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Purchase order raised from an accepted quotation.
///
/// New rows default to pending status with a cash payment in JOD at an
/// exchange rate of 1; payment references stay null until settlement.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Purchase)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub quotation_id: i64,

    /// Buying retailer
    pub retailer_id: i64,

    pub supplier_id: i64,

    /// 1 = pending, 2 = paid, 3 = delivered, 4 = cancelled
    pub status: i16,

    pub payment_amount: Decimal,

    /// 3-letter currency code
    pub payment_currency: String,

    pub payment_exchange_rate: Decimal,

    /// CASH until a payment provider settles the order
    pub payment_method: String,

    pub payment_reference: Option<String>,

    pub reconciliation_reference: Option<String>,

    pub external_pay_reference: Option<String>,

    pub supplier_iban: Option<String>,

    pub supplier_bank_account: Option<String>,

    pub supplier_bank_name: Option<String>,

    pub last_modified_by: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quotation::Entity",
        from = "Column::QuotationId",
        to = "super::quotation::Column::Id"
    )]
    Quotation,
    #[sea_orm(
        belongs_to = "super::retailer::Entity",
        from = "Column::RetailerId",
        to = "super::retailer::Column::Id"
    )]
    Retailer,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "super::purchase_transaction::Entity")]
    Transactions,
}

impl Related<super::quotation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotation.def()
    }
}

impl Related<super::retailer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Retailer.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::purchase_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

pub const STATUS_PENDING: i16 = 1;
pub const STATUS_PAID: i16 = 2;
pub const STATUS_DELIVERED: i16 = 3;
pub const STATUS_CANCELLED: i16 = 4;

pub const DEFAULT_PAYMENT_METHOD: &str = "CASH";
pub const DEFAULT_CURRENCY: &str = "JOD";

#[cfg(test)]
mod tests {
    use sea_orm::{Related, RelationDef};

    use super::Entity;
    use crate::entities::{purchase_transaction, quotation, retailer, supplier};

    #[test]
    fn purchase_relates_to_its_parties_and_audit_trail() {
        let _: RelationDef = <Entity as Related<quotation::Entity>>::to();
        let _: RelationDef = <Entity as Related<retailer::Entity>>::to();
        let _: RelationDef = <Entity as Related<supplier::Entity>>::to();
        let _: RelationDef = <Entity as Related<purchase_transaction::Entity>>::to();
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
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set(STATUS_PENDING);
            }
            if let ActiveValue::NotSet = active_model.payment_method {
                active_model.payment_method = Set(DEFAULT_PAYMENT_METHOD.to_string());
            }
            if let ActiveValue::NotSet = active_model.payment_currency {
                active_model.payment_currency = Set(DEFAULT_CURRENCY.to_string());
            }
            if let ActiveValue::NotSet = active_model.payment_exchange_rate {
                active_model.payment_exchange_rate = Set(Decimal::ONE);
            }
            active_model.created_at = Set(Utc::now());
        }
        active_model.updated_at = Set(Some(Utc::now()));

        Ok(active_model)
    }
}
