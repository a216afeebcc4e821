use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Legal entity behind a retail store or factory.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate, ToSchema)]
#[schema(as = Establishment)]
#[sea_orm(table_name = "establishments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[validate(length(min = 1, max = 255, message = "Establishment name is required"))]
    pub name: String,

    /// Commercial registration number
    pub registration_number: String,

    #[validate(email(message = "Contact email must be valid"))]
    pub contact_email: Option<String>,

    pub contact_phone: Option<String>,

    pub logo_url: Option<String>,

    /// User id of the account that last touched this row
    pub last_modified_by: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::retail_store::Entity")]
    RetailStores,
    #[sea_orm(has_many = "super::factory::Entity")]
    Factories,
}

impl Related<super::retail_store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RetailStores.def()
    }
}

impl Related<super::factory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Factories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
