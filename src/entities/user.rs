use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Platform account. Every retailer, supplier and administrator hangs off
/// one of these rows; `role` and `status` use the platform's numeric codes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate, ToSchema)]
#[schema(as = User)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Unique login name
    #[sea_orm(unique)]
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,

    #[sea_orm(unique)]
    #[validate(email(message = "Email must be valid"))]
    pub email: String,

    /// Argon2 hash, never the raw password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// 1 = admin, 2 = supplier, 3 = retailer
    pub role: i16,

    /// 1 = pending review, 2 = active, 3 = rejected, 4 = deleted
    pub status: i16,

    pub phone: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

pub const STATUS_PENDING: i16 = 1;
pub const STATUS_ACTIVE: i16 = 2;
pub const STATUS_REJECTED: i16 = 3;
pub const STATUS_DELETED: i16 = 4;

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
            active_model.created_at = Set(Utc::now());
        }
        active_model.updated_at = Set(Some(Utc::now()));

        Ok(active_model)
    }
}
