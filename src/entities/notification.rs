use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// In-app notification row surfaced on the dashboards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Notification)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Recipient user
    pub user_id: i64,

    /// Platform notification type code (8 = purchase created)
    pub notification_type: i16,

    /// 1 = high, 2 = normal, 3 = low
    pub priority: i16,

    pub subject: String,

    pub details: String,

    pub is_read: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

pub const TYPE_PURCHASE_CREATED: i16 = 8;
pub const PRIORITY_NORMAL: i16 = 2;

impl ActiveModelBehavior for ActiveModel {}
