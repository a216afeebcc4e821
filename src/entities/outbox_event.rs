use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Transactional outbox row. Written inside the same transaction as the
/// state change it announces; drained by the background worker.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = OutboxEvent)]
#[sea_orm(table_name = "outbox_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Aggregate kind, e.g. "purchase"
    pub aggregate_type: String,

    pub aggregate_id: Option<i64>,

    /// Dispatch discriminator, e.g. "PurchaseCreated"
    pub event_type: String,

    pub payload: Json,

    /// pending | processing | delivered | failed
    pub status: String,

    pub attempts: i32,

    /// Earliest time the worker may pick this row up again
    pub available_at: DateTime<Utc>,

    pub last_error: Option<String>,

    pub created_at: DateTime<Utc>,

    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
