use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::notification;
use crate::errors::ServiceError;

/// In-app notification listing for the dashboards.
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<DbPool>,
}

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct NotificationPage {
    pub items: Vec<notification::Model>,
    pub total: u64,
    pub page_index: u64,
    pub page_size: u64,
}

impl NotificationService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Paged, newest first. `page_index` is 1-based and mandatory at the
    /// handler layer.
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: i64,
        page_index: u64,
        page_size: u64,
    ) -> Result<NotificationPage, ServiceError> {
        let paginator = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .paginate(self.db.as_ref(), page_size.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_index.saturating_sub(1)).await?;

        Ok(NotificationPage {
            items,
            total,
            page_index,
            page_size,
        })
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<u64, ServiceError> {
        let count = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, user_id: i64, notification_id: i64) -> Result<(), ServiceError> {
        let row = notification::Entity::find_by_id(notification_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Notification".to_string()))?;

        if row.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "notification belongs to another user".to_string(),
            ));
        }

        let mut active: notification::ActiveModel = row.into();
        active.is_read = Set(true);
        active.update(self.db.as_ref()).await?;
        Ok(())
    }
}
