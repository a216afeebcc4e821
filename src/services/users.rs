use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{administrator, retailer, supplier, user};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Account profile operations plus the admin review queue.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfileResponse {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: i16,
    pub status: i16,
    pub phone: Option<String>,
    pub retailer_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub admin_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Email must be valid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserPage {
    pub items: Vec<UserProfileResponse>,
    pub total: u64,
    pub page_index: u64,
    pub page_size: u64,
}

impl UserService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: i64) -> Result<UserProfileResponse, ServiceError> {
        let account = user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))?;
        self.to_profile(account).await
    }

    async fn to_profile(&self, account: user::Model) -> Result<UserProfileResponse, ServiceError> {
        let db = self.db.as_ref();
        let retailer_id = retailer::Entity::find()
            .filter(retailer::Column::UserId.eq(account.id))
            .one(db)
            .await?
            .map(|r| r.id);
        let supplier_id = supplier::Entity::find()
            .filter(supplier::Column::UserId.eq(account.id))
            .one(db)
            .await?
            .map(|s| s.id);
        let admin_id = administrator::Entity::find()
            .filter(administrator::Column::UserId.eq(account.id))
            .one(db)
            .await?
            .map(|a| a.id);

        Ok(UserProfileResponse {
            user_id: account.id,
            username: account.username,
            email: account.email,
            role: account.role,
            status: account.status,
            phone: account.phone,
            retailer_id,
            supplier_id,
            admin_id,
            created_at: account.created_at,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateUserRequest,
    ) -> Result<UserProfileResponse, ServiceError> {
        request.validate()?;

        let account = user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))?;

        if let Some(email) = &request.email {
            let taken = user::Entity::find()
                .filter(user::Column::Email.eq(email.clone()))
                .filter(user::Column::Id.ne(user_id))
                .count(self.db.as_ref())
                .await?
                > 0;
            if taken {
                return Err(ServiceError::Conflict(
                    "email is already registered".to_string(),
                ));
            }
        }

        let mut active: user::ActiveModel = account.into();
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        let updated = active.update(self.db.as_ref()).await?;
        self.to_profile(updated).await
    }

    /// Soft delete: the account row stays for audit but can no longer
    /// sign in.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, user_id: i64) -> Result<(), ServiceError> {
        let account = user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))?;

        let mut active: user::ActiveModel = account.into();
        active.status = Set(user::STATUS_DELETED);
        active.update(self.db.as_ref()).await?;
        info!(user_id, "account soft-deleted");
        Ok(())
    }

    /// Admin listing, optionally filtered by role or status.
    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        page_index: u64,
        page_size: u64,
        role: Option<i16>,
        status: Option<i16>,
    ) -> Result<UserPage, ServiceError> {
        let mut query = user::Entity::find().order_by_asc(user::Column::Id);
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role));
        }
        if let Some(status) = status {
            query = query.filter(user::Column::Status.eq(status));
        }

        let paginator = query.paginate(self.db.as_ref(), page_size.max(1));
        let total = paginator.num_items().await?;
        let accounts = paginator.fetch_page(page_index.saturating_sub(1)).await?;

        let mut items = Vec::with_capacity(accounts.len());
        for account in accounts {
            items.push(self.to_profile(account).await?);
        }

        Ok(UserPage {
            items,
            total,
            page_index,
            page_size,
        })
    }

    /// Approve or reject a pending registration.
    #[instrument(skip(self))]
    pub async fn review_user(
        &self,
        user_id: i64,
        approve: bool,
        reviewed_by: i64,
    ) -> Result<UserProfileResponse, ServiceError> {
        let account = user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))?;

        if account.status != user::STATUS_PENDING {
            return Err(ServiceError::InvalidOperation(
                "only pending accounts can be reviewed".to_string(),
            ));
        }

        let new_status = if approve {
            user::STATUS_ACTIVE
        } else {
            user::STATUS_REJECTED
        };

        let mut active: user::ActiveModel = account.into();
        active.status = Set(new_status);
        let updated = active.update(self.db.as_ref()).await?;
        info!(user_id, reviewed_by, new_status, "registration reviewed");

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::UserReviewed {
                    user_id,
                    status: new_status,
                })
                .await;
        }

        self.to_profile(updated).await
    }
}
