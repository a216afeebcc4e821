use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::{DatabaseAccess, DbPool};
use crate::entities::{complaint, quotation, retailer, review, supplier, user};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Complaint handling and supplier reviews.
#[derive(Clone)]
pub struct ComplianceService {
    db: DatabaseAccess,
    event_sender: Option<Arc<EventSender>>,
}

/// Complaint type catalog. Static; codes are stable across deployments.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ComplaintType {
    pub code: i16,
    pub label: &'static str,
}

pub const COMPLAINT_TYPES: &[ComplaintType] = &[
    ComplaintType { code: 1, label: "Late Delivery" },
    ComplaintType { code: 2, label: "Damaged Goods" },
    ComplaintType { code: 3, label: "Wrong Items" },
    ComplaintType { code: 4, label: "Payment Dispute" },
    ComplaintType { code: 5, label: "Quality Below Agreement" },
    ComplaintType { code: 6, label: "Unresponsive Counterparty" },
    ComplaintType { code: 7, label: "Other" },
];

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateComplaintRequest {
    #[validate(range(min = 1, message = "quotation_id is required"))]
    pub quotation_id: i64,
    pub complaint_type: i16,
    #[validate(length(min = 1, max = 4000, message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateComplaintRequest {
    #[validate(range(min = 1, message = "complaint_id is required"))]
    pub complaint_id: i64,
    pub status: i16,
    pub resolution_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SubmitReviewRequest {
    #[validate(range(min = 1, message = "supplier_id is required"))]
    pub supplier_id: i64,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuotationActors {
    pub quotation_id: i64,
    pub retailer_user_id: i64,
    pub retailer_username: String,
    pub supplier_user_id: i64,
    pub supplier_username: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComplaintPage {
    pub items: Vec<complaint::Model>,
    pub total: u64,
    pub page_index: u64,
    pub page_size: u64,
}

impl ComplianceService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db: DatabaseAccess::new(db),
            event_sender,
        }
    }

    pub fn complaint_types(&self) -> &'static [ComplaintType] {
        COMPLAINT_TYPES
    }

    /// File a complaint against the other party of a quotation. The
    /// target's complaint counter moves in the same transaction.
    #[instrument(skip(self, request), fields(quotation_id = request.quotation_id))]
    pub async fn create_complaint(
        &self,
        filed_by_user_id: i64,
        request: CreateComplaintRequest,
    ) -> Result<complaint::Model, ServiceError> {
        request.validate()?;
        if !COMPLAINT_TYPES.iter().any(|t| t.code == request.complaint_type) {
            return Err(ServiceError::ComplianceFailed(
                "unknown complaint type".to_string(),
            ));
        }

        let actors = self.quotation_actors(request.quotation_id).await?;
        let against_user_id = if filed_by_user_id == actors.retailer_user_id {
            actors.supplier_user_id
        } else if filed_by_user_id == actors.supplier_user_id {
            actors.retailer_user_id
        } else {
            return Err(ServiceError::Forbidden(
                "caller is not a party of this quotation".to_string(),
            ));
        };

        let this = self.clone();
        let filed = self
            .db
            .transaction("compliance.create_complaint", move |txn| {
                Box::pin(async move {
                    this.create_complaint_in_txn(txn, &request, filed_by_user_id, against_user_id)
                        .await
                })
            })
            .await?;
        info!(complaint_id = filed.id, "complaint filed");

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::ComplaintFiled {
                    complaint_id: filed.id,
                    quotation_id: filed.quotation_id,
                })
                .await;
        }

        Ok(filed)
    }

    async fn create_complaint_in_txn(
        &self,
        txn: &DatabaseTransaction,
        request: &CreateComplaintRequest,
        filed_by_user_id: i64,
        against_user_id: i64,
    ) -> Result<complaint::Model, ServiceError> {
        let filed = complaint::ActiveModel {
            quotation_id: Set(request.quotation_id),
            complaint_type: Set(request.complaint_type),
            description: Set(request.description.clone()),
            filed_by_user_id: Set(filed_by_user_id),
            against_user_id: Set(against_user_id),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        // Bump the counter on whichever profile the target holds
        if let Some(target) = retailer::Entity::find()
            .filter(retailer::Column::UserId.eq(against_user_id))
            .one(txn)
            .await?
        {
            let count = target.complaint_count + 1;
            let mut active: retailer::ActiveModel = target.into();
            active.complaint_count = Set(count);
            active.update(txn).await?;
        } else if let Some(target) = supplier::Entity::find()
            .filter(supplier::Column::UserId.eq(against_user_id))
            .one(txn)
            .await?
        {
            let count = target.complaint_count + 1;
            let mut active: supplier::ActiveModel = target.into();
            active.complaint_count = Set(count);
            active.update(txn).await?;
        }

        Ok(filed)
    }

    pub async fn get_complaint(&self, complaint_id: i64) -> Result<complaint::Model, ServiceError> {
        complaint::Entity::find_by_id(complaint_id)
            .one(self.db.pool())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Complaint".to_string()))
    }

    /// Complaints involving the given user, either side of the table.
    #[instrument(skip(self))]
    pub async fn complaints_for_user(
        &self,
        user_id: i64,
        page_index: u64,
        page_size: u64,
    ) -> Result<ComplaintPage, ServiceError> {
        let condition = Condition::any()
            .add(complaint::Column::FiledByUserId.eq(user_id))
            .add(complaint::Column::AgainstUserId.eq(user_id));
        self.page(condition, page_index, page_size).await
    }

    /// Admin view of the whole complaint queue, optionally by status.
    #[instrument(skip(self))]
    pub async fn list_complaints(
        &self,
        status: Option<i16>,
        page_index: u64,
        page_size: u64,
    ) -> Result<ComplaintPage, ServiceError> {
        let mut condition = Condition::all();
        if let Some(status) = status {
            condition = condition.add(complaint::Column::Status.eq(status));
        }
        self.page(condition, page_index, page_size).await
    }

    /// Admin search: by quotation id or description substring.
    #[instrument(skip(self))]
    pub async fn search_complaints(
        &self,
        term: &str,
        page_index: u64,
        page_size: u64,
    ) -> Result<ComplaintPage, ServiceError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ServiceError::MissingFields(
                "search term is required".to_string(),
            ));
        }
        let mut condition = Condition::any().add(complaint::Column::Description.contains(term));
        if let Ok(quotation_id) = term.parse::<i64>() {
            condition = condition.add(complaint::Column::QuotationId.eq(quotation_id));
        }
        self.page(condition, page_index, page_size).await
    }

    async fn page(
        &self,
        condition: Condition,
        page_index: u64,
        page_size: u64,
    ) -> Result<ComplaintPage, ServiceError> {
        let paginator = complaint::Entity::find()
            .filter(condition)
            .order_by_desc(complaint::Column::CreatedAt)
            .paginate(self.db.pool(), page_size.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_index.saturating_sub(1)).await?;

        Ok(ComplaintPage {
            items,
            total,
            page_index,
            page_size,
        })
    }

    /// Admin resolution flow.
    #[instrument(skip(self, request), fields(complaint_id = request.complaint_id))]
    pub async fn update_complaint(
        &self,
        request: UpdateComplaintRequest,
    ) -> Result<complaint::Model, ServiceError> {
        request.validate()?;
        if !(complaint::STATUS_OPEN..=complaint::STATUS_DISMISSED).contains(&request.status) {
            return Err(ServiceError::ComplianceFailed(format!(
                "unknown complaint status {}",
                request.status
            )));
        }

        let existing = self.get_complaint(request.complaint_id).await?;
        let mut active: complaint::ActiveModel = existing.into();
        active.status = Set(request.status);
        if let Some(notes) = request.resolution_notes {
            active.resolution_notes = Set(Some(notes));
        }
        let updated = active.update(self.db.pool()).await?;

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::ComplaintUpdated {
                    complaint_id: updated.id,
                    status: updated.status,
                })
                .await;
        }

        Ok(updated)
    }

    /// Resolve the user accounts on both sides of a quotation.
    #[instrument(skip(self))]
    pub async fn quotation_actors(&self, quotation_id: i64) -> Result<QuotationActors, ServiceError> {
        let db = self.db.pool();
        let quotation = quotation::Entity::find_by_id(quotation_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Quotation".to_string()))?;

        let retailer = retailer::Entity::find_by_id(quotation.retailer_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Retailer".to_string()))?;
        let supplier = supplier::Entity::find_by_id(quotation.supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier".to_string()))?;

        let retailer_user = user::Entity::find_by_id(retailer.user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Retailer account".to_string()))?;
        let supplier_user = user::Entity::find_by_id(supplier.user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier account".to_string()))?;

        Ok(QuotationActors {
            quotation_id,
            retailer_user_id: retailer_user.id,
            retailer_username: retailer_user.username,
            supplier_user_id: supplier_user.id,
            supplier_username: supplier_user.username,
        })
    }

    /// Retailer review of a supplier. A four-star-or-better review bumps
    /// the supplier's positive review counter in the same transaction.
    #[instrument(skip(self, request), fields(supplier_id = request.supplier_id))]
    pub async fn submit_review(
        &self,
        retailer_user_id: i64,
        request: SubmitReviewRequest,
    ) -> Result<review::Model, ServiceError> {
        request.validate()?;

        let reviewer = retailer::Entity::find()
            .filter(retailer::Column::UserId.eq(retailer_user_id))
            .one(self.db.pool())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Retailer profile".to_string()))?;

        let target = supplier::Entity::find_by_id(request.supplier_id)
            .one(self.db.pool())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier".to_string()))?;

        let saved = self
            .db
            .transaction("compliance.submit_review", move |txn| {
                Box::pin(async move {
                    let saved = review::ActiveModel {
                        supplier_id: Set(target.id),
                        retailer_id: Set(reviewer.id),
                        rating: Set(request.rating),
                        comments: Set(request.comments),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    if request.rating >= 4 {
                        let count = target.positive_review_count + 1;
                        let mut active: supplier::ActiveModel = target.into();
                        active.positive_review_count = Set(count);
                        active.update(txn).await?;
                    }

                    Ok::<review::Model, ServiceError>(saved)
                })
            })
            .await?;

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::ReviewSubmitted {
                    supplier_id: saved.supplier_id,
                    rating: saved.rating,
                })
                .await;
        }

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complaint_type_codes_are_unique() {
        let mut codes: Vec<i16> = COMPLAINT_TYPES.iter().map(|t| t.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), COMPLAINT_TYPES.len());
    }
}
