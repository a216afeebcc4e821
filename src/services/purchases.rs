use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::{DatabaseAccess, DbPool};
use crate::entities::{purchase, purchase_transaction};
use crate::errors::ServiceError;
use crate::events::outbox::{self, PurchaseCreatedPayload, EVENT_PURCHASE_CREATED};
use crate::events::{Event, EventSender};

/// Purchase orchestration: creation is a single database transaction that
/// writes the purchase, its audit record and the outbox event together;
/// notification fan-out happens after commit, off the request path.
#[derive(Clone)]
pub struct PurchaseService {
    db: DatabaseAccess,
    event_sender: Option<Arc<EventSender>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePurchaseRequest {
    #[validate(range(min = 1, message = "quotation_id is required"))]
    pub quotation_id: i64,
    #[validate(range(min = 1, message = "retailer_id is required"))]
    pub retailer_id: i64,
    #[validate(range(min = 1, message = "supplier_id is required"))]
    pub supplier_id: i64,
    /// Agreed amount in the quotation currency
    pub payment_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub id: i64,
    pub quotation_id: i64,
    pub retailer_id: i64,
    pub supplier_id: i64,
    pub status: i16,
    pub payment_amount: Decimal,
    pub payment_currency: String,
    pub payment_exchange_rate: Decimal,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseDetailsResponse {
    #[serde(flatten)]
    pub purchase: PurchaseResponse,
    pub transactions: Vec<purchase_transaction::Model>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchasePage {
    pub items: Vec<PurchaseResponse>,
    pub total: u64,
    pub page_index: u64,
    pub page_size: u64,
}

impl PurchaseService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db: DatabaseAccess::new(db),
            event_sender,
        }
    }

    /// Create a purchase from an accepted quotation.
    ///
    /// Both inserts and the outbox enqueue ride one transaction; a failure
    /// at any step rolls everything back and no notification ever fires.
    #[instrument(
        skip(self, request),
        fields(quotation_id = request.quotation_id, retailer_id = request.retailer_id)
    )]
    pub async fn create_purchase(
        &self,
        request: CreatePurchaseRequest,
        created_by: i64,
    ) -> Result<PurchaseResponse, ServiceError> {
        request.validate()?;

        let this = self.clone();
        let model = self
            .db
            .transaction("purchase.create", move |txn| {
                Box::pin(async move { this.create_purchase_in_txn(txn, &request, created_by).await })
            })
            .await?;
        info!(purchase_id = model.id, "purchase created");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::PurchaseCreated {
                    purchase_id: model.id,
                    quotation_id: model.quotation_id,
                    retailer_id: model.retailer_id,
                    supplier_id: model.supplier_id,
                })
                .await
            {
                tracing::warn!(error = %e, "failed to publish purchase event");
            }
        }

        Ok(model_to_response(model))
    }

    async fn create_purchase_in_txn(
        &self,
        txn: &DatabaseTransaction,
        request: &CreatePurchaseRequest,
        created_by: i64,
    ) -> Result<purchase::Model, ServiceError> {
        let purchase = purchase::ActiveModel {
            quotation_id: Set(request.quotation_id),
            retailer_id: Set(request.retailer_id),
            supplier_id: Set(request.supplier_id),
            payment_amount: Set(request.payment_amount),
            last_modified_by: Set(created_by),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(|e| {
            error!(error = %e, "purchase insert failed");
            ServiceError::PurchaseCreationFailed("Failed to Create Purchase".to_string())
        })?;

        purchase_transaction::ActiveModel {
            purchase_id: Set(purchase.id),
            status: Set(purchase::STATUS_PENDING),
            details: Set(json!({
                "details": format!(
                    "new purchase by: {}, to: {}.",
                    request.retailer_id, request.supplier_id
                )
            })),
            last_modified_by: Set(created_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(|e| {
            error!(error = %e, "purchase transaction insert failed");
            ServiceError::TransactionDetailsFailed(
                "Failed to Create Transaction Details".to_string(),
            )
        })?;

        let payload = PurchaseCreatedPayload {
            purchase_id: purchase.id,
            quotation_id: purchase.quotation_id,
            retailer_id: purchase.retailer_id,
            supplier_id: purchase.supplier_id,
        };
        outbox::enqueue(
            txn,
            "purchase",
            Some(purchase.id),
            EVENT_PURCHASE_CREATED,
            serde_json::to_value(&payload)?,
        )
        .await
        .map_err(|e| {
            error!(error = %e, "outbox enqueue failed");
            ServiceError::DatabaseError(e)
        })?;

        Ok(purchase)
    }

    #[instrument(skip(self))]
    pub async fn list_for_retailer(
        &self,
        retailer_id: i64,
        page_index: u64,
        page_size: u64,
    ) -> Result<PurchasePage, ServiceError> {
        self.list_filtered(purchase::Column::RetailerId, retailer_id, page_index, page_size)
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_for_supplier(
        &self,
        supplier_id: i64,
        page_index: u64,
        page_size: u64,
    ) -> Result<PurchasePage, ServiceError> {
        self.list_filtered(purchase::Column::SupplierId, supplier_id, page_index, page_size)
            .await
    }

    async fn list_filtered(
        &self,
        column: purchase::Column,
        id: i64,
        page_index: u64,
        page_size: u64,
    ) -> Result<PurchasePage, ServiceError> {
        let paginator = purchase::Entity::find()
            .filter(column.eq(id))
            .order_by_desc(purchase::Column::CreatedAt)
            .paginate(self.db.pool(), page_size.max(1));

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page_index.saturating_sub(1))
            .await?
            .into_iter()
            .map(model_to_response)
            .collect();

        Ok(PurchasePage {
            items,
            total,
            page_index,
            page_size,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_details(&self, purchase_id: i64) -> Result<PurchaseDetailsResponse, ServiceError> {
        let purchase = purchase::Entity::find_by_id(purchase_id)
            .one(self.db.pool())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Purchase".to_string()))?;

        let transactions = purchase_transaction::Entity::find()
            .filter(purchase_transaction::Column::PurchaseId.eq(purchase_id))
            .order_by_asc(purchase_transaction::Column::CreatedAt)
            .all(self.db.pool())
            .await?;

        Ok(PurchaseDetailsResponse {
            purchase: model_to_response(purchase),
            transactions,
        })
    }

    /// Status transition with its own audit record, in one transaction.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        purchase_id: i64,
        new_status: i16,
        updated_by: i64,
    ) -> Result<PurchaseResponse, ServiceError> {
        if !(purchase::STATUS_PENDING..=purchase::STATUS_CANCELLED).contains(&new_status) {
            return Err(ServiceError::InvalidOperation(format!(
                "unknown purchase status {new_status}"
            )));
        }

        let existing = purchase::Entity::find_by_id(purchase_id)
            .one(self.db.pool())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Purchase".to_string()))?;
        let old_status = existing.status;

        let updated = self
            .db
            .transaction("purchase.update_status", move |txn| {
                Box::pin(async move {
                    let mut active: purchase::ActiveModel = existing.into();
                    active.status = Set(new_status);
                    active.last_modified_by = Set(updated_by);
                    let updated = active.update(txn).await?;

                    purchase_transaction::ActiveModel {
                        purchase_id: Set(purchase_id),
                        status: Set(new_status),
                        details: Set(json!({
                            "details": format!("status changed from {old_status} to {new_status}")
                        })),
                        last_modified_by: Set(updated_by),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok::<purchase::Model, ServiceError>(updated)
                })
            })
            .await?;

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::PurchaseStatusChanged {
                    purchase_id,
                    old_status,
                    new_status,
                })
                .await;
        }

        Ok(model_to_response(updated))
    }
}

fn model_to_response(model: purchase::Model) -> PurchaseResponse {
    PurchaseResponse {
        id: model.id,
        quotation_id: model.quotation_id,
        retailer_id: model.retailer_id,
        supplier_id: model.supplier_id,
        status: model.status,
        payment_amount: model.payment_amount,
        payment_currency: model.payment_currency,
        payment_exchange_rate: model.payment_exchange_rate,
        payment_method: model.payment_method,
        payment_reference: model.payment_reference,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn model_to_response_keeps_payment_defaults() {
        let model = purchase::Model {
            id: 1,
            quotation_id: 10,
            retailer_id: 3,
            supplier_id: 4,
            status: purchase::STATUS_PENDING,
            payment_amount: dec!(125.50),
            payment_currency: purchase::DEFAULT_CURRENCY.to_string(),
            payment_exchange_rate: dec!(1),
            payment_method: purchase::DEFAULT_PAYMENT_METHOD.to_string(),
            payment_reference: None,
            reconciliation_reference: None,
            external_pay_reference: None,
            supplier_iban: None,
            supplier_bank_account: None,
            supplier_bank_name: None,
            last_modified_by: 3,
            created_at: Utc::now(),
            updated_at: None,
        };
        let response = model_to_response(model);
        assert_eq!(response.payment_method, "CASH");
        assert_eq!(response.payment_currency, "JOD");
        assert_eq!(response.payment_exchange_rate, dec!(1));
        assert_eq!(response.status, 1);
    }

    #[test]
    fn create_request_rejects_missing_ids() {
        let request = CreatePurchaseRequest {
            quotation_id: 0,
            retailer_id: 3,
            supplier_id: 4,
            payment_amount: dec!(10),
        };
        assert!(request.validate().is_err());
    }
}
