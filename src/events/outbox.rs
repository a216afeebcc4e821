//! Transactional outbox.
//!
//! State changes that must trigger side effects (email, notification rows)
//! enqueue an event inside their own database transaction. A background
//! worker drains pending rows, dispatches the side effects, and retries
//! transient failures with exponential backoff until the attempt budget is
//! spent, after which the row is parked as failed with its last error.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{notification, outbox_event, retailer, supplier, user};
use crate::errors::ServiceError;
use crate::mailer::{EmailMessage, Mailer};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_DELIVERED: &str = "delivered";
pub const STATUS_FAILED: &str = "failed";

pub const EVENT_PURCHASE_CREATED: &str = "PurchaseCreated";

const BASE_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 300;

/// Payload stored for a purchase-created event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseCreatedPayload {
    pub purchase_id: i64,
    pub quotation_id: i64,
    pub retailer_id: i64,
    pub supplier_id: i64,
}

/// Enqueue an event on the caller's connection. Call this with the open
/// transaction of the state change the event announces; the row commits
/// or rolls back together with it.
pub async fn enqueue<C>(
    conn: &C,
    aggregate_type: &str,
    aggregate_id: Option<i64>,
    event_type: &str,
    payload: serde_json::Value,
) -> Result<Uuid, sea_orm::DbErr>
where
    C: ConnectionTrait,
{
    let id = Uuid::new_v4();
    let now = Utc::now();
    outbox_event::ActiveModel {
        id: Set(id),
        aggregate_type: Set(aggregate_type.to_string()),
        aggregate_id: Set(aggregate_id),
        event_type: Set(event_type.to_string()),
        payload: Set(payload),
        status: Set(STATUS_PENDING.to_string()),
        attempts: Set(0),
        available_at: Set(now),
        last_error: Set(None),
        created_at: Set(now),
        processed_at: Set(None),
    }
    .insert(conn)
    .await?;
    Ok(id)
}

/// Retry delay for the given attempt count: exponential with a jitter of
/// up to one second, capped at five minutes.
pub fn backoff_delay(attempts: i32) -> Duration {
    let exp = attempts.clamp(1, 16) as u32 - 1;
    let secs = BASE_BACKOFF_SECS
        .saturating_mul(2u64.saturating_pow(exp))
        .min(MAX_BACKOFF_SECS);
    let jitter_ms = rand::thread_rng().gen_range(0..1000);
    Duration::from_secs(secs) + Duration::from_millis(jitter_ms)
}

/// Background dispatcher for outbox rows.
#[derive(Clone)]
pub struct OutboxWorker {
    db: Arc<DbPool>,
    mailer: Arc<Mailer>,
    poll_interval: Duration,
    batch_size: u64,
    max_attempts: i32,
}

impl OutboxWorker {
    pub fn new(
        db: Arc<DbPool>,
        mailer: Arc<Mailer>,
        poll_interval: Duration,
        batch_size: u64,
        max_attempts: i32,
    ) -> Self {
        Self {
            db,
            mailer,
            poll_interval,
            batch_size,
            max_attempts,
        }
    }

    /// Spawn the polling loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                poll_interval_ms = self.poll_interval.as_millis() as u64,
                "outbox worker started"
            );
            loop {
                if let Err(err) = self.drain_once().await {
                    error!(error = %err, "outbox drain failed");
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        })
    }

    /// Claim and dispatch one batch of due rows. Returns the number of
    /// rows delivered. Exposed so tests can drain synchronously.
    pub async fn drain_once(&self) -> Result<usize, ServiceError> {
        let now = Utc::now();
        let due = outbox_event::Entity::find()
            .filter(outbox_event::Column::Status.eq(STATUS_PENDING))
            .filter(outbox_event::Column::AvailableAt.lte(now))
            .order_by_asc(outbox_event::Column::CreatedAt)
            .limit(self.batch_size)
            .all(self.db.as_ref())
            .await?;

        let mut delivered = 0;
        for row in due {
            let attempts = row.attempts + 1;

            let mut claim: outbox_event::ActiveModel = row.clone().into();
            claim.status = Set(STATUS_PROCESSING.to_string());
            claim.attempts = Set(attempts);
            let row = claim.update(self.db.as_ref()).await?;

            match self.dispatch(&row).await {
                Ok(()) => {
                    let mut done: outbox_event::ActiveModel = row.into();
                    done.status = Set(STATUS_DELIVERED.to_string());
                    done.processed_at = Set(Some(Utc::now()));
                    done.last_error = Set(None);
                    done.update(self.db.as_ref()).await?;
                    delivered += 1;
                }
                Err(err) => {
                    let message = err.to_string();
                    if attempts >= self.max_attempts {
                        error!(
                            event_id = %row.id,
                            attempts,
                            error = %message,
                            "outbox event exhausted its attempts"
                        );
                        let mut failed: outbox_event::ActiveModel = row.into();
                        failed.status = Set(STATUS_FAILED.to_string());
                        failed.last_error = Set(Some(message));
                        failed.update(self.db.as_ref()).await?;
                    } else {
                        let delay = backoff_delay(attempts);
                        warn!(
                            event_id = %row.id,
                            attempts,
                            retry_in_secs = delay.as_secs(),
                            error = %message,
                            "outbox dispatch failed, will retry"
                        );
                        let mut retry: outbox_event::ActiveModel = row.into();
                        retry.status = Set(STATUS_PENDING.to_string());
                        retry.available_at =
                            Set(Utc::now() + chrono::Duration::from_std(delay).unwrap_or_default());
                        retry.last_error = Set(Some(message));
                        retry.update(self.db.as_ref()).await?;
                    }
                }
            }
        }

        Ok(delivered)
    }

    async fn dispatch(&self, event: &outbox_event::Model) -> Result<(), ServiceError> {
        match event.event_type.as_str() {
            EVENT_PURCHASE_CREATED => {
                let payload: PurchaseCreatedPayload =
                    serde_json::from_value(event.payload.clone())?;
                self.dispatch_purchase_created(payload).await
            }
            other => {
                // Unknown types are not retried; they will never succeed
                Err(ServiceError::EventError(format!(
                    "no dispatcher for outbox event type {other}"
                )))
            }
        }
    }

    /// Purchase fan-out: one email to the buyer, one notification row for
    /// each quotation party.
    async fn dispatch_purchase_created(
        &self,
        payload: PurchaseCreatedPayload,
    ) -> Result<(), ServiceError> {
        let db = self.db.as_ref();

        let retailer = retailer::Entity::find_by_id(payload.retailer_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Retailer".to_string()))?;
        let supplier = supplier::Entity::find_by_id(payload.supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier".to_string()))?;
        let buyer = user::Entity::find_by_id(retailer.user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Buyer account".to_string()))?;

        self.mailer
            .send(EmailMessage {
                to: buyer.email.clone(),
                subject: "Purchase Created | Souk".to_string(),
                text: format!(
                    "your Purchase Order for Quotation: {} has been Created Successfully, Purchase ID: {}",
                    payload.quotation_id, payload.purchase_id
                ),
                html: None,
            })
            .await?;

        let details = format!(
            "a Purchase has been Created regarding this Quotation: {}",
            payload.quotation_id
        );
        for recipient in [supplier.user_id, retailer.user_id] {
            notification::ActiveModel {
                user_id: Set(recipient),
                notification_type: Set(notification::TYPE_PURCHASE_CREATED),
                priority: Set(notification::PRIORITY_NORMAL),
                subject: Set("New Purchase Created".to_string()),
                details: Set(details.clone()),
                is_read: Set(false),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_caps() {
        let first = backoff_delay(1);
        assert!(first >= Duration::from_secs(2) && first < Duration::from_secs(4));

        let fourth = backoff_delay(4);
        assert!(fourth >= Duration::from_secs(16) && fourth < Duration::from_secs(18));

        let huge = backoff_delay(12);
        assert!(huge >= Duration::from_secs(MAX_BACKOFF_SECS));
        assert!(huge < Duration::from_secs(MAX_BACKOFF_SECS + 2));
    }

    #[test]
    fn purchase_payload_round_trips() {
        let payload = PurchaseCreatedPayload {
            purchase_id: 5,
            quotation_id: 10,
            retailer_id: 3,
            supplier_id: 4,
        };
        let value = serde_json::to_value(&payload).unwrap();
        let back: PurchaseCreatedPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back.purchase_id, 5);
        assert_eq!(back.quotation_id, 10);
    }
}
