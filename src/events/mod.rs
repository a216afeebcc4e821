use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

pub mod outbox;

/// In-process domain events, broadcast after the owning transaction
/// commits. Durable side effects go through the outbox instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    UserRegistered {
        user_id: i64,
        role: i16,
    },
    UserReviewed {
        user_id: i64,
        status: i16,
    },
    PurchaseCreated {
        purchase_id: i64,
        quotation_id: i64,
        retailer_id: i64,
        supplier_id: i64,
    },
    PurchaseStatusChanged {
        purchase_id: i64,
        old_status: i16,
        new_status: i16,
    },
    ComplaintFiled {
        complaint_id: i64,
        quotation_id: i64,
    },
    ComplaintUpdated {
        complaint_id: i64,
        status: i16,
    },
    ReviewSubmitted {
        supplier_id: i64,
        rating: i16,
    },
    ProductListed {
        product_id: i64,
        supplier_id: i64,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Logging consumer for the in-process event stream.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        info!(?event, "domain event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);
        sender
            .send(Event::PurchaseCreated {
                purchase_id: 1,
                quotation_id: 10,
                retailer_id: 3,
                supplier_id: 4,
            })
            .await
            .unwrap();
        match rx.recv().await {
            Some(Event::PurchaseCreated { purchase_id, .. }) => assert_eq!(purchase_id, 1),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
