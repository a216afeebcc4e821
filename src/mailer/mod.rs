//! Outbound email via an HTTP mail relay.
//!
//! Messages are POSTed as JSON to the configured relay with an HMAC-SHA256
//! signature over `timestamp.body`. With no relay configured the mailer is
//! a logged no-op, which is how dev and test environments run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, warn};

use crate::errors::ServiceError;

type HmacSha256 = Hmac<Sha256>;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Clone)]
pub struct SignatureGenerator {
    secret: String,
}

impl SignatureGenerator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Hex HMAC-SHA256 over `"{timestamp}.{body}"`.
    pub fn sign_payload(&self, timestamp: &str, body: &str) -> Result<String, ServiceError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| ServiceError::InternalError(format!("invalid HMAC key: {e}")))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

/// HTTP relay mail client.
pub struct Mailer {
    client: Client,
    relay_url: Option<String>,
    signer: Option<SignatureGenerator>,
    from: String,
    delivered: AtomicU64,
}

impl Mailer {
    pub fn new(relay_url: Option<String>, relay_secret: Option<String>, from: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            relay_url,
            signer: relay_secret.map(SignatureGenerator::new),
            from,
            delivered: AtomicU64::new(0),
        }
    }

    /// No-op mailer for dev and tests.
    pub fn disabled() -> Self {
        Self::new(None, None, "no-reply@souk.example".to_string())
    }

    pub fn is_enabled(&self) -> bool {
        self.relay_url.is_some()
    }

    /// Messages handed off successfully since startup, counting no-op
    /// deliveries in disabled mode.
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Deliver a message through the relay, retrying transient failures
    /// with exponential backoff. Callers above this (the outbox worker)
    /// own the longer retry horizon.
    pub async fn send(&self, message: EmailMessage) -> Result<(), ServiceError> {
        let Some(relay_url) = &self.relay_url else {
            info!(to = %message.to, subject = %message.subject, "mailer disabled, skipping send");
            self.delivered.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        };

        let payload = RelayPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
            html: message.html.as_deref(),
        };
        let body = serde_json::to_string(&payload)?;

        let mut last_error = None;
        for attempt in 1..=MAX_RETRIES {
            let timestamp = chrono::Utc::now().timestamp().to_string();
            let mut request = self
                .client
                .post(relay_url)
                .header("Content-Type", "application/json")
                .header("X-Timestamp", &timestamp)
                .body(body.clone());

            if let Some(signer) = &self.signer {
                let signature = signer.sign_payload(&timestamp, &body)?;
                request = request.header("X-Relay-Signature", signature);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    self.delivered.fetch_add(1, Ordering::Relaxed);
                    info!(to = %message.to, "email handed to relay");
                    return Ok(());
                }
                Ok(response) => {
                    last_error = Some(format!("relay returned {}", response.status()));
                }
                Err(err) => {
                    last_error = Some(err.to_string());
                }
            }

            if attempt < MAX_RETRIES {
                let delay = Duration::from_secs(2u64.pow(attempt - 1));
                warn!(
                    attempt,
                    retry_in_secs = delay.as_secs(),
                    "relay delivery failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(ServiceError::ExternalServiceError(format!(
            "email delivery failed after {MAX_RETRIES} attempts: {}",
            last_error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_hex_sha256() {
        let signer = SignatureGenerator::new("relay-secret");
        let sig = signer.sign_payload("1700000000", r#"{"to":"a@b.c"}"#).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_deterministic_and_keyed() {
        let signer = SignatureGenerator::new("relay-secret");
        let other = SignatureGenerator::new("different-secret");
        let a = signer.sign_payload("1", "body").unwrap();
        let b = signer.sign_payload("1", "body").unwrap();
        let c = other.sign_payload("1", "body").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn disabled_mailer_counts_deliveries() {
        let mailer = Mailer::disabled();
        assert!(!mailer.is_enabled());
        mailer
            .send(EmailMessage {
                to: "buyer@example.com".to_string(),
                subject: "subject".to_string(),
                text: "body".to_string(),
                html: None,
            })
            .await
            .unwrap();
        assert_eq!(mailer.delivered_count(), 1);
    }
}
