//! Request correlation and HTTP tracing.
//!
//! Every request gets a `RequestId` that rides a task-local so error
//! envelopes and log lines deep in the service layer can reference it
//! without threading it through every signature.

use std::future::Future;

use axum::http::Request;
use tower_http::{
    classify::{SharedClassifier, StatusInRangeAsFailures},
    trace::TraceLayer,
};
use tracing::Span;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl Default for RequestId {
    fn default() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }
}

tokio::task_local! {
    static CURRENT_REQUEST_ID: String;
}

/// Run `fut` with `id` installed as the ambient request id.
pub async fn scope_request_id<F, T>(id: String, fut: F) -> T
where
    F: Future<Output = T>,
{
    CURRENT_REQUEST_ID.scope(id, fut).await
}

/// The ambient request id, if the current task is inside a request scope.
pub fn current_request_id() -> Option<String> {
    CURRENT_REQUEST_ID.try_with(|id| id.clone()).ok()
}

#[derive(Clone, Copy)]
pub struct RequestSpanMaker;

impl<B> tower_http::trace::MakeSpan<B> for RequestSpanMaker {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

/// Trace layer that records 5xx responses as failures.
pub fn configure_http_tracing(
) -> TraceLayer<SharedClassifier<StatusInRangeAsFailures>, RequestSpanMaker> {
    TraceLayer::new(StatusInRangeAsFailures::new(500..=599).into_make_classifier())
        .make_span_with(RequestSpanMaker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_id_is_scoped_to_the_task() {
        assert!(current_request_id().is_none());
        let seen = scope_request_id("req-123".to_string(), async {
            current_request_id()
        })
        .await;
        assert_eq!(seen.as_deref(), Some("req-123"));
        assert!(current_request_id().is_none());
    }
}
