use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Standard error envelope returned by every failing endpoint.
///
/// `error` carries the operation-specific message shown to API consumers,
/// `code` the stable platform error code, and `message` the canonical
/// description attached to that code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false on this envelope
    pub success: bool,
    /// Operation-specific error text
    pub error: String,
    /// Stable platform error code (E0001..E9999, or an auth token code)
    pub code: String,
    /// Canonical description of the error code
    pub message: String,
    /// Request id for correlation, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp of the failure
    pub timestamp: String,
}

/// Application-wide error taxonomy.
///
/// Services return these; the `IntoResponse` impl at the bottom turns them
/// into the platform error envelope with the right HTTP status and code.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    MissingFields(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("{0}")]
    RegistrationFailed(String),

    #[error("{0}")]
    PurchaseCreationFailed(String),

    #[error("{0}")]
    TransactionDetailsFailed(String),

    #[error("{0}")]
    ComplianceFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Token error: {0}")]
    JwtError(String),

    #[error("Password hashing error: {0}")]
    HashError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Event delivery error: {0}")]
    EventError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Internal server error")]
    InternalServerError,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationError(_)
            | ServiceError::MissingFields(_)
            | ServiceError::InvalidOperation(_)
            | ServiceError::RegistrationFailed(_)
            | ServiceError::PurchaseCreationFailed(_)
            | ServiceError::TransactionDetailsFailed(_)
            | ServiceError::ComplianceFailed(_) => StatusCode::BAD_REQUEST,
            ServiceError::AuthError(_)
            | ServiceError::Unauthorized(_)
            | ServiceError::JwtError(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::DatabaseError(_)
            | ServiceError::HashError(_)
            | ServiceError::SerializationError(_)
            | ServiceError::EventError(_)
            | ServiceError::ExternalServiceError(_)
            | ServiceError::InternalError(_)
            | ServiceError::InternalServerError
            | ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable platform error code, from the centralized code table.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::ValidationError(_) => "E0001",
            ServiceError::MissingFields(_) => "E0013",
            ServiceError::RegistrationFailed(_) => "E0006",
            ServiceError::AuthError(_) => "E0008",
            ServiceError::Unauthorized(_) => "TOKEN_MISSING",
            ServiceError::JwtError(_) => "TOKEN_EXPIRED",
            ServiceError::Forbidden(_) => "E0011",
            ServiceError::NotFound(_) => "E0014",
            ServiceError::Conflict(_) => "E0015",
            ServiceError::InvalidOperation(_) => "E0035",
            ServiceError::PurchaseCreationFailed(_)
            | ServiceError::TransactionDetailsFailed(_) => "E0052",
            ServiceError::ComplianceFailed(_) => "E0045",
            _ => "E9999",
        }
    }

    /// Canonical description attached to the error code.
    pub fn code_message(&self) -> &'static str {
        match self.error_code() {
            "E0001" => "Invalid Input",
            "E0006" => "Registration has Failed",
            "E0008" => "Sign In has Failed",
            "E0011" => "Access Denied",
            "E0013" => "PageIndex and PageSize are Mandatory",
            "E0014" => "Resource Not Found",
            "E0015" => "Resource Already Exists",
            "E0035" => "Invalid Request Parameters",
            "E0045" => "Compliance Operation has Failed",
            "E0052" => "Purchase Operation has Failed",
            "TOKEN_MISSING" => "Authentication Token is Missing",
            "TOKEN_EXPIRED" => "Authentication Token is Invalid or Expired",
            _ => "Unexpected Error",
        }
    }

    /// Message exposed to clients. Internal failures are genericized so
    /// DB/driver detail never leaks into responses.
    pub fn response_message(&self) -> String {
        match self {
            ServiceError::DatabaseError(_)
            | ServiceError::HashError(_)
            | ServiceError::SerializationError(_)
            | ServiceError::EventError(_)
            | ServiceError::ExternalServiceError(_)
            | ServiceError::InternalError(_)
            | ServiceError::InternalServerError
            | ServiceError::Other(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let detail = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let msgs: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{}: {}", field, msgs.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");
        ServiceError::ValidationError(detail)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            success: false,
            error: self.response_message(),
            code: self.error_code().to_string(),
            message: self.code_message().to_string(),
            request_id: crate::observability::current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ServiceError::NotFound("Purchase".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.response_message(), "Purchase not found");
    }

    #[test]
    fn purchase_failures_keep_exact_messages() {
        let err = ServiceError::PurchaseCreationFailed("Failed to Create Purchase".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "E0052");
        assert_eq!(err.response_message(), "Failed to Create Purchase");

        let err =
            ServiceError::TransactionDetailsFailed("Failed to Create Transaction Details".into());
        assert_eq!(err.error_code(), "E0052");
        assert_eq!(
            err.response_message(),
            "Failed to Create Transaction Details"
        );
    }

    #[test]
    fn internal_errors_are_genericized() {
        let err = ServiceError::DatabaseError(DbErr::Custom("secret pool detail".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response_message(), "An internal error occurred");
        assert_eq!(err.error_code(), "E9999");
    }

    #[test]
    fn missing_fields_use_pagination_code() {
        let err = ServiceError::MissingFields("pageIndex and pageSize are required".into());
        assert_eq!(err.error_code(), "E0013");
        assert_eq!(err.code_message(), "PageIndex and PageSize are Mandatory");
    }

    #[test]
    fn validation_errors_flatten_field_messages() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 3, message = "too short"))]
            name: String,
        }

        let probe = Probe {
            name: "ab".to_string(),
        };
        let err: ServiceError = probe.validate().unwrap_err().into();
        match err {
            ServiceError::ValidationError(msg) => assert!(msg.contains("too short")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
