//! Authentication and authorization.
//!
//! HS256 JWTs with an in-memory revocation list, argon2 password hashing,
//! and router extensions for gating routes by authentication or role.

pub mod password_policy;
pub mod permissions;

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumString, FromRepr};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Platform role, stored and transmitted as its numeric code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, FromRepr,
)]
#[repr(i16)]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin = 1,
    Supplier = 2,
    Retailer = 3,
}

impl UserRole {
    pub fn code(self) -> i16 {
        self as i16
    }

    pub fn from_code(code: i16) -> Option<Self> {
        UserRole::from_repr(code)
    }
}

/// JWT claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    /// Numeric role code
    pub role: i16,
    /// Token id, used for revocation
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated caller, inserted by the auth middleware and extracted
/// by handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiration: Duration,
    pub refresh_token_expiration: Duration,
    pub issuer: String,
    pub audience: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_expiration: Duration::hours(24),
            refresh_token_expiration: Duration::days(7),
            issuer: "souk-api".to_string(),
            audience: "souk-clients".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
struct BlacklistedToken {
    jti: String,
    expires_at: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication token is missing")]
    MissingToken,
    #[error("Authentication token is invalid or expired")]
    InvalidToken,
    #[error("Authentication token has been revoked")]
    RevokedToken,
    #[error("Insufficient role for this resource")]
    Forbidden,
    #[error("Password hashing failed")]
    HashFailure,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::RevokedToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::HashFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "TOKEN_MISSING",
            AuthError::InvalidToken => "TOKEN_EXPIRED",
            AuthError::RevokedToken => "TOKEN_REVOKED",
            AuthError::Forbidden => "E0011",
            AuthError::HashFailure => "E9999",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Token issue/verify/revoke service shared across the app.
#[derive(Clone)]
pub struct AuthService {
    config: Arc<AuthConfig>,
    blacklisted_tokens: Arc<RwLock<Vec<BlacklistedToken>>>,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
            blacklisted_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AuthError::HashFailure)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::HashFailure)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn generate_token_pair(
        &self,
        user_id: i64,
        username: &str,
        role: UserRole,
    ) -> Result<TokenPair, AuthError> {
        let access_token =
            self.encode_token(user_id, username, role, self.config.token_expiration)?;
        let refresh_token =
            self.encode_token(user_id, username, role, self.config.refresh_token_expiration)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.token_expiration.num_seconds(),
        })
    }

    fn encode_token(
        &self,
        user_id: i64,
        username: &str,
        role: UserRole,
        lifetime: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.code(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|_| AuthError::InvalidToken)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AuthError::InvalidToken)?;

        let blacklist = self.blacklisted_tokens.read().await;
        if blacklist.iter().any(|t| t.jti == data.claims.jti) {
            return Err(AuthError::RevokedToken);
        }

        Ok(data.claims)
    }

    /// Revoke a token by id until its natural expiry.
    pub async fn revoke_token(&self, claims: &Claims) {
        let mut blacklist = self.blacklisted_tokens.write().await;
        blacklist.push(BlacklistedToken {
            jti: claims.jti.clone(),
            expires_at: claims.exp,
        });
    }

    /// Drop blacklist entries whose tokens have expired anyway.
    pub async fn clean_blacklist(&self) {
        let now = Utc::now().timestamp();
        let mut blacklist = self.blacklisted_tokens.write().await;
        blacklist.retain(|t| t.expires_at > now);
    }
}

fn bearer_token(parts: &axum::http::HeaderMap) -> Option<String> {
    parts
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
}

/// Require a valid token; expose the caller as an `AuthUser` extension.
///
/// Expects `Arc<AuthService>` to have been inserted as a request extension
/// by the service-wide middleware in `main`.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, AuthError> {
    let auth_service = request
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or(AuthError::InvalidToken)?;

    let token = bearer_token(request.headers()).ok_or(AuthError::MissingToken)?;
    let claims = auth_service.validate_token(&token).await?;

    let user_id: i64 = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
    let role = UserRole::from_code(claims.role).ok_or(AuthError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        username: claims.username.clone(),
        role,
    });
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Router helpers for gating whole sub-routers.
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: UserRole) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: UserRole) -> Self {
        self.layer(axum::middleware::from_fn(
            move |request: Request, next: Next| async move {
                let user = request
                    .extensions()
                    .get::<AuthUser>()
                    .cloned()
                    .ok_or(AuthError::MissingToken)?;
                if !user.has_role(role) && !user.is_admin() {
                    return Err(AuthError::Forbidden);
                }
                Ok::<Response, AuthError>(next.run(request).await)
            },
        ))
        .layer(axum::middleware::from_fn(auth_middleware))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new("unit-test-secret-0123456789abcdef"))
    }

    #[tokio::test]
    async fn token_round_trip() {
        let svc = service();
        let pair = svc
            .generate_token_pair(42, "amal", UserRole::Retailer)
            .unwrap();
        let claims = svc.validate_token(&pair.access_token).await.unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, UserRole::Retailer.code());
        assert_eq!(claims.username, "amal");
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let svc = service();
        let pair = svc
            .generate_token_pair(7, "admin", UserRole::Admin)
            .unwrap();
        let claims = svc.validate_token(&pair.access_token).await.unwrap();
        svc.revoke_token(&claims).await;
        assert!(matches!(
            svc.validate_token(&pair.access_token).await,
            Err(AuthError::RevokedToken)
        ));
    }

    #[tokio::test]
    async fn blacklist_cleanup_drops_expired_entries() {
        let svc = service();
        svc.blacklisted_tokens.write().await.push(BlacklistedToken {
            jti: "stale".to_string(),
            expires_at: 0,
        });
        svc.clean_blacklist().await;
        assert!(svc.blacklisted_tokens.read().await.is_empty());
    }

    #[test]
    fn password_hash_round_trip() {
        let svc = service();
        let hash = svc.hash_password("S3cure!Passw0rd").unwrap();
        assert!(svc.verify_password("S3cure!Passw0rd", &hash).unwrap());
        assert!(!svc.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn role_codes_round_trip() {
        assert_eq!(UserRole::from_code(1), Some(UserRole::Admin));
        assert_eq!(UserRole::from_code(2), Some(UserRole::Supplier));
        assert_eq!(UserRole::from_code(3), Some(UserRole::Retailer));
        assert_eq!(UserRole::from_code(9), None);
        assert_eq!(UserRole::Retailer.code(), 3);
    }
}
