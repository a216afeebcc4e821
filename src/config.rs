use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use validator::{Validate, ValidationError};

const DEV_DEFAULT_JWT_SECRET: &str =
    "dev-only-secret-change-me-0123456789abcdefghijklmnopqrstuvwxyz-ABCDEF";

const MIN_JWT_SECRET_LEN: usize = 64;
const MIN_JWT_SECRET_UNIQUE_CHARS: usize = 10;

/// Application configuration, loaded from `config/{env}.toml` plus
/// `APP_`-prefixed environment variables (env wins).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection string (Postgres in deployment, SQLite in tests)
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Maximum DB pool size
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Minimum idle connections kept in the pool
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Seconds to wait for a pooled connection
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    /// Run embedded migrations on startup
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,

    /// HMAC secret for JWT signing
    #[validate(custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    #[validate(range(min = 60, max = 604_800))]
    pub jwt_expiration: u64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_token_expiration")]
    pub refresh_token_expiration: u64,

    #[serde(default = "default_host")]
    pub host: String,

    #[validate(range(min = 1, max = 65535))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// development | staging | production
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of the human format
    #[serde(default)]
    pub log_json: bool,

    /// Allowed CORS origins; empty means permissive in development only
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    /// HTTP mail relay endpoint; unset disables outbound email
    #[serde(default)]
    pub mail_relay_url: Option<String>,

    /// Shared secret for signing relay payloads
    #[serde(default)]
    pub mail_relay_secret: Option<String>,

    /// From address stamped on outbound mail
    #[serde(default = "default_mail_from")]
    pub mail_from: String,

    /// Outbox worker poll interval in milliseconds
    #[serde(default = "default_outbox_poll_interval_ms")]
    #[validate(range(min = 50, max = 60_000))]
    pub outbox_poll_interval_ms: u64,

    /// Rows claimed per outbox poll
    #[serde(default = "default_outbox_batch_size")]
    pub outbox_batch_size: u64,

    /// Delivery attempts before an outbox event is parked as failed
    #[serde(default = "default_outbox_max_attempts")]
    #[validate(range(min = 1, max = 20))]
    pub outbox_max_attempts: i32,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Permissive CORS is only ever acceptable outside production.
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.cors_allowed_origins.is_empty() && !self.is_production()
    }

    /// Cross-field constraints that the derive can't express.
    pub fn validate_additional_constraints(&self) -> Result<(), AppConfigError> {
        if self.is_production() && self.jwt_secret == DEV_DEFAULT_JWT_SECRET {
            return Err(AppConfigError::Validation(
                "the development JWT secret must not be used in production".into(),
            ));
        }
        if self.is_production() && self.cors_allowed_origins.is_empty() {
            return Err(AppConfigError::Validation(
                "cors_allowed_origins must be set explicitly in production".into(),
            ));
        }
        if self.db_min_connections > self.db_max_connections {
            return Err(AppConfigError::Validation(
                "db_min_connections exceeds db_max_connections".into(),
            ));
        }
        if self.mail_relay_url.is_some() && self.mail_relay_secret.is_none() {
            return Err(AppConfigError::Validation(
                "mail_relay_secret is required when mail_relay_url is set".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    if secret.len() < MIN_JWT_SECRET_LEN {
        return Err(ValidationError::new("jwt_secret_too_short"));
    }
    let lowered = secret.to_ascii_lowercase();
    for banned in ["changeme", "secret123", "placeholder", "your-secret"] {
        if lowered.contains(banned) {
            return Err(ValidationError::new("jwt_secret_placeholder"));
        }
    }
    let unique: std::collections::HashSet<char> = secret.chars().collect();
    if unique.len() < MIN_JWT_SECRET_UNIQUE_CHARS {
        return Err(ValidationError::new("jwt_secret_low_entropy"));
    }
    Ok(())
}

fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    10
}
fn default_auto_migrate() -> bool {
    true
}
fn default_jwt_expiration() -> u64 {
    86_400
}
fn default_refresh_token_expiration() -> u64 {
    7 * 86_400
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_environment() -> String {
    "development".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_mail_from() -> String {
    "no-reply@souk.example".to_string()
}
fn default_outbox_poll_interval_ms() -> u64 {
    500
}
fn default_outbox_batch_size() -> u64 {
    32
}
fn default_outbox_max_attempts() -> i32 {
    8
}

/// Load and validate configuration.
///
/// Layering order: `config/default.toml`, then `config/{RUN_ENV}.toml`,
/// then `APP_*` environment variables.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

    let mut builder = Config::builder()
        .set_default("environment", run_env.clone())?
        .set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    // DATABASE_URL is conventional enough to honor without the prefix
    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database_url", url)?;
    }

    let config: AppConfig = builder.build()?.try_deserialize()?;

    config
        .validate()
        .map_err(|e| AppConfigError::Validation(e.to_string()))?;
    config.validate_additional_constraints()?;

    Ok(config)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_tracing(level: &str, json: bool) {
    let directive = format!("souk_api={level},tower_http=debug,sea_orm=warn");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 5,
            db_min_connections: 1,
            db_connect_timeout_secs: 5,
            auto_migrate: true,
            jwt_secret: DEV_DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration: 3600,
            refresh_token_expiration: 86_400,
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            log_level: "debug".to_string(),
            log_json: false,
            cors_allowed_origins: vec![],
            mail_relay_url: None,
            mail_relay_secret: None,
            mail_from: default_mail_from(),
            outbox_poll_interval_ms: 100,
            outbox_batch_size: 16,
            outbox_max_attempts: 8,
        }
    }

    #[test]
    fn dev_defaults_pass_validation() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
        assert!(cfg.validate_additional_constraints().is_ok());
        assert!(cfg.should_allow_permissive_cors());
    }

    #[test]
    fn production_rejects_dev_secret() {
        let mut cfg = base_config();
        cfg.environment = "production".to_string();
        cfg.cors_allowed_origins = vec!["https://souk.example".to_string()];
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn production_requires_explicit_cors() {
        let mut cfg = base_config();
        cfg.environment = "production".to_string();
        cfg.jwt_secret = "x1y2z3!A".repeat(10);
        assert!(cfg.validate_additional_constraints().is_err());
        assert!(!cfg.should_allow_permissive_cors());
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let mut cfg = base_config();
        cfg.jwt_secret = "short".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn relay_url_requires_secret() {
        let mut cfg = base_config();
        cfg.mail_relay_url = Some("https://relay.souk.example/send".to_string());
        assert!(cfg.validate_additional_constraints().is_err());
        cfg.mail_relay_secret = Some("relay-secret".to_string());
        assert!(cfg.validate_additional_constraints().is_ok());
    }
}
