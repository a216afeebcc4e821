use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    middleware, Router,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseBackend, Statement};
use serde_json::{json, Value};
use souk_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::quotation,
    events::{self, outbox::OutboxWorker, EventSender},
    handlers::AppServices,
    mailer::Mailer,
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Test harness backed by a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub mailer: Arc<Mailer>,
    db_file: String,
    _event_task: tokio::task::JoinHandle<()>,
}

fn test_config(db_file: &str) -> AppConfig {
    AppConfig {
        database_url: format!("sqlite://{db_file}?mode=rwc"),
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        auto_migrate: true,
        jwt_secret: "test-only-jwt-signing-key-0123456789abcdefghijklmnopqrstuvwxyz-!".to_string(),
        jwt_expiration: 3600,
        refresh_token_expiration: 86_400,
        host: "127.0.0.1".to_string(),
        port: 18_080,
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        log_json: false,
        cors_allowed_origins: vec![],
        mail_relay_url: None,
        mail_relay_secret: None,
        mail_from: "no-reply@souk.example".to_string(),
        outbox_poll_interval_ms: 50,
        outbox_batch_size: 32,
        outbox_max_attempts: 3,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let db_file = format!("souk_test_{}.db", Uuid::new_v4().simple());
        let _ = std::fs::remove_file(&db_file);

        let cfg = test_config(&db_file);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_service = Arc::new(AuthService::new(AuthConfig::new(cfg.jwt_secret.clone())));
        let mailer = Arc::new(Mailer::disabled());

        let services = AppServices::new(
            db_arc.clone(),
            event_sender.clone(),
            auth_service.clone(),
            mailer.clone(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let api_router = souk_api::api_v1_routes().layer(middleware::from_fn_with_state(
            auth_service,
            |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
             mut req: Request<Body>,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ));

        let router = Router::new()
            .nest("/api/v1", api_router)
            .with_state(state.clone());

        Self {
            router,
            state,
            mailer,
            db_file,
            _event_task: event_task,
        }
    }

    /// An outbox worker wired to this app's database and mailer, for
    /// draining synchronously in tests.
    #[allow(dead_code)]
    pub fn outbox_worker(&self) -> OutboxWorker {
        OutboxWorker::new(
            self.state.db.clone(),
            self.mailer.clone(),
            Duration::from_millis(10),
            32,
            3,
        )
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    #[allow(dead_code)]
    pub async fn post(&self, uri: &str, body: Value, token: &str) -> axum::response::Response {
        self.request(Method::POST, uri, Some(body), Some(token))
            .await
    }

    /// Register an account through the real registration flow and return
    /// `(user_id, profile_id, access_token)`. `profile_id` is the
    /// retailer/supplier id, or the user id for admins.
    #[allow(dead_code)]
    pub async fn register_user(&self, username: &str, role: i16) -> (i64, i64, String) {
        let mut request = json!({
            "username": username,
            "email": format!("{username}@souk.example"),
            "password": "S3cure!Passw0rd",
            "role": role,
        });
        if role != 1 {
            request["tax_identification_number"] = json!("TIN-0001");
            request["bank_account_number"] = json!("ACC-0001");
            request["iban"] = json!("JO94CBJO0010000000000131000302");
            request["establishment"] = json!({
                "name": format!("{username} est"),
                "registration_number": format!("REG-{username}"),
            });
        }

        let response = self
            .request(Method::POST, "/api/v1/auth/register", Some(request), None)
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "registration failed");
        let body = body_json(response).await;

        let data = &body["data"];
        let user_id = data["user_id"].as_i64().expect("user_id in response");
        let profile_id = data["supplier_id"]
            .as_i64()
            .or_else(|| data["retailer_id"].as_i64())
            .unwrap_or(user_id);
        let token = data["access_token"]
            .as_str()
            .expect("access_token in response")
            .to_string();
        (user_id, profile_id, token)
    }

    /// Seed a quotation row directly; quotations are managed upstream of
    /// this service.
    #[allow(dead_code)]
    pub async fn seed_quotation(&self, retailer_id: i64, supplier_id: i64) -> i64 {
        let row = quotation::ActiveModel {
            retailer_id: Set(retailer_id),
            supplier_id: Set(supplier_id),
            status: Set(2),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("failed to seed quotation");
        row.id
    }

    /// Drop a table to force a mid-transaction failure.
    #[allow(dead_code)]
    pub async fn drop_table(&self, table: &str) {
        self.state
            .db
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                format!("DROP TABLE {table};"),
            ))
            .await
            .expect("failed to drop table");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_file);
    }
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not json")
}
