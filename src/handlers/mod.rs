pub mod auth;
pub mod common;
pub mod compliance;
pub mod dashboards;
pub mod products;
pub mod purchases;
pub mod users;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::mailer::Mailer;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub auth_flows: Arc<crate::services::auth::AuthFlowService>,
    pub users: Arc<crate::services::users::UserService>,
    pub dashboards: Arc<crate::services::dashboards::DashboardService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub purchases: Arc<crate::services::purchases::PurchaseService>,
    pub compliance: Arc<crate::services::compliance::ComplianceService>,
    pub notifications: Arc<crate::services::notifications::NotificationService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        auth_service: Arc<AuthService>,
        mailer: Arc<Mailer>,
    ) -> Self {
        let auth_flows = Arc::new(crate::services::auth::AuthFlowService::new(
            db_pool.clone(),
            auth_service,
            mailer,
            Some(event_sender.clone()),
        ));
        let users = Arc::new(crate::services::users::UserService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let dashboards = Arc::new(crate::services::dashboards::DashboardService::new(
            db_pool.clone(),
        ));
        let products = Arc::new(crate::services::products::ProductService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let purchases = Arc::new(crate::services::purchases::PurchaseService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let compliance = Arc::new(crate::services::compliance::ComplianceService::new(
            db_pool.clone(),
            Some(event_sender),
        ));
        let notifications = Arc::new(crate::services::notifications::NotificationService::new(
            db_pool,
        ));

        Self {
            auth_flows,
            users,
            dashboards,
            products,
            purchases,
            compliance,
            notifications,
        }
    }
}
