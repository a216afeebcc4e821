pub mod auth;
pub mod compliance;
pub mod dashboards;
pub mod notifications;
pub mod products;
pub mod purchases;
pub mod users;
