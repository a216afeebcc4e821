use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    Statement, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use crate::config::AppConfig;

pub type DbPool = DatabaseConnection;

/// Connection tuning, split from `AppConfig` so tests can build pools
/// without a full application config.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            sqlx_logging: false,
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            url: config.database_url.clone(),
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            connect_timeout: Duration::from_secs(config.db_connect_timeout_secs),
            sqlx_logging: config.is_development(),
        }
    }
}

pub async fn establish_connection_with_config(config: DbConfig) -> Result<DbPool, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(config.sqlx_logging);

    let pool = Database::connect(options).await?;
    info!(
        max_connections = config.max_connections,
        "database connection established"
    );
    Ok(pool)
}

pub async fn establish_connection_from_app_config(config: &AppConfig) -> Result<DbPool, DbErr> {
    establish_connection_with_config(DbConfig::from(config)).await
}

/// Instrumented access wrapper; counts queries and transactions and
/// records their latency under the `souk_db` metric prefix.
#[derive(Clone)]
pub struct DatabaseAccess {
    pool: Arc<DbPool>,
}

impl DatabaseAccess {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub async fn transaction<F, T, E>(&self, operation: &'static str, f: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<T, E>> + Send + 'c>,
        >,
        T: Send,
        E: From<DbErr> + Send,
    {
        let start = Instant::now();
        let txn = self.pool.begin().await.map_err(E::from)?;
        let result = f(&txn).await;

        let outcome = match result {
            Ok(value) => {
                txn.commit().await.map_err(E::from)?;
                counter!("souk_db.transaction.committed", 1, "operation" => operation);
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!(error = %rollback_err, operation, "transaction rollback failed");
                }
                counter!("souk_db.transaction.rolled_back", 1, "operation" => operation);
                Err(err)
            }
        };

        histogram!("souk_db.transaction.duration", start.elapsed().as_secs_f64(), "operation" => operation);
        outcome
    }
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), DbErr> {
    info!("running embedded migrations");
    crate::migrator::Migrator::up(pool, None).await?;
    info!("migrations complete");
    Ok(())
}

pub async fn check_connection(pool: &DbPool) -> Result<(), DbErr> {
    pool.execute(Statement::from_string(
        pool.get_database_backend(),
        "SELECT 1".to_string(),
    ))
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_config_follows_app_config() {
        let cfg = DbConfig::default();
        assert_eq!(cfg.min_connections, 1);
        assert!(!cfg.sqlx_logging);
    }
}
