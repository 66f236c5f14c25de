//! Database connection and pool management.
//!
//! Builds a SeaORM connection pool from [`DatabaseConfig`] and retries
//! transient connection failures with exponential backoff.

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{AppConfig, DatabaseConfig};

const MAX_CONNECT_ATTEMPTS: u32 = 5;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {source}")]
    ConnectionFailed {
        #[from]
        source: sea_orm::DbErr,
    },
    #[error("Invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Connection options derived from the pool settings.
///
/// The pool may grow to `pool_size + max_overflow` connections and keeps
/// `pool_size` warm; connections are recycled after `pool_recycle_seconds`.
pub fn connect_options(cfg: &DatabaseConfig) -> Result<ConnectOptions> {
    let url = cfg.url().map_err(|err| DatabaseError::InvalidConfiguration {
        message: err.to_string(),
    })?;

    let mut opt = ConnectOptions::new(url);
    opt.max_connections(cfg.max_connections())
        .min_connections(cfg.pool_size.min(cfg.max_connections()))
        .acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
        .max_lifetime(Duration::from_secs(cfg.pool_recycle_seconds))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);
    Ok(opt)
}

/// Initializes a database connection pool with the given configuration.
///
/// ```no_run
/// use sensorhub::{config::AppConfig, db::init_pool};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = AppConfig::default();
///     let db = init_pool(&config).await?;
///     Ok(())
/// }
/// ```
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    cfg.database
        .validate()
        .map_err(|err| DatabaseError::InvalidConfiguration {
            message: err.to_string(),
        })?;
    let opt = connect_options(&cfg.database)?;

    let mut retry_delay = INITIAL_RETRY_DELAY;
    let mut attempt = 1;
    loop {
        match Database::connect(opt.clone()).await {
            Ok(conn) => {
                tracing::info!(attempt, "Connected to database");
                return Ok(conn);
            }
            Err(err) if attempt >= MAX_CONNECT_ATTEMPTS => {
                tracing::error!(
                    attempts = attempt,
                    error = %err,
                    "Failed to connect to database"
                );
                return Err(DatabaseError::ConnectionFailed { source: err }.into());
            }
            Err(err) => {
                tracing::warn!(
                    attempt,
                    error = %err,
                    retry_in_ms = retry_delay.as_millis() as u64,
                    "Database connection attempt failed; retrying"
                );
                sleep(retry_delay).await;
                retry_delay *= 2;
                attempt += 1;
            }
        }
    }
}

/// Verifies the connection is alive by running `SELECT 1`.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());

    db.query_one(stmt)
        .await
        .context("Database health check failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_configuration_is_rejected() {
        let mut config = AppConfig::default();
        config.database.pool_size = 0;

        let result = init_pool(&config).await;
        assert!(matches!(
            result.unwrap_err().downcast::<DatabaseError>(),
            Ok(DatabaseError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_connects_to_sqlite_override() {
        let mut config = AppConfig::default();
        config.database.url = Some("sqlite::memory:".to_string());
        config.database.pool_size = 1;
        config.database.max_overflow = 0;

        let db = init_pool(&config).await.unwrap();
        health_check(&db).await.unwrap();
    }

    #[test]
    fn test_connect_options_follow_pool_settings() {
        let cfg = DatabaseConfig::default();
        let opt = connect_options(&cfg).unwrap();

        assert_eq!(opt.get_max_connections(), Some(60));
        assert_eq!(opt.get_min_connections(), Some(50));
        assert_eq!(opt.get_max_lifetime(), Some(Duration::from_secs(1800)));
    }
}
