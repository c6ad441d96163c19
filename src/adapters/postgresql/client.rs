//! PostgreSQL client implementation
//!
//! This module owns the connection pool used by the PostgreSQL recorder.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{PadkitError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::NoTls;

const SCHEMA_SQL: &str = include_str!("../../../migrations/postgresql/001_export_history.sql");

/// Pooled PostgreSQL client for padkit
pub struct PostgreSQLClient {
    pool: Pool,
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// The pool connects lazily; call [`test_connection`](Self::test_connection)
    /// to fail early on a bad host or credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed or the pool
    /// cannot be built.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_ref()
            .parse()
            .map_err(|e| {
                PadkitError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| {
                PadkitError::Database(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| PadkitError::Database(format!("Connection test failed: {}", e)))?;

        tracing::info!(target = %self.connection_string_safe(), "PostgreSQL connection test successful");
        Ok(())
    }

    /// Create the export history tables if they do not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .batch_execute(SCHEMA_SQL)
            .await
            .map_err(|e| PadkitError::Database(format!("Failed to execute migration: {}", e)))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Get a connection from the pool with the statement timeout applied
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        let client = self.pool.get().await.map_err(|e| {
            PadkitError::Database(format!("Failed to get connection from pool: {}", e))
        })?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client
            .batch_execute(&timeout_query)
            .await
            .map_err(|e| PadkitError::Database(format!("Failed to set statement timeout: {}", e)))?;

        Ok(client)
    }

    /// Connection target with credentials removed
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_ref())
    }

    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

fn redact_connection_string(connection_string: &str) -> String {
    match connection_string.rsplit_once('@') {
        Some((_, host)) => format!("postgresql://***@{}", host),
        None => "postgresql://***".to_string(),
    }
}
