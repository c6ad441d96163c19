//! Export recorder factory
//!
//! This module creates the export history backend chosen by configuration.

use crate::adapters::database::traits::ExportRecorder;
use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLRecorder};
use crate::adapters::sqlite::SqliteRecorder;
use crate::config::schema::{DatabaseTarget, PadkitConfig};
use crate::domain::{PadkitError, Result};
use std::sync::Arc;

/// Create the recorder for `config.database_target` and apply its schema
///
/// # Errors
///
/// Returns an error if the backend section is missing, the connection
/// cannot be opened, or the schema cannot be applied.
pub async fn create_export_recorder(config: &PadkitConfig) -> Result<Arc<dyn ExportRecorder>> {
    let recorder: Arc<dyn ExportRecorder> = match config.database_target {
        DatabaseTarget::Sqlite => {
            tracing::info!("Creating SQLite export recorder");
            Arc::new(SqliteRecorder::connect(&config.sqlite).await?)
        }
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                PadkitError::Configuration(
                    "database_target is postgresql but [postgresql] is missing".to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL export recorder");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            client.test_connection().await?;
            Arc::new(PostgreSQLRecorder::new(client))
        }
    };

    recorder.ensure_schema().await?;
    Ok(recorder)
}
