//! SQLite export recorder

use crate::adapters::database::models::{
    normalize_page, size_to_i64, ExportDetail, ExportHistoryPage, ExportRecord,
    ExportedSampleRecord, NewExportRecord,
};
use crate::adapters::database::traits::ExportRecorder;
use crate::config::schema::SqliteConfig;
use crate::domain::ids::{ExportId, SampleId};
use crate::domain::{PadkitError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use std::str::FromStr;

const SCHEMA_SQL: &str = include_str!("../../../migrations/sqlite/001_export_history.sql");

/// Export history stored in a SQLite database
#[derive(Clone)]
pub struct SqliteRecorder {
    pool: SqlitePool,
}

impl SqliteRecorder {
    /// Open (creating if missing) the database at `config.url`
    ///
    /// In-memory databases are limited to one connection that is never
    /// recycled, since each connection would otherwise see its own database.
    pub async fn connect(config: &SqliteConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                PadkitError::Configuration(format!("Invalid SQLite url '{}': {}", config.url, e))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = config.url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            PadkitError::Database(format!("Failed to open SQLite database: {}", e))
        })?;

        tracing::info!(url = %config.url, in_memory, "Opened SQLite export history");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert_all(
        tx: &mut Transaction<'_, Sqlite>,
        record: &NewExportRecord,
    ) -> std::result::Result<i64, sqlx::Error> {
        let export_id = sqlx::query(
            r#"
            INSERT INTO export_records (
                export_type, sample_count, output_path, organize_by, format,
                total_size_bytes, duration_seconds, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.export_type.as_str())
        .bind(record.sample_count() as i64)
        .bind(&record.output_path)
        .bind(&record.organize_by)
        .bind(&record.format)
        .bind(size_to_i64(record.total_size_bytes))
        .bind(record.duration_seconds)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?
        .last_insert_rowid();

        for sample in &record.samples {
            sqlx::query(
                r#"
                INSERT INTO export_record_samples (
                    export_id, sample_id, output_filename, output_subfolder,
                    success, error_message
                )
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(export_id)
            .bind(sample.sample_id.value())
            .bind(sample.output_filename.as_deref())
            .bind(sample.output_subfolder.as_deref())
            .bind(sample.success)
            .bind(sample.error_message.as_deref())
            .execute(&mut **tx)
            .await?;
        }

        Ok(export_id)
    }
}

fn record_from_row(row: &SqliteRow) -> Result<ExportRecord> {
    let id: i64 = row.try_get("id")?;
    let export_type: String = row.try_get("export_type")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(ExportRecord {
        id: ExportId::new(id).map_err(PadkitError::Database)?,
        export_type: export_type.parse()?,
        sample_count: row.try_get("sample_count")?,
        output_path: row.try_get("output_path")?,
        organize_by: row.try_get("organize_by")?,
        format: row.try_get("format")?,
        total_size_bytes: row.try_get("total_size_bytes")?,
        duration_seconds: row.try_get("duration_seconds")?,
        created_at,
    })
}

fn sample_from_row(row: &SqliteRow) -> Result<ExportedSampleRecord> {
    let export_id: i64 = row.try_get("export_id")?;
    let sample_id: i64 = row.try_get("sample_id")?;

    Ok(ExportedSampleRecord {
        id: row.try_get("id")?,
        export_id: ExportId::new(export_id).map_err(PadkitError::Database)?,
        sample_id: SampleId::new(sample_id).map_err(PadkitError::Database)?,
        output_filename: row.try_get("output_filename")?,
        output_subfolder: row.try_get("output_subfolder")?,
        success: row.try_get("success")?,
        error_message: row.try_get("error_message")?,
    })
}

#[async_trait]
impl ExportRecorder for SqliteRecorder {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| PadkitError::Database(format!("Failed to apply SQLite schema: {}", e)))?;
        tracing::debug!("SQLite export history schema ready");
        Ok(())
    }

    async fn record_export(&self, record: &NewExportRecord) -> Result<ExportId> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            PadkitError::Persistence(format!("Failed to begin transaction: {}", e))
        })?;

        match Self::insert_all(&mut tx, record).await {
            Ok(id) => {
                tx.commit().await.map_err(|e| {
                    PadkitError::Persistence(format!("Failed to commit export record: {}", e))
                })?;
                tracing::debug!(
                    export_id = id,
                    export_type = %record.export_type,
                    sample_count = record.sample_count(),
                    "Recorded export"
                );
                ExportId::new(id).map_err(PadkitError::Persistence)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::error!(error = %rollback_error, "Rollback failed");
                }
                tracing::error!(
                    export_type = %record.export_type,
                    error = %e,
                    "Export record rolled back"
                );
                Err(PadkitError::Persistence(format!(
                    "Failed to record {} export: {}",
                    record.export_type, e
                )))
            }
        }
    }

    async fn get_export(&self, id: ExportId) -> Result<Option<ExportDetail>> {
        let row = sqlx::query("SELECT * FROM export_records WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let record = record_from_row(&row)?;

        let samples = sqlx::query(
            "SELECT * FROM export_record_samples WHERE export_id = ? ORDER BY id",
        )
        .bind(id.value())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(sample_from_row)
        .collect::<Result<Vec<_>>>()?;

        Ok(Some(ExportDetail { record, samples }))
    }

    async fn list_exports(&self, page: u32, page_size: u32) -> Result<ExportHistoryPage> {
        let (page, page_size, offset) = normalize_page(page, page_size);

        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM export_records")
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;

        let records = sqlx::query(
            "SELECT * FROM export_records ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(i64::from(page_size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(record_from_row)
        .collect::<Result<Vec<_>>>()?;

        Ok(ExportHistoryPage {
            page,
            page_size,
            total: u64::try_from(total).unwrap_or_default(),
            records,
        })
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::models::{ExportType, NewExportedSample};

    async fn recorder() -> SqliteRecorder {
        let config = SqliteConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let recorder = SqliteRecorder::connect(&config).await.unwrap();
        recorder.ensure_schema().await.unwrap();
        recorder
    }

    fn child(id: u32, success: bool) -> NewExportedSample {
        NewExportedSample {
            sample_id: SampleId::from(id),
            output_filename: success.then(|| format!("s{id}.wav")),
            output_subfolder: Some(String::new()),
            success,
            error_message: (!success).then(|| "too short".to_string()),
        }
    }

    fn record(export_type: ExportType, samples: Vec<NewExportedSample>) -> NewExportRecord {
        NewExportRecord {
            export_type,
            output_path: "/exports".to_string(),
            organize_by: "flat".to_string(),
            format: "wav".to_string(),
            total_size_bytes: 2048,
            duration_seconds: 1.5,
            samples,
        }
    }

    #[tokio::test]
    async fn test_record_and_fetch() {
        let recorder = recorder().await;
        let id = recorder
            .record_export(&record(ExportType::Batch, vec![child(1, true), child(2, false)]))
            .await
            .unwrap();

        let detail = recorder.get_export(id).await.unwrap().unwrap();
        assert_eq!(detail.record.export_type, ExportType::Batch);
        assert_eq!(detail.record.sample_count, 2);
        assert_eq!(detail.samples.len(), 2);
        assert!(detail.samples[0].success);
        assert_eq!(detail.samples[1].error_message.as_deref(), Some("too short"));
    }

    #[tokio::test]
    async fn test_unknown_export() {
        let recorder = recorder().await;
        assert!(recorder.get_export(ExportId::from(77)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let recorder = recorder().await;
        for _ in 0..3 {
            recorder
                .record_export(&record(ExportType::Single, vec![child(1, true)]))
                .await
                .unwrap();
        }

        let page = recorder.list_exports(1, 2).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.records.len(), 2);
        assert!(page.records[0].id.value() > page.records[1].id.value());

        let page = recorder.list_exports(2, 2).await.unwrap();
        assert_eq!(page.records.len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let recorder = recorder().await;
        recorder.ensure_schema().await.unwrap();
    }
}
