//! PostgreSQL export recorder

use crate::adapters::database::models::{
    normalize_page, size_to_i64, ExportDetail, ExportHistoryPage, ExportRecord,
    ExportedSampleRecord, NewExportRecord,
};
use crate::adapters::database::traits::ExportRecorder;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::domain::ids::{ExportId, SampleId};
use crate::domain::{PadkitError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::Row;

/// Export history stored in PostgreSQL
pub struct PostgreSQLRecorder {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLRecorder {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

fn db_error(context: &str) -> impl Fn(tokio_postgres::Error) -> PadkitError + '_ {
    move |e| PadkitError::Database(format!("{}: {}", context, e))
}

fn record_from_row(row: &Row) -> Result<ExportRecord> {
    let read = db_error("Failed to read export record");
    let id: i64 = row.try_get("id").map_err(&read)?;
    let export_type: String = row.try_get("export_type").map_err(&read)?;

    Ok(ExportRecord {
        id: ExportId::new(id).map_err(PadkitError::Database)?,
        export_type: export_type.parse()?,
        sample_count: row.try_get("sample_count").map_err(&read)?,
        output_path: row.try_get("output_path").map_err(&read)?,
        organize_by: row.try_get("organize_by").map_err(&read)?,
        format: row.try_get("format").map_err(&read)?,
        total_size_bytes: row.try_get("total_size_bytes").map_err(&read)?,
        duration_seconds: row.try_get("duration_seconds").map_err(&read)?,
        created_at: row.try_get("created_at").map_err(&read)?,
    })
}

fn sample_from_row(row: &Row) -> Result<ExportedSampleRecord> {
    let read = db_error("Failed to read exported sample");
    let export_id: i64 = row.try_get("export_id").map_err(&read)?;
    let sample_id: i64 = row.try_get("sample_id").map_err(&read)?;

    Ok(ExportedSampleRecord {
        id: row.try_get("id").map_err(&read)?,
        export_id: ExportId::new(export_id).map_err(PadkitError::Database)?,
        sample_id: SampleId::new(sample_id).map_err(PadkitError::Database)?,
        output_filename: row.try_get("output_filename").map_err(&read)?,
        output_subfolder: row.try_get("output_subfolder").map_err(&read)?,
        success: row.try_get("success").map_err(&read)?,
        error_message: row.try_get("error_message").map_err(&read)?,
    })
}

#[async_trait]
impl ExportRecorder for PostgreSQLRecorder {
    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn record_export(&self, record: &NewExportRecord) -> Result<ExportId> {
        let persistence =
            |e: tokio_postgres::Error| PadkitError::Persistence(format!("Failed to record export: {}", e));

        let mut conn = self.client.get_connection().await?;
        let tx = conn.transaction().await.map_err(persistence)?;

        let inserted: std::result::Result<i64, tokio_postgres::Error> = async {
            let row = tx
                .query_one(
                    r#"
                    INSERT INTO export_records (
                        export_type, sample_count, output_path, organize_by, format,
                        total_size_bytes, duration_seconds
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING id
                    "#,
                    &[
                        &record.export_type.as_str(),
                        &(record.sample_count() as i64),
                        &record.output_path,
                        &record.organize_by,
                        &record.format,
                        &size_to_i64(record.total_size_bytes),
                        &record.duration_seconds,
                    ],
                )
                .await?;
            let export_id: i64 = row.try_get(0)?;

            let statement = tx
                .prepare(
                    r#"
                    INSERT INTO export_record_samples (
                        export_id, sample_id, output_filename, output_subfolder,
                        success, error_message
                    )
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .await?;

            for sample in &record.samples {
                tx.execute(
                    &statement,
                    &[
                        &export_id,
                        &sample.sample_id.value(),
                        &sample.output_filename,
                        &sample.output_subfolder,
                        &sample.success,
                        &sample.error_message,
                    ],
                )
                .await?;
            }

            Ok(export_id)
        }
        .await;

        match inserted {
            Ok(id) => {
                tx.commit().await.map_err(persistence)?;
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
                tracing::error!(export_type = %record.export_type, error = %e, "Export record rolled back");
                Err(persistence(e))
            }
        }
    }

    async fn get_export(&self, id: ExportId) -> Result<Option<ExportDetail>> {
        let conn = self.client.get_connection().await?;

        let row = conn
            .query_opt("SELECT * FROM export_records WHERE id = $1", &[&id.value()])
            .await
            .map_err(db_error("Failed to load export"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let record = record_from_row(&row)?;

        let samples = conn
            .query(
                "SELECT * FROM export_record_samples WHERE export_id = $1 ORDER BY id",
                &[&id.value()],
            )
            .await
            .map_err(db_error("Failed to load exported samples"))?
            .iter()
            .map(sample_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(ExportDetail { record, samples }))
    }

    async fn list_exports(&self, page: u32, page_size: u32) -> Result<ExportHistoryPage> {
        let (page, page_size, offset) = normalize_page(page, page_size);
        let conn = self.client.get_connection().await?;

        let total: i64 = conn
            .query_one("SELECT COUNT(*) FROM export_records", &[])
            .await
            .and_then(|row| row.try_get(0))
            .map_err(db_error("Failed to count exports"))?;

        let records = conn
            .query(
                "SELECT * FROM export_records ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
                &[&i64::from(page_size), &offset],
            )
            .await
            .map_err(db_error("Failed to list exports"))?
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
        "postgresql"
    }
}
