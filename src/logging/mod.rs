//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and an
//! optional rotating JSON file layer.
//!
//! # Example
//!
//! ```no_run
//! use padkit::logging::init_logging;
//! use padkit::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(sample_id = 7, "Exporting sample");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export job
///
/// # Example
///
/// ```no_run
/// use padkit::log_export_start;
///
/// log_export_start!("batch", 12);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($export_type:expr, $requested:expr) => {
        tracing::info!(
            export_type = %$export_type,
            requested = $requested,
            "Starting export"
        );
    };
}

/// Log the completion of an export job
///
/// # Example
///
/// ```no_run
/// use padkit::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!("kit", 14, 2, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($export_type:expr, $successful:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            export_type = %$export_type,
            successful = $successful,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log a per-item failure inside an export job
///
/// # Example
///
/// ```no_run
/// use padkit::log_item_failure;
///
/// log_item_failure!(7, "validation_failed", "duration 50 ms is below 100 ms");
/// ```
#[macro_export]
macro_rules! log_item_failure {
    ($sample_id:expr, $kind:expr, $message:expr) => {
        tracing::warn!(
            sample_id = %$sample_id,
            kind = %$kind,
            error = %$message,
            "Export item failed"
        );
    };
}
