//! Export history abstraction
//!
//! [`ExportRecorder`] is implemented by the SQLite and PostgreSQL backends;
//! [`create_export_recorder`] picks one from `database_target`.

pub mod factory;
pub mod models;
pub mod traits;

pub use factory::create_export_recorder;
pub use models::{
    ExportDetail, ExportHistoryPage, ExportRecord, ExportType, ExportedSampleRecord,
    NewExportRecord, NewExportedSample,
};
pub use traits::ExportRecorder;
