//! PostgreSQL export history backend
//!
//! Selected with `database_target = "postgresql"`. Connections are pooled
//! with `deadpool-postgres`; each export is written in one transaction.

pub mod client;
pub mod recorder;

pub use client::PostgreSQLClient;
pub use recorder::PostgreSQLRecorder;
