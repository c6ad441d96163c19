//! SQLite export history backend
//!
//! The default backend. A single file next to the config is enough for a
//! desktop install; `sqlite::memory:` is used in tests.

pub mod recorder;

pub use recorder::SqliteRecorder;
