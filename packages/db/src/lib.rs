//! Persistent state for the job board.
//!
//! This crate provides the file-backed record stores and the operations the
//! routing layer calls: posting, deleting, checking out and checking in jobs,
//! plus user registration and authentication.
//!
//! # Layout
//!
//! - [`RecordStore`]: cached, mutually exclusive map persisted as one JSON file
//! - [`Database`]: owns the job and user stores; cheap to clone
//! - [`repositories`]: the operations, borrowed from a [`Database`]

mod config;
mod database;
mod error;
pub mod password;
pub mod repositories;
mod store;

pub use config::DbConfig;
pub use database::Database;
pub use error::BoardError;
pub use store::{Record, RecordGuard, RecordStore, Records};

/// Open the database with the given configuration.
///
/// This should be called once at application startup.
pub async fn init(config: DbConfig) -> Result<Database, BoardError> {
    Database::open(config).await
}
