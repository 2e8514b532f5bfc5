//! Storage-level errors and their mapping into the core taxonomy.

use thiserror::Error;

use datagate_core::errors::HubError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to connect to the database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("failed to create the database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("database query failed: {0}")]
    QueryFailed(#[from] diesel::result::Error),

    #[error("database migration failed: {0}")]
    MigrationFailed(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

// Everything above the repositories speaks the core taxonomy; storage
// details are flattened into the datastore variant at this boundary.
impl From<StorageError> for HubError {
    fn from(e: StorageError) -> Self {
        HubError::Datastore(e.to_string())
    }
}
