mod models;
mod schema;

pub use models::{Board, Draft, Task, TaskStatus};
pub use schema::{Database, DEFAULT_STORAGE_KEY};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening the store or writing the board to it
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create store directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to move unreadable store {path:?} aside")]
    MoveAside {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to serialize board: {0}")]
    Serialize(#[from] serde_json::Error),
}
