use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::models::Board;
use super::StoreError;
use crate::operations::BoardStore;

/// Key the board is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

/// Key-value store backed by a single SQLite table
pub struct Database {
    conn: Connection,
    key: String,
}

impl Database {
    /// Open or create a store file, creating parent directories as needed
    pub fn open(path: &Path, key: impl Into<String>) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened board store");
        Self::with_connection(conn, key.into())
    }

    /// Like [`Database::open`], but a file that SQLite cannot read is renamed
    /// to `<name>.corrupt` and an empty store is created in its place
    pub fn open_or_reset(path: &Path, key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        match Self::open(path, key.clone()) {
            Err(StoreError::Sqlite(err)) if path.is_file() => {
                let backup = corrupt_backup_path(path);
                tracing::warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %err,
                    "store file is unreadable, moving it aside and starting empty"
                );
                std::fs::rename(path, &backup).map_err(|source| StoreError::MoveAside {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::open(path, key)
            }
            result => result,
        }
    }

    /// Store that lives only as long as the process
    pub fn open_in_memory(key: impl Into<String>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, key.into())
    }

    fn with_connection(conn: Connection, key: String) -> Result<Self, StoreError> {
        let db = Self { conn, key };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Key the board is read from and written to
    pub fn key(&self) -> &str {
        &self.key
    }

    // === Raw key-value access ===

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

/// `board.db` -> `board.db.corrupt`
fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}

/// Parse a stored board, repairing tasks whose status disagrees with their column
fn parse_board(raw: &str) -> Result<Board, serde_json::Error> {
    let mut board: Board = serde_json::from_str(raw)?;
    let repaired = board.normalize();
    if repaired > 0 {
        tracing::warn!(repaired, "stored tasks had a status that did not match their column");
    }
    Ok(board)
}

impl BoardStore for Database {
    fn load(&self) -> Board {
        match self.get(&self.key) {
            Ok(Some(raw)) => match parse_board(&raw) {
                Ok(board) => {
                    tracing::info!(key = %self.key, tasks = board.len(), "loaded board");
                    board
                }
                Err(err) => {
                    tracing::warn!(key = %self.key, error = %err, "stored board is unreadable, starting empty");
                    Board::default()
                }
            },
            Ok(None) => {
                tracing::info!(key = %self.key, "no stored board, starting empty");
                Board::default()
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to read board, starting empty");
                Board::default()
            }
        }
    }

    fn save(&self, board: &Board) -> Result<(), StoreError> {
        let raw = serde_json::to_string(board)?;
        self.set(&self.key, &raw)?;
        tracing::debug!(key = %self.key, tasks = board.len(), "saved board");
        Ok(())
    }
}
