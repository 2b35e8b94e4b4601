//! Persistent SQLite log of relayed messages, queryable per user.

use rusqlite::{Connection, params};
use std::fmt;
use std::path::PathBuf;

/// One persisted exchange: the sender and the raw inbound text.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub id: i64,
    pub user: String,
    pub msg: String,
}

/// Errors from the history store.
#[derive(Debug)]
pub enum StorageError {
    /// Failed to open the database file.
    Open { path: PathBuf, source: rusqlite::Error },
    /// A statement failed against an open connection.
    Query(rusqlite::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open history database '{}': {}", path.display(), source)
            }
            Self::Query(source) => write!(f, "history query failed: {source}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Query(source) => Some(source),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Query(e)
    }
}

/// History store backed by a SQLite file.
///
/// Holds only the database path; every operation opens its own connection
/// and drops it before returning. SQLite serializes writes at the file
/// level, so no in-process locking is needed.
#[derive(Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<Connection, StorageError> {
        Connection::open(&self.path).map_err(|e| StorageError::Open {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Ensure the history table exists. Safe to call on every start.
    pub fn initialize(&self) -> Result<(), StorageError> {
        let conn = self.open()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT,
                msg TEXT
            )",
        )?;
        Ok(())
    }

    /// Append one record. The id is assigned by SQLite on insert.
    pub fn append(&self, user: &str, msg: &str) -> Result<(), StorageError> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO history (user, msg) VALUES (?1, ?2)",
            params![user, msg],
        )?;
        Ok(())
    }

    /// All records for `user`, most recent first. Empty for unknown users.
    pub fn list(&self, user: &str) -> Result<Vec<HistoryRecord>, StorageError> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare("SELECT id, user, msg FROM history WHERE user = ?1 ORDER BY id DESC")?;
        let rows = stmt.query_map(params![user], |row| {
            Ok(HistoryRecord {
                id: row.get(0)?,
                user: row.get(1)?,
                msg: row.get(2)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Remove every record for `user`, returning how many were deleted.
    pub fn delete_all(&self, user: &str) -> Result<usize, StorageError> {
        let conn = self.open()?;
        let count = conn.execute("DELETE FROM history WHERE user = ?1", params![user])?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, HistoryStore) {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.db"));
        store.initialize().unwrap();
        (dir, store)
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, store) = temp_store();
        store.initialize().unwrap();
        store.initialize().unwrap();
    }

    #[test]
    fn test_append_then_list_descending() {
        let (_dir, store) = temp_store();
        store.append("U1", "first").unwrap();
        store.append("U1", "second").unwrap();
        store.append("U1", "third").unwrap();

        let records = store.list("U1").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].msg, "third");
        assert_eq!(records[2].msg, "first");
        assert!(records[0].id > records[1].id);
        assert!(records[1].id > records[2].id);
    }

    #[test]
    fn test_list_unknown_user_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.list("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_list_is_scoped_per_user() {
        let (_dir, store) = temp_store();
        store.append("U1", "mine").unwrap();
        store.append("U2", "theirs").unwrap();

        let records = store.list("U1").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user, "U1");
        assert_eq!(records[0].msg, "mine");
    }

    #[test]
    fn test_delete_all_returns_count() {
        let (_dir, store) = temp_store();
        store.append("U1", "a").unwrap();
        store.append("U1", "b").unwrap();
        store.append("U2", "c").unwrap();

        assert_eq!(store.delete_all("U1").unwrap(), 2);
        assert!(store.list("U1").unwrap().is_empty());
        // Other users untouched
        assert_eq!(store.list("U2").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_all_unknown_user_is_zero() {
        let (_dir, store) = temp_store();
        assert_eq!(store.delete_all("nobody").unwrap(), 0);
    }

    #[test]
    fn test_ids_keep_growing_after_delete() {
        let (_dir, store) = temp_store();
        store.append("U1", "a").unwrap();
        let first = store.list("U1").unwrap()[0].id;
        store.delete_all("U1").unwrap();
        store.append("U1", "b").unwrap();
        let second = store.list("U1").unwrap()[0].id;
        assert!(second > first);
    }

    #[test]
    fn test_open_failure_is_reported() {
        let store = HistoryStore::new("/nonexistent-dir/history.db");
        let err = store.initialize().unwrap_err();
        assert!(matches!(err, StorageError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent-dir/history.db"));
    }
}
