//! SQLite record store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OpenFlags};

use super::{check_table, exists_sql, insert_sql, ReportStore};
use crate::crawler::source::TableSpec;
use crate::models::{RecordIdentity, ReportRecord};
use crate::utils::error::{StoreError, StoreErrorKind};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Record store backed by a local SQLite file
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    exists_sql: String,
    insert_sql: String,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("insert_sql", &self.insert_sql)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open the database at `path`
    ///
    /// With `create_schema` the file and table are created when missing.
    /// Without it, a missing file is a `TargetMissing` error and a missing
    /// table surfaces on the first query.
    pub fn open(path: &Path, table: &TableSpec, create_schema: bool) -> Result<Self, StoreError> {
        check_table(table)?;

        let conn = if create_schema {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::other("connect", format!("{}: {e}", parent.display()))
                })?;
            }
            Connection::open(path)
        } else {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        }
        .map_err(|e| classify_sqlite_error("connect", &e))?;

        let store = Self::from_connection(conn, table);
        if create_schema {
            store.create_schema(table)?;
        }

        tracing::info!(path = %path.display(), table = %table.name, "SQLite store opened");
        Ok(store)
    }

    /// Create in-memory store with its table (for testing)
    pub fn in_memory(table: &TableSpec) -> Result<Self, StoreError> {
        check_table(table)?;
        let conn = Connection::open_in_memory().map_err(|e| classify_sqlite_error("connect", &e))?;
        let store = Self::from_connection(conn, table);
        store.create_schema(table)?;
        Ok(store)
    }

    fn from_connection(conn: Connection, table: &TableSpec) -> Self {
        Self {
            conn: Mutex::new(conn),
            exists_sql: exists_sql(table, ["?1", "?2", "?3"]),
            insert_sql: insert_sql(table, ["?1", "?2", "?3", "?4"]),
        }
    }

    fn create_schema(&self, table: &TableSpec) -> Result<(), StoreError> {
        let conn = self.lock("create_schema")?;
        conn.execute_batch(&format!(
            r#"
                CREATE TABLE IF NOT EXISTS "{name}" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    "title" TEXT NOT NULL,
                    "date" TEXT NOT NULL,
                    "url" TEXT NOT NULL,
                    "{content}" TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS "idx_{name}_identity" ON "{name}" ("title", "date", "url");
            "#,
            name = table.name,
            content = table.content_column,
        ))
        .map_err(|e| classify_sqlite_error("create_schema", &e))
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::other(operation, "SQLite connection lock poisoned"))
    }
}

#[async_trait]
impl ReportStore for SqliteStore {
    async fn exists(&self, identity: &RecordIdentity<'_>) -> Result<bool, StoreError> {
        let conn = self.lock("exists")?;
        let count: i64 = conn
            .query_row(
                &self.exists_sql,
                params![
                    identity.title,
                    identity.date.format(DATE_FORMAT).to_string(),
                    identity.url
                ],
                |row| row.get(0),
            )
            .map_err(|e| classify_sqlite_error("exists", &e))?;
        Ok(count > 0)
    }

    async fn insert(&self, record: &ReportRecord) -> Result<(), StoreError> {
        let conn = self.lock("insert")?;
        conn.execute(
            &self.insert_sql,
            params![
                record.title,
                record.date.format(DATE_FORMAT).to_string(),
                record.url,
                record.content
            ],
        )
        .map_err(|e| classify_sqlite_error("insert", &e))?;
        Ok(())
    }
}

/// Map a SQLite error onto the store's failure classes
pub fn classify_sqlite_error(operation: &'static str, error: &rusqlite::Error) -> StoreError {
    let message = error.to_string();
    let kind = match error.sqlite_error_code() {
        Some(ErrorCode::CannotOpen) => StoreErrorKind::TargetMissing,
        Some(ErrorCode::PermissionDenied | ErrorCode::AuthorizationForStatementDenied) => {
            StoreErrorKind::Auth
        }
        _ if message.contains("no such table") => StoreErrorKind::TargetMissing,
        _ => StoreErrorKind::Other,
    };
    StoreError::new(kind, operation, message)
}
