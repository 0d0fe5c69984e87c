//! Record persistence for SQLite and PostgreSQL
//!
//! The store only answers two questions: has this `(title, date, url)` been
//! seen, and please append this record. Identity is enforced by the caller,
//! not by a database constraint, so the crawl driver must be the only writer
//! of a table while it runs.
//!
//! # Architecture
//!
//! ```text
//!                 CrawlDriver
//!                      │
//!                      ▼
//!              dyn ReportStore
//!          ┌───────────┼────────────┐
//!          ▼           ▼            ▼
//!     SqliteStore  PostgresStore  MemoryStore
//! ```
//!
//! Every failure is a [`StoreError`] carrying one of three classes
//! ([`StoreErrorKind`]): rejected credentials, missing database or table, and
//! everything else.

pub mod memory;
pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;

use crate::config::{Backend, DatabaseConfig};
use crate::crawler::source::TableSpec;
use crate::models::{RecordIdentity, ReportRecord};
use crate::utils::error::{StoreError, StoreErrorKind};
use crate::utils::is_sql_identifier;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

/// Append-only record store keyed by `(title, date, url)`
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Whether a row with exactly this title, date and url exists
    async fn exists(&self, identity: &RecordIdentity<'_>) -> Result<bool, StoreError>;

    /// Append a record
    async fn insert(&self, record: &ReportRecord) -> Result<(), StoreError>;
}

/// Open the store described by `config`, writing to `table`
pub async fn connect(
    config: &DatabaseConfig,
    table: &TableSpec,
) -> Result<Box<dyn ReportStore>, StoreError> {
    check_table(table)?;

    match config.backend {
        Backend::Sqlite => {
            let store = SqliteStore::open(&config.sqlite_path, table, config.create_schema)?;
            Ok(Box::new(store))
        }
        Backend::Postgres => {
            let store = PostgresStore::connect(config, table).await?;
            Ok(Box::new(store))
        }
    }
}

/// Reject table or column names that cannot be safely interpolated into SQL
pub(crate) fn check_table(table: &TableSpec) -> Result<(), StoreError> {
    for name in [&table.name, &table.content_column] {
        if !is_sql_identifier(name) {
            return Err(StoreError::new(
                StoreErrorKind::Other,
                "connect",
                format!("'{name}' is not a plain SQL identifier"),
            ));
        }
    }
    Ok(())
}

/// `SELECT COUNT(*)` statement for the identity lookup
pub(crate) fn exists_sql(table: &TableSpec, placeholders: [&str; 3]) -> String {
    let [title, date, url] = placeholders;
    format!(
        r#"SELECT COUNT(*) FROM "{}" WHERE "title" = {title} AND "date" = {date} AND "url" = {url}"#,
        table.name
    )
}

/// `INSERT` statement for one record
pub(crate) fn insert_sql(table: &TableSpec, placeholders: [&str; 4]) -> String {
    let [title, date, url, content] = placeholders;
    format!(
        r#"INSERT INTO "{}" ("title", "date", "url", "{}") VALUES ({title}, {date}, {url}, {content})"#,
        table.name, table.content_column
    )
}
