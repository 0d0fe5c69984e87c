//! PostgreSQL record store
//!
//! Connections come from a `deadpool-postgres` pool created lazily: building
//! the store never touches the network, so credential and database errors
//! surface on the first `exists`/`insert` and are classified there.

use async_trait::async_trait;
use deadpool_postgres::{
    Config as PoolConfig, ManagerConfig, Object, Pool, PoolError, RecyclingMethod, Runtime,
};
use tokio_postgres::error::SqlState;
use tokio_postgres::NoTls;

use super::{check_table, exists_sql, insert_sql, ReportStore};
use crate::config::DatabaseConfig;
use crate::crawler::source::TableSpec;
use crate::models::{RecordIdentity, ReportRecord};
use crate::utils::error::{StoreError, StoreErrorKind};

/// Record store on a PostgreSQL server
pub struct PostgresStore {
    pool: Pool,
    exists_sql: String,
    insert_sql: String,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("pool", &self.pool.status())
            .field("insert_sql", &self.insert_sql)
            .finish()
    }
}

impl PostgresStore {
    /// Build a connection pool for `config`
    pub async fn connect(config: &DatabaseConfig, table: &TableSpec) -> Result<Self, StoreError> {
        check_table(table)?;

        let mut cfg = PoolConfig::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.dbname = Some(config.name.clone());
        cfg.application_name = Some(String::from("policy-tracker"));
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(config.pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StoreError::other("connect", e.to_string()))?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            table = %table.name,
            "PostgreSQL store configured"
        );

        Ok(Self {
            pool,
            exists_sql: exists_sql(table, ["$1", "$2", "$3"]),
            insert_sql: insert_sql(table, ["$1", "$2", "$3", "$4"]),
        })
    }

    async fn client(&self, operation: &'static str) -> Result<Object, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| classify_pool_error(operation, e))
    }
}

#[async_trait]
impl ReportStore for PostgresStore {
    async fn exists(&self, identity: &RecordIdentity<'_>) -> Result<bool, StoreError> {
        let client = self.client("exists").await?;
        let row = client
            .query_one(
                self.exists_sql.as_str(),
                &[&identity.title, &identity.date, &identity.url],
            )
            .await
            .map_err(|e| classify_pg_error("exists", &e))?;
        let count: i64 = row.get(0);
        Ok(count > 0)
    }

    async fn insert(&self, record: &ReportRecord) -> Result<(), StoreError> {
        let client = self.client("insert").await?;
        client
            .execute(
                self.insert_sql.as_str(),
                &[&record.title, &record.date, &record.url, &record.content],
            )
            .await
            .map_err(|e| classify_pg_error("insert", &e))?;
        Ok(())
    }
}

/// Failure class of a SQLSTATE code
pub fn classify_sql_state(state: &SqlState) -> StoreErrorKind {
    if *state == SqlState::INVALID_PASSWORD
        || *state == SqlState::INVALID_AUTHORIZATION_SPECIFICATION
        || *state == SqlState::INSUFFICIENT_PRIVILEGE
    {
        StoreErrorKind::Auth
    } else if *state == SqlState::INVALID_CATALOG_NAME || *state == SqlState::UNDEFINED_TABLE {
        StoreErrorKind::TargetMissing
    } else {
        StoreErrorKind::Other
    }
}

fn classify_pg_error(operation: &'static str, error: &tokio_postgres::Error) -> StoreError {
    let kind = error
        .code()
        .map(classify_sql_state)
        .unwrap_or(StoreErrorKind::Other);
    let message = match error.as_db_error() {
        Some(db) => format!("{} ({})", db.message(), db.code().code()),
        None => error.to_string(),
    };
    StoreError::new(kind, operation, message)
}

fn classify_pool_error(operation: &'static str, error: PoolError) -> StoreError {
    match error {
        PoolError::Backend(e) => classify_pg_error(operation, &e),
        other => StoreError::other(operation, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_states_are_auth() {
        assert_eq!(
            classify_sql_state(&SqlState::from_code("28P01")),
            StoreErrorKind::Auth
        );
        assert_eq!(
            classify_sql_state(&SqlState::from_code("28000")),
            StoreErrorKind::Auth
        );
    }

    #[test]
    fn test_missing_database_or_table_is_target_missing() {
        assert_eq!(
            classify_sql_state(&SqlState::from_code("3D000")),
            StoreErrorKind::TargetMissing
        );
        assert_eq!(
            classify_sql_state(&SqlState::from_code("42P01")),
            StoreErrorKind::TargetMissing
        );
    }

    #[test]
    fn test_other_states() {
        assert_eq!(
            classify_sql_state(&SqlState::UNIQUE_VIOLATION),
            StoreErrorKind::Other
        );
        assert_eq!(
            classify_sql_state(&SqlState::from_code("08006")),
            StoreErrorKind::Other
        );
    }

    #[tokio::test]
    async fn test_connect_is_lazy() {
        let config = DatabaseConfig {
            port: 1,
            ..DatabaseConfig::default()
        };
        let store = PostgresStore::connect(&config, &TableSpec::new("reports", "content")).await;
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_other() {
        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..DatabaseConfig::default()
        };
        let store = PostgresStore::connect(&config, &TableSpec::new("reports", "content"))
            .await
            .unwrap();
        let record = ReportRecord {
            title: "t".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2023, 5, 3).unwrap(),
            url: "u".to_string(),
            content: "c".to_string(),
        };
        let err = store.exists(&record.identity()).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Other);
        assert_eq!(err.operation, "exists");
    }
}
