//! Record store tests on real SQLite files

mod common;

use chrono::NaiveDate;
use common::{may_3_2023, record};
use policy_tracker::config::{Backend, DatabaseConfig};
use policy_tracker::crawler::{SourceKind, TableSpec};
use policy_tracker::storage::{self, ReportStore, SqliteStore};
use policy_tracker::utils::error::StoreErrorKind;
use tempfile::TempDir;

fn sqlite_config(dir: &TempDir, create_schema: bool) -> DatabaseConfig {
    DatabaseConfig {
        backend: Backend::Sqlite,
        sqlite_path: dir.path().join("nested").join("reports.db"),
        create_schema,
        ..DatabaseConfig::default()
    }
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir, true);
    let table = SourceKind::ControlYuan.profile().table;
    let stored = record("調查報告", may_3_2023(), "https://www.cy.gov.tw/a");

    {
        let store = storage::connect(&config, &table).await.unwrap();
        store.insert(&stored).await.unwrap();
    }

    let store = storage::connect(&config, &table).await.unwrap();
    assert!(store.exists(&stored.identity()).await.unwrap());
}

#[tokio::test]
async fn test_identity_is_title_date_and_url() {
    let store = SqliteStore::in_memory(&TableSpec::new("reports", "content")).unwrap();
    let stored = record("聲明", may_3_2023(), "https://nhrc.cy.gov.tw/1");
    store.insert(&stored).await.unwrap();

    let other_date = record(
        "聲明",
        NaiveDate::from_ymd_opt(2023, 5, 4).unwrap(),
        "https://nhrc.cy.gov.tw/1",
    );
    let other_url = record("聲明", may_3_2023(), "https://nhrc.cy.gov.tw/2");
    let other_title = record("新聲明", may_3_2023(), "https://nhrc.cy.gov.tw/1");

    assert!(store.exists(&stored.identity()).await.unwrap());
    for candidate in [other_date, other_url, other_title] {
        assert!(!store.exists(&candidate.identity()).await.unwrap());
    }
}

#[tokio::test]
async fn test_content_column_is_configurable() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir, true);
    let table = SourceKind::Nhrc.profile().table;
    assert_eq!(table.content_column, "statement");

    let store = storage::connect(&config, &table).await.unwrap();
    store
        .insert(&record("聲明", may_3_2023(), "https://nhrc.cy.gov.tw/3"))
        .await
        .unwrap();

    let conn = rusqlite::Connection::open(&config.sqlite_path).unwrap();
    let (date, statement): (String, String) = conn
        .query_row(
            "SELECT date, statement FROM human_rights_statements",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(date, "2023-05-03");
    assert_eq!(statement, "既有內容");
}

#[tokio::test]
async fn test_missing_database_file_is_target_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir, false);

    let err = storage::connect(&config, &TableSpec::new("reports", "content"))
        .await
        .err()
        .expect("opening a missing file without create_schema must fail");
    assert_eq!(err.kind, StoreErrorKind::TargetMissing);
}

#[tokio::test]
async fn test_missing_table_is_target_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");
    rusqlite::Connection::open(&path).unwrap();

    let store = SqliteStore::open(&path, &TableSpec::new("reports", "content"), false).unwrap();
    let sample = record("甲", may_3_2023(), "https://www.cy.gov.tw/x");

    let err = store.exists(&sample.identity()).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::TargetMissing);
    let err = store.insert(&sample).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::TargetMissing);
}

#[tokio::test]
async fn test_unsafe_table_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir, true);

    let err = storage::connect(&config, &TableSpec::new("reports; DROP TABLE x", "content"))
        .await
        .err()
        .expect("table name must be rejected");
    assert_eq!(err.kind, StoreErrorKind::Other);
}
