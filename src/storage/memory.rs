//! In-memory record store
//!
//! Useful as a test double and for dry runs. Failures can be injected per
//! operation to exercise the crawl driver's error handling.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::ReportStore;
use crate::models::{RecordIdentity, ReportRecord};
use crate::utils::error::{StoreError, StoreErrorKind};

#[derive(Debug, Default)]
struct State {
    records: Vec<ReportRecord>,
    exists_calls: usize,
    insert_calls: usize,
    fail_exists: Option<StoreErrorKind>,
    fail_insert: Option<StoreErrorKind>,
    /// Titles whose insert fails with `Other`
    reject_titles: Vec<String>,
}

/// Record store holding rows in a `Vec`
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`
    pub fn with_records(records: impl IntoIterator<Item = ReportRecord>) -> Self {
        let store = Self::default();
        store.lock().records.extend(records);
        store
    }

    /// Make every `exists` call fail with `kind`
    pub fn fail_exists(&self, kind: StoreErrorKind) {
        self.lock().fail_exists = Some(kind);
    }

    /// Make every `insert` call fail with `kind`
    pub fn fail_insert(&self, kind: StoreErrorKind) {
        self.lock().fail_insert = Some(kind);
    }

    /// Make inserts of records with this title fail
    pub fn reject_title(&self, title: impl Into<String>) {
        self.lock().reject_titles.push(title.into());
    }

    /// Stored records in insertion order
    pub fn records(&self) -> Vec<ReportRecord> {
        self.lock().records.clone()
    }

    pub fn exists_calls(&self) -> usize {
        self.lock().exists_calls
    }

    pub fn insert_calls(&self) -> usize {
        self.lock().insert_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State has no invariants a panicking writer could break.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn exists(&self, identity: &RecordIdentity<'_>) -> Result<bool, StoreError> {
        let mut state = self.lock();
        state.exists_calls += 1;
        if let Some(kind) = state.fail_exists {
            return Err(StoreError::new(kind, "exists", "injected failure"));
        }
        Ok(state.records.iter().any(|r| r.identity() == *identity))
    }

    async fn insert(&self, record: &ReportRecord) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.insert_calls += 1;
        if let Some(kind) = state.fail_insert {
            return Err(StoreError::new(kind, "insert", "injected failure"));
        }
        if state.reject_titles.iter().any(|t| *t == record.title) {
            return Err(StoreError::other("insert", "value too long for column"));
        }
        state.records.push(record.clone());
        Ok(())
    }
}
