// Core data structures for the policy_tracker crawler

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// One row of a listing page, before its detail page is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStub {
    /// Raw date label in the source's locale calendar (e.g. "112-5-3")
    pub date_token: String,
    pub title: String,
    /// Absolute detail-page URL
    pub detail_url: Url,
}

/// The persisted unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub title: String,
    pub date: NaiveDate,
    pub url: String,
    pub content: String,
}

impl ReportRecord {
    /// Borrow the identity tuple of this record
    pub fn identity(&self) -> RecordIdentity<'_> {
        RecordIdentity {
            title: &self.title,
            date: self.date,
            url: &self.url,
        }
    }
}

/// (title, date, url): the de facto uniqueness key of a record
///
/// Compared byte-for-byte by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordIdentity<'a> {
    pub title: &'a str,
    pub date: NaiveDate,
    pub url: &'a str,
}

impl fmt::Display for RecordIdentity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.title, self.date, self.url)
    }
}

/// Why a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// All configured pages were scanned
    PagesExhausted,
    /// An already-known entry was reached
    DuplicateReached,
    /// Shutdown was requested
    Cancelled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PagesExhausted => "pages_exhausted",
            Self::DuplicateReached => "duplicate_reached",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one crawl run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub entries_seen: u64,
    pub inserted: u64,
    pub insert_failed: u64,
    pub entries_skipped: u64,
    pub date_fallbacks: u64,
    /// Store operations that failed
    pub store_errors: u64,
    /// Store operations that succeeded
    pub store_ok: u64,
    pub stop_reason: StopReason,
}

impl Default for CrawlSummary {
    fn default() -> Self {
        Self {
            pages_fetched: 0,
            pages_failed: 0,
            entries_seen: 0,
            inserted: 0,
            insert_failed: 0,
            entries_skipped: 0,
            date_fallbacks: 0,
            store_errors: 0,
            store_ok: 0,
            stop_reason: StopReason::PagesExhausted,
        }
    }
}

impl CrawlSummary {
    /// True when the run tried to reach the store and never once succeeded
    pub fn store_unreachable(&self) -> bool {
        self.store_errors > 0 && self.store_ok == 0
    }
}
