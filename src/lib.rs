//! policy_tracker - incremental crawler for Control Yuan announcements
//!
//! Harvests the paginated listing pages of a government announcement site,
//! follows each entry to its detail page, and persists records that have not
//! been seen before. Runs stop at the first already-known entry, since the
//! listings are published newest-first.
//!
//! # Architecture
//!
//! - [`config`] - Configuration loading and the per-run [`config::CrawlJob`] snapshot
//! - [`crawler`] - Page fetching, source profiles and the crawl driver
//! - [`parser`] - Listing parsing, content extraction and ROC date normalization
//! - [`models`] - Entry stubs, report records and run summaries
//! - [`storage`] - Idempotent record persistence (SQLite, PostgreSQL)
//! - [`scheduler`] - Recurring, single-flight crawl scheduling
//! - [`utils`] - Error types and retry helpers
//!
//! # Example
//!
//! ```no_run
//! use policy_tracker::config::Config;
//! use policy_tracker::crawler::CrawlEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let engine = CrawlEngine::new(&config)?;
//!     let summary = engine.run_once(config.job()).await?;
//!     println!("inserted {}", summary.inserted);
//!     Ok(())
//! }
//! ```

// Initialize rust-i18n at crate root level
rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod crawler;
pub mod error;
pub mod i18n;
pub mod models;
pub mod parser;
pub mod scheduler;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, CrawlJob};
    pub use crate::crawler::{CrawlDriver, CrawlEngine, CrawlEvent, PageFetcher, SourceProfile};
    pub use crate::error::{Error, ErrorCategory, Result, TrackerErrorTrait};
    pub use crate::models::{CrawlSummary, EntryStub, ReportRecord, StopReason};
    pub use crate::parser::{ContentExtractor, DateNormalizer, ListingParser};
    pub use crate::scheduler::{CrawlScheduler, ScheduleHandle};
    pub use crate::storage::ReportStore;
}

pub use models::{CrawlSummary, EntryStub, ReportRecord};
