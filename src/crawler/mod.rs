//! Web crawling functionality with rate limiting
//!
//! This module implements the crawl pipeline for one announcement source:
//! fetching pages, walking the paginated listing, and handing records to the
//! store under the stop-on-duplicate policy.

pub mod driver;
pub mod events;
pub mod fetcher;
pub mod source;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use crate::config::{Config, CrawlJob};
use crate::error::{Error, Result};
use crate::models::CrawlSummary;
use crate::scheduler::CrawlRunner;
use crate::storage::{self, ReportStore};
use crate::utils::retry::RetryConfig;

pub use driver::CrawlDriver;
pub use events::{CrawlEvent, EventSink};
pub use fetcher::PageFetcher;
pub use source::{SourceKind, SourceProfile, TableSpec};

/// Long-lived crawl entry point
///
/// Owns the HTTP client and the resolved source profile. Each invocation
/// receives its own [`CrawlJob`] snapshot and opens the store it names, so a
/// configuration change never reaches a run already in progress.
pub struct CrawlEngine {
    fetcher: PageFetcher,
    profile: SourceProfile,
    events: EventSink,
    retry: RetryConfig,
}

impl CrawlEngine {
    /// Create an engine for the configured source
    pub fn new(config: &Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;

        let profile = SourceProfile::from_config(&config.source)?;
        let fetcher = PageFetcher::new(&config.crawler)?;
        let retry = RetryConfig::with_delays(
            config.crawler.detail_retries,
            config.crawler.retry_base_delay_ms,
            RetryConfig::default().max_delay_ms,
        );

        Ok(Self {
            fetcher,
            profile,
            events: EventSink::default(),
            retry,
        })
    }

    pub fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    /// Sink shared by every run of this engine
    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Receive the log lines of subsequent runs
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        self.events.subscribe()
    }

    /// Run one crawl to completion
    pub async fn run_once(&self, job: CrawlJob) -> Result<CrawlSummary> {
        let (_shutdown_tx, shutdown) = watch::channel(false);
        self.run_until(job, shutdown).await
    }

    /// Run one crawl, stopping early when `shutdown` turns `true`
    ///
    /// Fails only when the store cannot be opened; errors during the run are
    /// absorbed into the summary.
    pub async fn run_until(
        &self,
        job: CrawlJob,
        shutdown: watch::Receiver<bool>,
    ) -> Result<CrawlSummary> {
        let table = job.database.table_spec(&self.profile.table);
        let store = storage::connect(&job.database, &table).await?;
        self.run_with_store(&job, store.as_ref(), shutdown).await
    }

    /// Run one crawl against an already opened store
    pub async fn run_with_store(
        &self,
        job: &CrawlJob,
        store: &dyn ReportStore,
        shutdown: watch::Receiver<bool>,
    ) -> Result<CrawlSummary> {
        let driver = CrawlDriver::new(&self.fetcher, &self.profile, store, self.events.clone())?
            .with_retry(self.retry.clone());
        Ok(driver.run(job.page_count, &shutdown).await)
    }
}

#[async_trait]
impl CrawlRunner for CrawlEngine {
    async fn run(&self, job: CrawlJob, shutdown: watch::Receiver<bool>) -> Result<CrawlSummary> {
        self.run_until(job, shutdown).await
    }
}
