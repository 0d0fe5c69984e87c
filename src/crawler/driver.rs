//! Pagination and the stop-on-duplicate policy
//!
//! Pages `1..=N` are scanned in order and every entry is handled in document
//! order: normalize its date, fetch and extract its detail page, then ask the
//! store whether `(title, date, url)` is known. Unknown entries are inserted.
//! The first known entry ends the whole run, on the assumption that listings
//! are append-only and newest-first so everything after it was seen before.
//!
//! That assumption is not verified against the source sites. A reordered
//! listing or a backfilled older item makes the crawl stop early and silently
//! miss new entries.
//!
//! All work is strictly sequential. The check-then-insert sequence is only
//! race-free while a single driver writes to a table.

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::events::{CrawlEvent, EventSink};
use super::fetcher::PageFetcher;
use super::source::SourceProfile;
use crate::models::{CrawlSummary, EntryStub, ReportRecord, StopReason};
use crate::parser::{ContentExtractor, DateNormalizer, ListingParser, NormalizedDate};
use crate::storage::ReportStore;
use crate::utils::error::{FetchError, ParseError};
use crate::utils::retry::{with_retry_if, RetryConfig};

/// What to do after one entry
enum Flow {
    Continue,
    Stop(StopReason),
}

/// Runs one crawl over a source's listing pages
pub struct CrawlDriver<'a> {
    fetcher: &'a PageFetcher,
    profile: &'a SourceProfile,
    store: &'a dyn ReportStore,
    listing: ListingParser,
    extractor: ContentExtractor,
    normalizer: DateNormalizer,
    events: EventSink,
    retry: RetryConfig,
}

impl<'a> CrawlDriver<'a> {
    /// Build a driver, compiling the profile's selectors
    pub fn new(
        fetcher: &'a PageFetcher,
        profile: &'a SourceProfile,
        store: &'a dyn ReportStore,
        events: EventSink,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            fetcher,
            profile,
            store,
            listing: ListingParser::new(&profile.selectors, profile.parsed_base_url()?)?,
            extractor: ContentExtractor::new(&profile.content_selector)?,
            normalizer: DateNormalizer::roc(),
            events,
            retry: RetryConfig::default(),
        })
    }

    /// Retry recoverable detail-page failures
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Scan up to `page_count` listing pages
    ///
    /// Never fails: transport, parse and store errors are logged, counted in
    /// the summary and skipped. `shutdown` is checked before every page and
    /// every entry; once it reads `true` the run ends with
    /// [`StopReason::Cancelled`].
    pub async fn run(&self, page_count: u32, shutdown: &watch::Receiver<bool>) -> CrawlSummary {
        let mut summary = CrawlSummary::default();
        info!(source = self.profile.name(), pages = page_count, "Crawl started");
        self.events.emit(CrawlEvent::RunStarted {
            source: self.profile.name().to_string(),
            pages: page_count,
        });

        summary.stop_reason = self.scan(page_count, shutdown, &mut summary).await;

        if summary.stop_reason == StopReason::Cancelled {
            self.events.emit(CrawlEvent::Cancelled);
        }
        info!(
            source = self.profile.name(),
            inserted = summary.inserted,
            insert_failed = summary.insert_failed,
            skipped = summary.entries_skipped,
            stop_reason = %summary.stop_reason,
            "Crawl finished"
        );
        self.events.emit(CrawlEvent::RunFinished {
            inserted: summary.inserted,
            failed: summary.insert_failed,
            reason: summary.stop_reason,
        });
        summary
    }

    async fn scan(
        &self,
        page_count: u32,
        shutdown: &watch::Receiver<bool>,
        summary: &mut CrawlSummary,
    ) -> StopReason {
        for page in 1..=page_count {
            if *shutdown.borrow() {
                return StopReason::Cancelled;
            }

            let url = self.profile.listing_url(page);
            let html = match self.fetcher.fetch_text(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(page, url = %url, error = %e, "Listing page failed, skipping");
                    summary.pages_failed += 1;
                    self.events.emit(CrawlEvent::PageFailed {
                        page,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let stubs = self.listing.parse(&html);
            summary.pages_fetched += 1;
            debug!(page, entries = stubs.len(), "Listing page parsed");
            self.events.emit(CrawlEvent::PageFetched {
                page,
                entries: stubs.len(),
            });

            for stub in stubs {
                if *shutdown.borrow() {
                    return StopReason::Cancelled;
                }
                if let Flow::Stop(reason) = self.process(stub, summary).await {
                    return reason;
                }
            }
        }

        StopReason::PagesExhausted
    }

    async fn process(&self, stub: EntryStub, summary: &mut CrawlSummary) -> Flow {
        summary.entries_seen += 1;

        let NormalizedDate { date, fallback } = self.normalizer.normalize_checked(&stub.date_token);
        if fallback.is_some() {
            debug!(title = %stub.title, "Entry stored with sentinel date");
            summary.date_fallbacks += 1;
            self.events.emit(CrawlEvent::DateFallback {
                token: stub.date_token.clone(),
                title: stub.title.clone(),
                date,
            });
        }

        let detail_url = stub.detail_url.as_str();
        let html = match self.fetch_detail(detail_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(title = %stub.title, url = detail_url, error = %e, "Detail page failed, skipping entry");
                summary.entries_skipped += 1;
                self.events.emit(CrawlEvent::EntrySkipped {
                    title: stub.title,
                    reason: e.to_string(),
                });
                return Flow::Continue;
            }
        };

        let record = ReportRecord {
            content: self.extractor.extract(&html),
            url: stub.detail_url.into(),
            title: stub.title,
            date,
        };

        match self.store.exists(&record.identity()).await {
            Ok(true) => {
                summary.store_ok += 1;
                info!(title = %record.title, date = %record.date, "Record already stored, stopping crawl");
                self.events.emit(CrawlEvent::Duplicate {
                    title: record.title,
                    date: record.date,
                });
                return Flow::Stop(StopReason::DuplicateReached);
            }
            Ok(false) => summary.store_ok += 1,
            Err(e) => {
                // An unreachable store must not drop new data; assume absent.
                summary.store_errors += 1;
                warn!(title = %record.title, error = %e, "Existence check failed, assuming absent");
            }
        }

        match self.store.insert(&record).await {
            Ok(()) => {
                summary.store_ok += 1;
                summary.inserted += 1;
                info!(title = %record.title, date = %record.date, url = %record.url, "Record inserted");
                self.events.emit(CrawlEvent::Inserted {
                    title: record.title,
                    date: record.date,
                });
            }
            Err(e) => {
                summary.store_errors += 1;
                summary.insert_failed += 1;
                error!(title = %record.title, kind = ?e.kind, error = %e, "Insert failed");
                self.events.emit(CrawlEvent::InsertFailed {
                    title: record.title,
                    error: e.localized_desc(),
                });
            }
        }

        Flow::Continue
    }

    async fn fetch_detail(&self, url: &str) -> Result<String, FetchError> {
        with_retry_if(
            &self.retry,
            || self.fetcher.fetch_text(url),
            FetchError::is_recoverable,
        )
        .await
    }
}
