//! Human-readable progress lines for front-ends
//!
//! The engine reports what it does as [`CrawlEvent`]s over a broadcast
//! channel. Their `Display` is a localized log line suitable for showing to
//! an operator; structured diagnostics go through `tracing` instead.

use chrono::NaiveDate;
use std::fmt;
use tokio::sync::broadcast;

use crate::i18n::t;
use crate::models::StopReason;

/// Default capacity of the event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A user-facing progress event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    RunStarted { source: String, pages: u32 },
    PageFetched { page: u32, entries: usize },
    PageFailed { page: u32, error: String },
    Inserted { title: String, date: NaiveDate },
    /// An existing record was reached and the run stops
    Duplicate { title: String, date: NaiveDate },
    /// `error` is the localized store failure class
    InsertFailed { title: String, error: String },
    EntrySkipped { title: String, reason: String },
    DateFallback { token: String, title: String, date: NaiveDate },
    Cancelled,
    RunFinished { inserted: u64, failed: u64, reason: StopReason },
    /// A trigger arrived while a crawl was in flight
    Deferred,
    Armed { days: u32 },
}

impl fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = match self {
            Self::RunStarted { source, pages } => {
                t!("events.run_started", source = source, pages = pages)
            }
            Self::PageFetched { page, entries } => {
                t!("events.page_fetched", page = page, entries = entries)
            }
            Self::PageFailed { page, error } => {
                t!("events.page_failed", page = page, error = error)
            }
            Self::Inserted { title, date } => t!("events.inserted", title = title, date = date),
            Self::Duplicate { title, date } => t!("events.duplicate", title = title, date = date),
            Self::InsertFailed { title, error } => {
                t!("events.insert_failed", title = title, error = error)
            }
            Self::EntrySkipped { title, reason } => {
                t!("events.entry_skipped", title = title, reason = reason)
            }
            Self::DateFallback { token, title, date } => t!(
                "events.date_fallback",
                token = token,
                title = title,
                date = date
            ),
            Self::Cancelled => t!("events.cancelled"),
            Self::RunFinished {
                inserted,
                failed,
                reason,
            } => t!(
                "events.run_finished",
                inserted = inserted,
                failed = failed,
                reason = reason
            ),
            Self::Deferred => t!("events.deferred"),
            Self::Armed { days } => t!("events.armed", days = days),
        };
        f.write_str(&line)
    }
}

/// Sending half of the event stream
///
/// Cloning shares the channel. Emitting never blocks and never fails: events
/// sent while nobody subscribes are dropped, and slow subscribers observe a
/// `Lagged` gap rather than slowing the crawl.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: broadcast::Sender<CrawlEvent>,
}

impl Default for EventSink {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

impl EventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn emit(&self, event: CrawlEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_event_lines_are_localized() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 3).unwrap();
        let event = CrawlEvent::Inserted {
            title: "調查報告".to_string(),
            date,
        };

        crate::i18n::set_locale("zh-TW");
        assert_eq!(event.to_string(), "資料已成功插入: 調查報告 (2023-05-03)");

        crate::i18n::set_locale("en");
        assert_eq!(event.to_string(), "Inserted: 調查報告 (2023-05-03)");
    }

    #[test]
    #[serial]
    fn test_run_finished_line() {
        crate::i18n::set_locale("en");
        let event = CrawlEvent::RunFinished {
            inserted: 2,
            failed: 1,
            reason: StopReason::DuplicateReached,
        };
        assert_eq!(
            event.to_string(),
            "Crawl finished: 2 inserted, 1 failed, stop reason: duplicate_reached"
        );
    }

    #[tokio::test]
    async fn test_subscribers_receive_emitted_events() {
        let sink = EventSink::default();
        let mut rx = sink.subscribe();

        sink.emit(CrawlEvent::Cancelled);
        sink.emit(CrawlEvent::Armed { days: 3 });

        assert_eq!(rx.recv().await.unwrap(), CrawlEvent::Cancelled);
        assert_eq!(rx.recv().await.unwrap(), CrawlEvent::Armed { days: 3 });
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        EventSink::new(4).emit(CrawlEvent::Deferred);
    }
}
