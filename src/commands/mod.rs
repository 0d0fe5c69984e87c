pub mod crawl;
pub mod schedule;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use policy_tracker::config::Config;
use policy_tracker::crawler::{CrawlEvent, SourceKind};

// Re-export command functions for convenience
pub use crawl::crawl;
pub use schedule::schedule;

/// Command-line values that take precedence over the loaded configuration
pub struct Overrides {
    pub source: Option<SourceKind>,
    pub pages: Option<u32>,
    pub interval_days: Option<u32>,
}

impl Overrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(source) = self.source {
            config.source.kind = source;
        }
        if let Some(pages) = self.pages {
            config.schedule.page_count = pages;
        }
        if let Some(days) = self.interval_days {
            config.schedule.interval_days = days;
        }
    }
}

/// Print every event line until all senders are gone
pub fn print_events(mut rx: broadcast::Receiver<CrawlEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => println!("{event}"),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event printer lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
