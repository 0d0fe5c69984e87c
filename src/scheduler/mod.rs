//! Recurring crawl scheduling
//!
//! # States
//!
//! ```text
//!   start()          initial crawl          due check (every second)
//! ─────────▶ Idle ─────────────────▶ Armed ◀───────────────────────┐
//!                                      │   due: crawl, reschedule   │
//!                                      └────────────────────────────┘
//!                                      │
//!                                      │ stop()
//!                                      ▼
//!                                     Idle
//! ```
//!
//! At most one crawl runs at a time. A tick or manual trigger that arrives
//! while a crawl is in flight is deferred; the next due check retries it.
//!
//! # Modules
//!
//! - [`job`] - Due-time bookkeeping for the recurring job
//! - [`trigger`] - The scheduling task and its control handle
//! - [`error`] - Scheduler error types
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use policy_tracker::config::Config;
//! use policy_tracker::crawler::CrawlEngine;
//! use policy_tracker::scheduler::CrawlScheduler;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let engine = Arc::new(CrawlEngine::new(&config)?);
//! let handle = CrawlScheduler::new(engine, config.job()).start()?;
//!
//! tokio::signal::ctrl_c().await?;
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod job;
pub mod trigger;

pub use error::{SchedulerError, SchedulerResult};
pub use job::RecurringJob;
pub use trigger::{
    CrawlRunner, CrawlScheduler, ScheduleHandle, SchedulerState, TriggerOutcome,
    DEFAULT_CHECK_INTERVAL,
};
