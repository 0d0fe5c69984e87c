//! Recurring crawl trigger
//!
//! Activation runs one crawl immediately, then arms a [`RecurringJob`] that
//! fires every `interval_days` days. A cheap periodic check decides whether
//! the job is due; the crawl itself runs on the scheduler's own task so the
//! caller's loop is never blocked.
//!
//! Scheduled ticks and manual [`ScheduleHandle::run_now`] calls share one
//! single-flight guard. A trigger that finds a crawl in flight is deferred,
//! never started alongside it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use super::error::{SchedulerError, SchedulerResult};
use super::job::RecurringJob;
use crate::config::CrawlJob;
use crate::crawler::events::{CrawlEvent, EventSink};
use crate::error::{Result, TrackerErrorTrait};
use crate::models::CrawlSummary;

/// Default period of the due check
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Something that can perform one crawl
#[async_trait]
pub trait CrawlRunner: Send + Sync {
    /// Run one crawl over `job`, honouring `shutdown`
    async fn run(&self, job: CrawlJob, shutdown: watch::Receiver<bool>) -> Result<CrawlSummary>;
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No recurring job registered
    Idle,
    /// Recurring job registered and waiting for its next fire
    Armed,
}

/// Result of a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The crawl ran to completion
    Completed(CrawlSummary),
    /// The crawl could not start; carries the localized reason
    Failed(String),
    /// Another crawl was in flight
    Deferred,
}

struct Shared {
    runner: Arc<dyn CrawlRunner>,
    job: CrawlJob,
    run_lock: Mutex<()>,
    events: EventSink,
    state: watch::Sender<SchedulerState>,
    shutdown: watch::Receiver<bool>,
}

impl Shared {
    async fn trigger(&self, origin: &'static str) -> TriggerOutcome {
        let Ok(_guard) = self.run_lock.try_lock() else {
            info!(origin, "Crawl already in flight, trigger deferred");
            self.events.emit(CrawlEvent::Deferred);
            return TriggerOutcome::Deferred;
        };

        debug!(origin, "Starting crawl");
        // Each run gets its own snapshot of the job.
        match self.runner.run(self.job.clone(), self.shutdown.clone()).await {
            Ok(summary) => TriggerOutcome::Completed(summary),
            Err(e) => {
                error!(origin, error = %e, category = ?e.category(), "Crawl run failed");
                TriggerOutcome::Failed(e.localized_desc())
            }
        }
    }
}

/// Builder for a recurring crawl schedule
pub struct CrawlScheduler {
    runner: Arc<dyn CrawlRunner>,
    job: CrawlJob,
    check_interval: Duration,
    events: EventSink,
}

impl CrawlScheduler {
    pub fn new(runner: Arc<dyn CrawlRunner>, job: CrawlJob) -> Self {
        Self {
            runner,
            job,
            check_interval: DEFAULT_CHECK_INTERVAL,
            events: EventSink::default(),
        }
    }

    /// How often the loop checks whether the job is due
    #[must_use]
    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    /// Emit `Armed`/`Deferred` notices on `events`
    #[must_use]
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Spawn the scheduling task: run once now, then every interval
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> SchedulerResult<ScheduleHandle> {
        if self.job.interval_days == 0 {
            return Err(SchedulerError::invalid_interval("interval_days", 0));
        }
        if self.check_interval.is_zero() {
            return Err(SchedulerError::invalid_interval("check_interval", 0));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, _) = watch::channel(SchedulerState::Idle);

        let shared = Arc::new(Shared {
            runner: self.runner,
            job: self.job,
            run_lock: Mutex::new(()),
            events: self.events,
            state: state_tx,
            shutdown: shutdown_rx.clone(),
        });

        let task = tokio::spawn(run_loop(
            Arc::clone(&shared),
            self.check_interval,
            shutdown_rx,
        ));

        Ok(ScheduleHandle {
            shared,
            shutdown: shutdown_tx,
            task,
        })
    }
}

async fn run_loop(shared: Arc<Shared>, check_interval: Duration, mut shutdown: watch::Receiver<bool>) {
    shared.trigger("initial").await;

    if !*shutdown.borrow() {
        let mut job = RecurringJob::arm(shared.job.interval(), Instant::now());
        shared.state.send_replace(SchedulerState::Armed);
        shared.events.emit(CrawlEvent::Armed {
            days: shared.job.interval_days,
        });
        info!(interval_days = shared.job.interval_days, "Recurring crawl armed");

        let mut ticker = tokio::time::interval(check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            if *shutdown.borrow() {
                break;
            }

            if job.is_due(Instant::now()) {
                match shared.trigger("scheduled").await {
                    // Still due; retried on the next check.
                    TriggerOutcome::Deferred => {}
                    _ => job.reschedule(Instant::now()),
                }
            }
        }
    }

    shared.state.send_replace(SchedulerState::Idle);
    info!("Scheduler stopped");
}

/// Control handle of a started schedule
///
/// Dropping the handle ends the schedule once any crawl in flight finishes,
/// without waiting for it.
pub struct ScheduleHandle {
    shared: Arc<Shared>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    /// Run a crawl now unless one is already in flight
    pub async fn run_now(&self) -> TriggerOutcome {
        self.shared.trigger("manual").await
    }

    pub fn state(&self) -> SchedulerState {
        *self.shared.state.borrow()
    }

    /// Observe state transitions
    pub fn watch_state(&self) -> watch::Receiver<SchedulerState> {
        self.shared.state.subscribe()
    }

    /// Whether a crawl is in flight
    pub fn is_crawling(&self) -> bool {
        self.shared.run_lock.try_lock().is_err()
    }

    /// Request shutdown without waiting
    ///
    /// A crawl in flight stops before its next page or entry.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    /// Request shutdown and wait for the scheduling task to finish
    pub async fn shutdown(self) -> SchedulerResult<()> {
        self.stop();
        self.task.await.map_err(SchedulerError::from)
    }
}
