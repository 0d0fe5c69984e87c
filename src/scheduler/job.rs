//! Recurring job bookkeeping

use std::time::Duration;
use tokio::time::Instant;

/// A job that becomes due every `interval` after its last completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringJob {
    interval: Duration,
    next_due: Instant,
}

impl RecurringJob {
    /// Arm the job so its first fire is one interval after `now`
    pub fn arm(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Push the next fire one interval past `completed_at`
    pub fn reschedule(&mut self, completed_at: Instant) {
        self.next_due = completed_at + self.interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(86_400);

    #[tokio::test(start_paused = true)]
    async fn test_due_after_interval() {
        let start = Instant::now();
        let job = RecurringJob::arm(3 * DAY, start);

        assert!(!job.is_due(start));
        assert!(!job.is_due(start + 3 * DAY - Duration::from_secs(1)));
        assert!(job.is_due(start + 3 * DAY));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_counts_from_completion() {
        let start = Instant::now();
        let mut job = RecurringJob::arm(DAY, start);

        let completed = start + DAY + Duration::from_secs(600);
        job.reschedule(completed);

        assert_eq!(job.next_due(), completed + DAY);
        assert!(!job.is_due(start + 2 * DAY));
    }
}
