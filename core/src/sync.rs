//! Sync scheduling
//!
//! Two phases: `Due` and `Waiting`. The scheduler starts `Due` so the first
//! tick fetches immediately. A success records the tick and moves to
//! `Waiting` until more than one interval has elapsed. A failure leaves the
//! scheduler `Due` without touching the last-success tick, so every following
//! tick retries; there is no backoff beyond the caller's own tick rate.

use crate::time::Ticks;

/// Default sync interval (10 minutes)
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 600;

/// Scheduler phase at a given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncPhase {
    /// Last success is recent enough
    Waiting,
    /// A sync attempt should be made now
    Due,
}

/// Attempt counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncStats {
    pub attempts: u32,
    pub successes: u32,
    pub failures: u32,
    /// Failures since the last success
    pub consecutive_failures: u32,
}

/// Decides when a time fetch is due
#[derive(Debug, Clone)]
pub struct SyncScheduler {
    interval_secs: u64,
    last_sync: Option<Ticks>,
    /// Sticky `Due` after construction and after a failure
    retry_pending: bool,
    stats: SyncStats,
}

impl SyncScheduler {
    /// New scheduler, `Due` until the first success
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval_secs,
            last_sync: None,
            retry_pending: true,
            stats: SyncStats::default(),
        }
    }

    pub fn phase(&self, now: Ticks) -> SyncPhase {
        if self.retry_pending {
            return SyncPhase::Due;
        }
        match self.last_sync {
            Some(last) if now.saturating_elapsed_since(last) <= self.interval_secs => {
                SyncPhase::Waiting
            }
            _ => SyncPhase::Due,
        }
    }

    /// True once more than one interval has passed since the last success,
    /// and always after a failure
    pub fn is_sync_due(&self, now: Ticks) -> bool {
        self.phase(now) == SyncPhase::Due
    }

    /// Record the outcome of an attempt made at `now`
    pub fn record_sync_outcome(&mut self, success: bool, now: Ticks) {
        self.stats.attempts = self.stats.attempts.saturating_add(1);
        if success {
            self.last_sync = Some(now);
            self.retry_pending = false;
            self.stats.successes = self.stats.successes.saturating_add(1);
            self.stats.consecutive_failures = 0;
        } else {
            self.retry_pending = true;
            self.stats.failures = self.stats.failures.saturating_add(1);
            self.stats.consecutive_failures = self.stats.consecutive_failures.saturating_add(1);
        }
    }

    /// Tick of the last successful sync
    pub fn last_sync(&self) -> Option<Ticks> {
        self.last_sync
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }
}

impl Default for SyncScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_INTERVAL_SECS)
    }
}
