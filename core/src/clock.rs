//! Clock service
//!
//! Owns the UTC estimate and the sync scheduler. Between syncs the estimate
//! advances by the monotonic delta only, so it never jumps backward on its
//! own. A successful sync replaces it with the fetched value (a step that may
//! go either way); a failed sync is logged and the estimate keeps running.
//!
//! ## Usage
//! Blocking time source, one call per tick:
//! ```ignore
//! let mut clock = ClockService::new(ClockConfig::default(), diagnostics)?;
//! loop {
//!     clock.on_tick(mono.now_ticks(), &mut time_source);
//!     clock.render_to(&mut display)?;
//! }
//! ```
//!
//! Async callers split the tick so the fetch can be awaited in between:
//! ```ignore
//! let now = mono.now_ticks();
//! clock.advance(now);
//! if clock.sync_due(now) {
//!     let result = sntp.fetch(stack).await.map_err(SyncError::from);
//!     clock.complete_sync(mono.now_ticks(), result);
//! }
//! ```

use crate::config::ClockConfig;
use crate::error::{ConfigError, LayoutOverflowError, SyncError};
use crate::layout::{format_date_line, format_time_line, DisplayLine};
use crate::ports::{DiagnosticEvent, DiagnosticsSink, DisplaySink, TimeSource};
use crate::sync::SyncScheduler;
use crate::time::{resolve, Instant, LocalTimeResult, Ticks};

/// Time-resolution and scheduling engine
pub struct ClockService<D: DiagnosticsSink> {
    config: ClockConfig,
    scheduler: SyncScheduler,
    utc: Instant,
    last_tick: Option<Ticks>,
    synced: bool,
    diagnostics: D,
}

impl<D: DiagnosticsSink> ClockService<D> {
    /// Validate `config` and start from its `initial_utc`
    pub fn new(config: ClockConfig, diagnostics: D) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "Clock service: sync every {}s, {} cells wide, {}/{}",
            config.sync_interval_secs,
            config.display_width,
            config.timezone.dst().name,
            config.timezone.std().name
        );
        Ok(Self {
            scheduler: SyncScheduler::new(config.sync_interval_secs),
            utc: config.initial_utc,
            last_tick: None,
            synced: false,
            config,
            diagnostics,
        })
    }

    /// Advance the estimate to `now` and sync through `source` if due
    ///
    /// The fetch is treated as completing at `now`.
    pub fn on_tick<S: TimeSource + ?Sized>(&mut self, now: Ticks, source: &mut S) {
        self.advance(now);
        if self.sync_due(now) {
            let result = source.fetch();
            self.complete_sync(now, result);
        }
    }

    /// Add the monotonic time elapsed since the previous tick to the estimate
    ///
    /// The first call only sets the baseline. A tick older than the previous
    /// one adds nothing.
    pub fn advance(&mut self, now: Ticks) {
        match self.last_tick {
            Some(last) if now <= last => {}
            Some(last) => {
                let elapsed = now.saturating_elapsed_since(last);
                self.utc = self
                    .utc
                    .saturating_add_secs(i64::try_from(elapsed).unwrap_or(i64::MAX));
                self.last_tick = Some(now);
            }
            None => self.last_tick = Some(now),
        }
    }

    /// Whether a fetch should be attempted at `now`
    pub fn sync_due(&self, now: Ticks) -> bool {
        self.scheduler.is_sync_due(now)
    }

    /// Apply the outcome of a fetch that returned at `completed_at`
    ///
    /// On success the fetched UTC is anchored at `completed_at`, so time spent
    /// inside the fetch is not counted twice. On failure the estimate is
    /// advanced through the fetch and kept.
    pub fn complete_sync(&mut self, completed_at: Ticks, result: Result<Instant, SyncError>) {
        self.advance(completed_at);
        match result {
            Ok(fetched) => {
                let correction_secs = self.synced.then(|| fetched.secs_since(self.utc));
                self.utc = fetched;
                self.synced = true;
                self.scheduler.record_sync_outcome(true, completed_at);

                let local = resolve(fetched, &self.config.timezone);
                let event = DiagnosticEvent::Synced {
                    utc: fetched,
                    local: local.civil(),
                    is_dst: local.is_dst,
                    offset_minutes: local.offset_minutes(),
                    rule_label: local.active_rule.name,
                    correction_secs,
                };
                debug!("Sync committed at tick {}", completed_at);
                self.diagnostics.record(&event);
            }
            Err(error) => {
                self.scheduler.record_sync_outcome(false, completed_at);
                let consecutive_failures = self.scheduler.stats().consecutive_failures;
                warn!(
                    "Sync failed ({} in a row), keeping estimate",
                    consecutive_failures
                );
                self.diagnostics.record(&DiagnosticEvent::SyncFailed {
                    error,
                    consecutive_failures,
                });
            }
        }
    }

    /// Date and time lines for the current estimate
    pub fn render_frame(&self) -> Result<(DisplayLine, DisplayLine), LayoutOverflowError> {
        let civil = self.local().civil();
        let width = self.config.display_width;
        Ok((format_date_line(&civil, width)?, format_time_line(&civil, width)?))
    }

    /// Render and push to `sink`; nothing is written if layout fails
    pub fn render_to<S: DisplaySink + ?Sized>(&self, sink: &mut S) -> Result<(), LayoutOverflowError> {
        let (date, time) = self.render_frame()?;
        sink.write(&date, &time);
        Ok(())
    }

    /// Local time for the current estimate
    pub fn local(&self) -> LocalTimeResult<'_> {
        resolve(self.utc, &self.config.timezone)
    }

    /// Current UTC estimate
    pub fn utc(&self) -> Instant {
        self.utc
    }

    /// True after the first successful sync
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }
}
