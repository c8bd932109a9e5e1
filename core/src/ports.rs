//! Collaborator traits implemented by the board
//!
//! The engine never touches hardware. Network time, the display, logging and
//! the tick source are injected through these traits, so a board owns every
//! handle explicitly and tests can substitute fakes.

use crate::error::SyncError;
use crate::layout::DisplayLine;
use crate::time::{CivilDateTime, Instant, Ticks};

/// Blocking network time fetch
///
/// Retry and timeout policy live inside the implementation; the engine sees
/// one call that either yields UTC or fails.
pub trait TimeSource {
    fn fetch(&mut self) -> Result<Instant, SyncError>;
}

/// Any `FnMut() -> Result<Instant, SyncError>` closure is a time source
impl<F> TimeSource for F
where
    F: FnMut() -> Result<Instant, SyncError>,
{
    fn fetch(&mut self) -> Result<Instant, SyncError> {
        self()
    }
}

/// Two-line character display
pub trait DisplaySink {
    /// Show both lines; assumed not to fail
    fn write(&mut self, line0: &DisplayLine, line1: &DisplayLine);
}

/// Fire-and-forget diagnostics record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagnosticEvent {
    /// A fetch succeeded and the UTC estimate was replaced
    Synced {
        utc: Instant,
        local: CivilDateTime,
        is_dst: bool,
        offset_minutes: i32,
        rule_label: &'static str,
        /// Fetched minus drifted estimate; `None` on the first sync
        correction_secs: Option<i64>,
    },
    /// A fetch failed; the clock keeps running on its estimate
    SyncFailed {
        error: SyncError,
        consecutive_failures: u32,
    },
}

/// Receiver for [`DiagnosticEvent`]s
pub trait DiagnosticsSink {
    fn record(&mut self, event: &DiagnosticEvent);
}

/// Discards every event
impl DiagnosticsSink for () {
    fn record(&mut self, _event: &DiagnosticEvent) {}
}

/// Non-decreasing seconds since boot
pub trait MonotonicClock {
    fn now_ticks(&self) -> Ticks;
}
