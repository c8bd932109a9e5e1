//! Time primitives
//!
//! Two distinct clocks flow through the engine:
//! - [`Instant`]: wall-clock UTC seconds since the Unix epoch. Corrected in
//!   steps by a successful sync.
//! - [`Ticks`]: monotonic seconds since boot. Never corrected, only used to
//!   measure elapsed time.
//!
//! Keeping them as separate types prevents a tick count from being displayed
//! as a date, or a UTC step from being mistaken for elapsed time.

use core::fmt;

pub mod calendar;
pub mod dst;

pub use calendar::{CivilDateTime, Month, Ordinal, Weekday};
pub use dst::{resolve, DstRule, LocalTimeResult, TimezoneSpec};

pub(crate) const SECONDS_PER_MINUTE: i64 = 60;
pub(crate) const SECONDS_PER_HOUR: i64 = 3_600;
pub(crate) const SECONDS_PER_DAY: i64 = 86_400;

/// Absolute UTC time in whole seconds since 1970-01-01T00:00:00Z
///
/// Clamped to years -9999..=9999 so that calendar math on the year before and
/// after any instant can never overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant(i64);

impl Instant {
    /// -9999-01-01T00:00:00Z
    pub const MIN: Self = Self(-377_705_116_800);
    /// 9999-12-31T23:59:59Z
    pub const MAX: Self = Self(253_402_300_799);
    /// 1970-01-01T00:00:00Z
    pub const UNIX_EPOCH: Self = Self(0);

    /// Create an instant from Unix seconds, clamping to [`MIN`](Self::MIN)..=[`MAX`](Self::MAX)
    pub const fn from_unix_secs(secs: i64) -> Self {
        if secs < Self::MIN.0 {
            Self::MIN
        } else if secs > Self::MAX.0 {
            Self::MAX
        } else {
            Self(secs)
        }
    }

    /// Unix seconds
    pub const fn as_unix_secs(self) -> i64 {
        self.0
    }

    /// Shift by a signed number of seconds, saturating at the valid range
    pub const fn saturating_add_secs(self, secs: i64) -> Self {
        Self::from_unix_secs(self.0.saturating_add(secs))
    }

    /// Shift by a signed UTC offset in minutes
    pub const fn offset_by_minutes(self, minutes: i32) -> Self {
        self.saturating_add_secs(minutes as i64 * SECONDS_PER_MINUTE)
    }

    /// Signed seconds from `earlier` to `self`
    pub const fn secs_since(self, earlier: Instant) -> i64 {
        self.0 - earlier.0
    }

    /// Calendar fields of this instant, read without any offset
    pub fn civil(self) -> CivilDateTime {
        CivilDateTime::from_instant(self)
    }
}

/// ISO8601, e.g. `2025-09-27T14:00:00Z`
impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.civil();
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            c.year,
            c.month.number(),
            c.day,
            c.hour,
            c.minute,
            c.second
        )
    }
}

/// Monotonic seconds from a non-decreasing tick source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ticks(u64);

impl Ticks {
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Seconds elapsed since `earlier`, zero if `earlier` is in the future
    pub const fn saturating_elapsed_since(self, earlier: Ticks) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_clamps_to_range() {
        assert_eq!(Instant::from_unix_secs(i64::MAX), Instant::MAX);
        assert_eq!(Instant::from_unix_secs(i64::MIN), Instant::MIN);
        assert_eq!(Instant::MAX.saturating_add_secs(1), Instant::MAX);
    }

    #[test]
    fn test_instant_offset_and_difference() {
        let utc = Instant::from_unix_secs(1_758_981_600);
        let local = utc.offset_by_minutes(780);
        assert_eq!(local.secs_since(utc), 780 * 60);
        assert_eq!(utc.offset_by_minutes(-300).secs_since(utc), -18_000);
    }

    #[test]
    fn test_instant_display_iso8601() {
        let utc = Instant::from_unix_secs(1_758_981_600);
        assert_eq!(utc.to_string(), "2025-09-27T14:00:00Z");
        assert_eq!(Instant::UNIX_EPOCH.to_string(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_ticks_elapsed_saturates() {
        let earlier = Ticks::from_secs(100);
        assert_eq!(Ticks::from_secs(160).saturating_elapsed_since(earlier), 60);
        assert_eq!(Ticks::from_secs(40).saturating_elapsed_since(earlier), 0);
    }
}
