//! Clock configuration

use crate::error::ConfigError;
use crate::layout::{DEFAULT_DISPLAY_WIDTH, MAX_DISPLAY_WIDTH};
use crate::sync::DEFAULT_SYNC_INTERVAL_SECS;
use crate::time::{Instant, TimezoneSpec};

/// Default display refresh interval (1 second)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 1;

/// Clock service configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Seconds between successful syncs
    pub sync_interval_secs: u64,
    /// Seconds between display refreshes (used by the board's control loop)
    pub refresh_interval_secs: u64,
    /// Cells per display line
    pub display_width: usize,
    /// Standard/daylight rule pair
    pub timezone: TimezoneSpec,
    /// UTC estimate before the first successful sync
    pub initial_utc: Instant,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            display_width: DEFAULT_DISPLAY_WIDTH,
            timezone: TimezoneSpec::default(),
            initial_utc: Instant::UNIX_EPOCH,
        }
    }
}

impl ClockConfig {
    pub fn with_sync_interval_secs(mut self, secs: u64) -> Self {
        self.sync_interval_secs = secs;
        self
    }

    pub fn with_refresh_interval_secs(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    pub fn with_display_width(mut self, width: usize) -> Self {
        self.display_width = width;
        self
    }

    pub fn with_timezone(mut self, timezone: TimezoneSpec) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_initial_utc(mut self, utc: Instant) -> Self {
        self.initial_utc = utc;
        self
    }

    /// Reject values the engine cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.display_width > MAX_DISPLAY_WIDTH {
            return Err(ConfigError::WidthTooLarge);
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::ZeroSyncInterval);
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::ZeroRefreshInterval);
        }
        self.timezone.dst().validate()?;
        self.timezone.std().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::DstRule;

    #[test]
    fn test_defaults() {
        let config = ClockConfig::default();
        assert_eq!(config.sync_interval_secs, 600);
        assert_eq!(config.refresh_interval_secs, 1);
        assert_eq!(config.display_width, 16);
        assert_eq!(*config.timezone.dst(), DstRule::NZDT);
        assert_eq!(*config.timezone.std(), DstRule::NZST);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validation() {
        let base = ClockConfig::default();
        assert_eq!(
            base.with_display_width(0).validate(),
            Err(ConfigError::ZeroWidth)
        );
        assert_eq!(
            base.with_display_width(MAX_DISPLAY_WIDTH + 1).validate(),
            Err(ConfigError::WidthTooLarge)
        );
        assert_eq!(
            base.with_sync_interval_secs(0).validate(),
            Err(ConfigError::ZeroSyncInterval)
        );
        assert_eq!(
            base.with_refresh_interval_secs(0).validate(),
            Err(ConfigError::ZeroRefreshInterval)
        );
        assert_eq!(base.with_display_width(20).validate(), Ok(()));
    }
}
