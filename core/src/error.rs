//! Error types for the clock engine
//!
//! Conversion and formatting are total over well-formed inputs, so only three
//! kinds of failure exist: a time source that could not deliver, a line that
//! does not fit the display, and a configuration rejected at construction.

use core::fmt;

/// Time-source failure reported by a [`TimeSource`](crate::ports::TimeSource)
///
/// Opaque to the engine: it is logged and counted, never interpreted. Sync
/// failures are non-fatal and are retried on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Link, DNS or socket failure
    Network,
    /// No response within the source's own timeout
    Timeout,
    /// Response received but rejected (short packet, bad stratum, ...)
    InvalidResponse,
    /// The source is not ready to be queried
    Unavailable,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network error"),
            Self::Timeout => write!(f, "time source timeout"),
            Self::InvalidResponse => write!(f, "invalid time source response"),
            Self::Unavailable => write!(f, "time source unavailable"),
        }
    }
}

impl core::error::Error for SyncError {}

/// A formatted line needs more cells than the display provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayoutOverflowError {
    /// Cells the content needs
    pub required: usize,
    /// Cells available on one display line
    pub width: usize,
}

impl fmt::Display for LayoutOverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line needs {} cells but display is {} wide",
            self.required, self.width
        )
    }
}

impl core::error::Error for LayoutOverflowError {}

/// Configuration rejected by [`ClockConfig::validate`](crate::config::ClockConfig::validate)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Display width of zero
    ZeroWidth,
    /// Display width above [`MAX_DISPLAY_WIDTH`](crate::layout::MAX_DISPLAY_WIDTH)
    WidthTooLarge,
    /// Sync interval of zero seconds
    ZeroSyncInterval,
    /// Display refresh interval of zero seconds
    ZeroRefreshInterval,
    /// DST rule label longer than four characters
    RuleNameTooLong,
    /// DST rule transition hour outside 0-23
    HourOutOfRange,
    /// DST rule offset of a day or more
    OffsetOutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroWidth => write!(f, "display width must be non-zero"),
            Self::WidthTooLarge => write!(f, "display width too large"),
            Self::ZeroSyncInterval => write!(f, "sync interval must be non-zero"),
            Self::ZeroRefreshInterval => write!(f, "refresh interval must be non-zero"),
            Self::RuleNameTooLong => write!(f, "rule name longer than 4 characters"),
            Self::HourOutOfRange => write!(f, "rule hour outside 0-23"),
            Self::OffsetOutOfRange => write!(f, "rule offset outside +/-24h"),
        }
    }
}

impl core::error::Error for ConfigError {}
