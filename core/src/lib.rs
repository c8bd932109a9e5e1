//! Platform-agnostic core logic for the NTP clock
//!
//! This crate contains the time-resolution and scheduling engine shared by
//! every board. It has NO hardware dependencies:
//!
//! - **`time`**: `Instant`/`Ticks`, calendar math and the DST rule evaluator
//! - **`layout`**: fixed-width centering of the date and time lines
//! - **`ntp`**: decoding of SNTP response timestamps
//! - **`sync`**: the no-backoff sync scheduler
//! - **`clock`**: `ClockService`, which ties the above together
//! - **`ports`**: traits the board implements (time source, display, ...)
//!
//! Enable the `defmt` feature on firmware builds to get `defmt::Format` on all
//! public types and engine log records.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod error;
pub mod layout;
pub mod ntp;
pub mod ports;
pub mod sync;
pub mod time;

// Re-export commonly used types
pub use clock::ClockService;
pub use config::ClockConfig;
pub use error::{ConfigError, LayoutOverflowError, SyncError};
pub use layout::{DisplayLine, MAX_DISPLAY_WIDTH};
pub use ports::{DiagnosticEvent, DiagnosticsSink, DisplaySink, MonotonicClock, TimeSource};
pub use sync::SyncScheduler;
pub use time::{CivilDateTime, Instant, LocalTimeResult, Ticks, TimezoneSpec};
