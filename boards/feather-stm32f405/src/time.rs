#![deny(unsafe_code)]
#![deny(warnings)]
//! Monotonic tick source backed by the RTIC TIM2 monotonic

use ntp_clock_core::{MonotonicClock, Ticks};
use rtic_monotonics::Monotonic;

use crate::Mono;

/// Whole seconds since `Mono::start`
///
/// TIM2 runs at 1 MHz and is extended to 64 bits, so it never wraps within
/// the lifetime of the device.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoClock;

impl MonotonicClock for MonoClock {
    fn now_ticks(&self) -> Ticks {
        Ticks::from_secs(Mono::now().duration_since_epoch().to_secs())
    }
}
