//! Hardware Abstraction Layer (HAL) for platform-agnostic timing
//!
//! Drivers only ever need a blocking millisecond delay during bring-up. On a
//! hosted target that is `std::thread::sleep`; on bare metal it is whatever
//! `embedded_hal::delay::DelayNs` the board HAL provides.
use std::time::Duration;

use embedded_hal::delay::DelayNs;

pub trait Clock {
    /// Block the caller for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Clock backed by the operating system scheduler
#[derive(Debug, Default, Clone, Copy)]
pub struct StdClock;

impl Clock for StdClock {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Adapter for any embedded-hal delay provider
pub struct HalDelay<D>(pub D);

impl<D: DelayNs> Clock for HalDelay<D> {
    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
