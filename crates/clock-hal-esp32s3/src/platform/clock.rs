//! Wall clock derived from the monotonic embassy timer.

use core::cell::Cell;

use clock_core::timing::{MonotonicClock, Now};
use critical_section::Mutex;
use embassy_time::Instant;

/// Monotonic time plus an offset that the sync task moves whenever a server
/// answers. Reads before the first sync report the epoch plus uptime.
pub struct SystemClock {
    offset_ms: Mutex<Cell<i64>>,
}

impl SystemClock {
    pub const fn new() -> Self {
        Self {
            offset_ms: Mutex::new(Cell::new(0)),
        }
    }

    pub fn now(&self) -> Now {
        let monotonic_ms = self.now_ms();
        let offset = critical_section::with(|cs| self.offset_ms.borrow(cs).get());
        Now::new(monotonic_ms, monotonic_ms as i64 + offset)
    }

    pub fn set_unix_ms(&self, unix_ms: i64) {
        let offset = unix_ms - self.now_ms() as i64;
        critical_section::with(|cs| self.offset_ms.borrow(cs).set(offset));
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
