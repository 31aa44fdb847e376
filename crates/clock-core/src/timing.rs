//! Loop cadence and shared timing constants.

/// Minimum spacing between two accepted touch-down events.
pub const TOUCH_DEBOUNCE_MS: u64 = 200;
/// Poll period while waiting for a finger to lift.
pub const TOUCH_RELEASE_POLL_MS: u32 = 50;
/// Flat poll period for every mode except the clock face.
pub const MODE_POLL_MS: u32 = 50;

const POLL_FAST_MS: u32 = 2;
const POLL_MID_MS: u32 = 10;
const POLL_NORMAL_MS: u32 = 20;
const POLL_FAST_THRESHOLD_MS: u32 = 980;
const POLL_MID_THRESHOLD_MS: u32 = 900;

/// Time as seen by one loop iteration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Now {
    /// Milliseconds since boot; never goes backwards.
    pub monotonic_ms: u64,
    /// Wall clock in UTC milliseconds since the Unix epoch. Meaningless
    /// until the first time sync.
    pub unix_ms: i64,
}

impl Now {
    pub const fn new(monotonic_ms: u64, unix_ms: i64) -> Self {
        Self {
            monotonic_ms,
            unix_ms,
        }
    }

    pub const fn unix_secs(self) -> i64 {
        self.unix_ms.div_euclid(1_000)
    }

    /// Milliseconds elapsed in the current wall-clock second.
    pub const fn ms_into_second(self) -> u32 {
        self.unix_ms.rem_euclid(1_000) as u32
    }

    pub const fn advanced_by(self, ms: u64) -> Self {
        Self {
            monotonic_ms: self.monotonic_ms + ms,
            unix_ms: self.unix_ms + ms as i64,
        }
    }
}

/// Source of monotonic milliseconds for the blocking manager APIs.
pub trait MonotonicClock {
    fn now_ms(&self) -> u64;
}

/// Poll delay for the clock face: tighten as the next second approaches so
/// the seconds digit flips with little latency.
pub const fn clock_poll_delay_ms(ms_into_second: u32) -> u32 {
    if ms_into_second > POLL_FAST_THRESHOLD_MS {
        POLL_FAST_MS
    } else if ms_into_second > POLL_MID_THRESHOLD_MS {
        POLL_MID_MS
    } else {
        POLL_NORMAL_MS
    }
}

/// Quadratic approximation of gamma 2.2 for the indicator LED.
pub const fn gamma_correct(linear: u8) -> u8 {
    ((linear as u16 * linear as u16) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_poll_tightens_near_second_boundary() {
        assert_eq!(clock_poll_delay_ms(0), 20);
        assert_eq!(clock_poll_delay_ms(900), 20);
        assert_eq!(clock_poll_delay_ms(901), 10);
        assert_eq!(clock_poll_delay_ms(980), 10);
        assert_eq!(clock_poll_delay_ms(981), 2);
        assert_eq!(clock_poll_delay_ms(999), 2);
    }

    #[test]
    fn ms_into_second_handles_pre_epoch_clock() {
        assert_eq!(Now::new(0, 1_234).ms_into_second(), 234);
        assert_eq!(Now::new(0, -1).ms_into_second(), 999);
        assert_eq!(Now::new(0, -1).unix_secs(), -1);
    }

    #[test]
    fn gamma_curve_endpoints() {
        assert_eq!(gamma_correct(0), 0);
        assert_eq!(gamma_correct(255), 255);
        assert_eq!(gamma_correct(128), 64);
    }
}
