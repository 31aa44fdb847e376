//! BOOT push button used as the hardware "open settings" shortcut.

use embedded_hal::digital::InputPin;
use log::debug;

const DEBOUNCE_POLLS: u8 = 2;

/// Reports one press per physical push, debounced over consecutive polls.
#[derive(Debug)]
pub struct BootButton<P> {
    pin: P,
    active_low: bool,
    raw: bool,
    stable: bool,
    stable_count: u8,
}

impl<P> BootButton<P>
where
    P: InputPin,
{
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
            raw: false,
            stable: false,
            stable_count: 0,
        }
    }

    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    /// `true` exactly once per press edge.
    pub fn pressed(&mut self) -> bool {
        let high = match self.pin.is_high() {
            Ok(high) => high,
            Err(err) => {
                debug!("button: read failed: {:?}", err);
                return false;
            }
        };
        let pressed = high != self.active_low;

        if pressed == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = pressed;
            self.stable_count = 0;
        }

        if self.stable_count >= DEBOUNCE_POLLS && self.stable != self.raw {
            self.stable = self.raw;
            return self.stable;
        }
        false
    }
}
