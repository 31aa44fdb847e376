//! Touch input abstraction and tap filtering.

use crate::timing::TOUCH_DEBOUNCE_MS;

/// One poll of the touch controller, already calibrated to display
/// coordinates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TouchSample {
    pub x: i16,
    pub y: i16,
    pub pressed: bool,
}

impl TouchSample {
    pub const RELEASED: Self = Self {
        x: 0,
        y: 0,
        pressed: false,
    };

    pub const fn pressed_at(x: i16, y: i16) -> Self {
        Self {
            x,
            y,
            pressed: true,
        }
    }
}

/// A touch-down accepted by a [`TapFilter`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tap {
    pub x: i16,
    pub y: i16,
}

impl Tap {
    pub const fn within(self, x: i16, y: i16, w: i16, h: i16) -> bool {
        self.x >= x && self.x < x + w && self.y >= y && self.y < y + h
    }
}

/// Polled touch provider.
pub trait TouchSource {
    type Error: core::fmt::Debug;

    fn poll(&mut self) -> Result<TouchSample, Self::Error>;
}

/// Turns raw samples into discrete taps.
///
/// A tap is a released-to-pressed edge that arrives at least
/// [`TOUCH_DEBOUNCE_MS`] after the previously accepted tap. Every screen owns
/// one so that screen-local state never leaks across modes.
#[derive(Clone, Copy, Debug, Default)]
pub struct TapFilter {
    last_pressed: bool,
    last_accepted_ms: Option<u64>,
}

impl TapFilter {
    pub const fn new() -> Self {
        Self {
            last_pressed: false,
            last_accepted_ms: None,
        }
    }

    /// Forget edge state. The debounce timestamp survives so re-entering a
    /// screen right after a tap does not double-fire.
    pub fn reset_edge(&mut self, currently_pressed: bool) {
        self.last_pressed = currently_pressed;
    }

    pub fn accept(&mut self, sample: TouchSample, now_ms: u64) -> Option<Tap> {
        let edge = sample.pressed && !self.last_pressed;
        self.last_pressed = sample.pressed;
        if !edge {
            return None;
        }

        if let Some(last) = self.last_accepted_ms
            && now_ms.saturating_sub(last) < TOUCH_DEBOUNCE_MS
        {
            return None;
        }

        self.last_accepted_ms = Some(now_ms);
        Some(Tap {
            x: sample.x,
            y: sample.y,
        })
    }
}

/// Cooperative replacement for "spin until the finger lifts".
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReleaseGate {
    armed: bool,
}

impl ReleaseGate {
    pub const fn new() -> Self {
        Self { armed: false }
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns `true` while the caller must keep waiting.
    pub fn hold(&mut self, sample: TouchSample) -> bool {
        if self.armed && !sample.pressed {
            self.armed = false;
        }
        self.armed
    }
}
