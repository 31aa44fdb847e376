//! Application mode controller: boot, connectivity, clock and settings
//! screens driven from one cooperative loop.

use heapless::Vec;
use log::{debug, info, warn};

use crate::{
    connection::{
        ConnectPoll, ConnectionManager, ConnectionState, MAX_SCAN_RESULTS, Network, WifiRadio,
    },
    input::{ReleaseGate, TouchSample, TouchSource},
    render::ScreenView,
    screens::{
        AboutScreen, ActiveScreen, ClockScreen, ConnectingScreen, ModeResult, NtpScreen,
        ScreenContext, SettingsScreen, SetupScreen, TimezoneScreen,
    },
    settings::{PersistedSettings, SettingsStore},
    sync::{SntpClient, SyncStats, TimeSyncManager},
    timing::{MODE_POLL_MS, Now, TOUCH_RELEASE_POLL_MS, clock_poll_delay_ms},
    tz::{LocalTime, TimeZone},
};

/// How long the splash stays up before the first mode decision.
pub const SPLASH_HOLD_MS: u64 = 500;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AppMode {
    Init,
    WifiSetup,
    Connecting,
    Clock,
    Settings,
    Timezone,
    About,
    NtpConfig,
}

/// Where WiFi setup goes when cancelled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReturnTarget {
    Boot,
    Settings,
}

/// Board-level outputs and the hardware settings button.
pub trait Board {
    fn clear_screen(&mut self);
    fn set_backlight(&mut self, level: u8);
    /// Linear indicator LED level; the board applies its own gamma curve.
    fn set_indicator(&mut self, level: u8);
    fn set_rotation(&mut self, rotated: bool);
    fn settings_button_pressed(&mut self) -> bool;
}

pub struct ModeController<'a, R, N, T, S, B>
where
    R: WifiRadio,
    N: SntpClient,
    T: TouchSource,
    S: SettingsStore,
    B: Board,
{
    connection: ConnectionManager<'a, R>,
    sync: TimeSyncManager<'a, N>,
    touch: T,
    store: S,
    board: B,
    settings: PersistedSettings,
    /// Credentials came from the build, not the store.
    fallback_credentials: bool,
    timezone: TimeZone,
    mode: AppMode,
    screen: ActiveScreen,
    return_target: ReturnTarget,
    release_gate: ReleaseGate,
    ntp_started: bool,
    boot_at_ms: Option<u64>,
    clear_pending: bool,
    pending_redraw: bool,
}

include!("context.rs");
include!("transitions.rs");
include!("view.rs");

#[cfg(test)]
mod tests;
