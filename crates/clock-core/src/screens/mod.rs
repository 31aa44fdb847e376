//! Per-mode screens.
//!
//! Every screen owns its local state (tap filter, sub-state, scroll window)
//! and talks to the rest of the system only through [`ScreenContext`].

pub mod keyboard;
pub mod layout;
pub mod list;

mod about;
mod clock;
mod connecting;
mod ntp;
mod settings;
mod setup;
mod timezone;

pub use about::AboutScreen;
pub use clock::ClockScreen;
pub use connecting::ConnectingScreen;
pub use ntp::{NTP_INTERVALS, NtpScreen, interval_index};
pub use settings::SettingsScreen;
pub use setup::{SetupScreen, SetupState};
pub use timezone::TimezoneScreen;

use heapless::Vec;

use crate::{
    connection::{ConnectPoll, MAX_SCAN_RESULTS, Network},
    input::TouchSample,
    render::ScreenView,
    settings::PersistedSettings,
    sync::SyncStats,
    timing::Now,
    tz::LocalTime,
};

/// Outcome of one screen update, mapped to a mode transition by the
/// controller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModeResult {
    Continue,
    Connected,
    ConnectFailed,
    Cancelled,
    OpenSettings,
    OpenTimezone,
    OpenWifi,
    OpenNtp,
    OpenAbout,
    Done,
    Back,
    Synced,
    TimezoneSelected,
}

/// Services the controller lends to the active screen.
pub trait ScreenContext {
    fn begin_scan(&mut self, now_ms: u64);
    fn poll_scan(&mut self, now_ms: u64) -> Option<Vec<Network, MAX_SCAN_RESULTS>>;
    fn begin_connect(&mut self, ssid: &str, password: &str, now_ms: u64);
    fn poll_connect(&mut self, now_ms: u64) -> ConnectPoll;

    fn sync_stats(&self, now_ms: u64) -> SyncStats;
    fn sync_interval_secs(&self) -> u32;
    fn set_sync_interval(&mut self, secs: u32, now_ms: u64);
    fn set_sync_server(&mut self, server: &str);
    fn force_sync(&mut self, now_ms: u64);

    fn settings(&self) -> &PersistedSettings;
    /// Mutate the settings and write them to the store.
    fn update_settings(&mut self, apply: impl FnOnce(&mut PersistedSettings));
    fn local_time(&self, unix_secs: i64) -> LocalTime;

    fn set_backlight(&mut self, level: u8);
    fn set_indicator(&mut self, level: u8);
    fn set_rotation(&mut self, rotated: bool);
    fn settings_button_pressed(&mut self) -> bool;
    /// Ask for a full clear before the next frame.
    fn request_clear(&mut self);
}

pub trait Screen {
    /// Called exactly once each time the mode is entered.
    fn init<C: ScreenContext>(&mut self, ctx: &mut C, now: Now);
    fn update<C: ScreenContext>(&mut self, ctx: &mut C, touch: TouchSample, now: Now)
    -> ModeResult;
    /// Reports and clears the "something changed" flag.
    fn take_redraw(&mut self) -> bool;
}

/// The screen backing the active mode.
pub enum ActiveScreen {
    Splash,
    Connecting(ConnectingScreen),
    Setup(SetupScreen),
    Clock(ClockScreen),
    Settings(SettingsScreen),
    Timezone(TimezoneScreen),
    Ntp(NtpScreen),
    About(AboutScreen),
}

impl ActiveScreen {
    pub fn init<C: ScreenContext>(&mut self, ctx: &mut C, now: Now) {
        match self {
            Self::Splash => {}
            Self::Connecting(screen) => screen.init(ctx, now),
            Self::Setup(screen) => screen.init(ctx, now),
            Self::Clock(screen) => screen.init(ctx, now),
            Self::Settings(screen) => screen.init(ctx, now),
            Self::Timezone(screen) => screen.init(ctx, now),
            Self::Ntp(screen) => screen.init(ctx, now),
            Self::About(screen) => screen.init(ctx, now),
        }
    }

    pub fn update<C: ScreenContext>(
        &mut self,
        ctx: &mut C,
        touch: TouchSample,
        now: Now,
    ) -> ModeResult {
        match self {
            Self::Splash => ModeResult::Continue,
            Self::Connecting(screen) => screen.update(ctx, touch, now),
            Self::Setup(screen) => screen.update(ctx, touch, now),
            Self::Clock(screen) => screen.update(ctx, touch, now),
            Self::Settings(screen) => screen.update(ctx, touch, now),
            Self::Timezone(screen) => screen.update(ctx, touch, now),
            Self::Ntp(screen) => screen.update(ctx, touch, now),
            Self::About(screen) => screen.update(ctx, touch, now),
        }
    }

    pub fn take_redraw(&mut self) -> bool {
        match self {
            Self::Splash => false,
            Self::Connecting(screen) => screen.take_redraw(),
            Self::Setup(screen) => screen.take_redraw(),
            Self::Clock(screen) => screen.take_redraw(),
            Self::Settings(screen) => screen.take_redraw(),
            Self::Timezone(screen) => screen.take_redraw(),
            Self::Ntp(screen) => screen.take_redraw(),
            Self::About(screen) => screen.take_redraw(),
        }
    }

    pub fn view(&self) -> ScreenView<'_> {
        match self {
            Self::Splash => ScreenView::Splash,
            Self::Connecting(screen) => screen.view(),
            Self::Setup(screen) => ScreenView::Setup(screen.view()),
            Self::Clock(screen) => ScreenView::Clock(screen.face()),
            Self::Settings(screen) => ScreenView::Settings(screen.view()),
            Self::Timezone(screen) => ScreenView::Timezone(screen.view()),
            Self::Ntp(screen) => ScreenView::Ntp(screen.view()),
            Self::About(_) => AboutScreen::view(),
        }
    }
}
