//! View models handed to the display renderer.
//!
//! Each variant carries exactly what one screen needs to draw itself; the
//! renderer never reaches back into application state.

use heapless::String;

use crate::{
    connection::Network,
    screens::keyboard::KeyboardLayer,
    settings::PASSWORD_MAX_LEN,
    tz::{LocalTime, Zone},
};

pub const STATUS_LINE_BYTES: usize = 48;

pub type StatusLine = String<STATUS_LINE_BYTES>;

pub const APP_NAME: &str = "The CYD Clock";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_URL: &str = "github.com/timdoug/cyd_clock";

/// Everything the clock face shows, refreshed once per displayed second.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClockFace {
    /// `None` until the wall clock has been set.
    pub time: Option<LocalTime>,
    pub colon_visible: bool,
    pub synced: bool,
    pub status: StatusLine,
    pub detail: StatusLine,
    pub next_sync: StatusLine,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SetupView<'a> {
    Scanning,
    NoNetworks,
    NetworkList {
        networks: &'a [Network],
        offset: usize,
    },
    PasswordEntry {
        ssid: &'a str,
        /// Every character but the last replaced with `*`.
        masked: String<PASSWORD_MAX_LEN>,
        rows: [&'static str; 4],
        layer: KeyboardLayer,
        shift: bool,
    },
    Connecting {
        ssid: &'a str,
    },
    Connected {
        ssid: &'a str,
    },
    Failed {
        ssid: &'a str,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SettingsView {
    pub brightness: u8,
    pub led_brightness: u8,
    pub rotated: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimezoneView<'a> {
    pub zones: &'a [Zone],
    pub offset: usize,
    pub selected: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NtpView<'a> {
    Main {
        server: &'a str,
        interval_labels: [&'static str; 4],
        interval_index: usize,
    },
    Keyboard {
        server: &'a str,
        rows: [&'static str; 4],
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScreenView<'a> {
    Splash,
    Connecting { ssid: &'a str },
    Setup(SetupView<'a>),
    Clock(&'a ClockFace),
    Settings(SettingsView),
    Timezone(TimezoneView<'a>),
    Ntp(NtpView<'a>),
    About {
        name: &'static str,
        version: &'static str,
        url: &'static str,
    },
}

/// Mask a password for display, leaving the most recent character visible.
pub fn masked_password(password: &str) -> String<PASSWORD_MAX_LEN> {
    let mut out = String::new();
    let count = password.chars().count();
    for (index, ch) in password.chars().enumerate() {
        let shown = if index + 1 == count { ch } else { '*' };
        if out.push(shown).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_shows_only_last_character() {
        assert_eq!(masked_password("").as_str(), "");
        assert_eq!(masked_password("a").as_str(), "a");
        assert_eq!(masked_password("secret").as_str(), "*****t");
    }
}
