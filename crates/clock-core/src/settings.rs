//! Persisted user settings abstraction.

use heapless::String;
use log::debug;

pub const SSID_MAX_LEN: usize = 32;
pub const PASSWORD_MAX_LEN: usize = 64;
pub const TIMEZONE_MAX_LEN: usize = 48;
pub const NTP_SERVER_MAX_LEN: usize = 63;

pub const DEFAULT_TIMEZONE: &str = "UTC0";
pub const DEFAULT_NTP_SERVER: &str = "pool.ntp.org";

pub const BRIGHTNESS_MIN: u8 = 32;
pub const BRIGHTNESS_MAX: u8 = 255;
pub const BRIGHTNESS_STEP: u8 = 16;
pub const BRIGHTNESS_DEFAULT: u8 = 255;

pub const NTP_MIN_INTERVAL_SECS: u32 = 15;
pub const NTP_DEFAULT_INTERVAL_SECS: u32 = 86_400;

pub type Ssid = String<SSID_MAX_LEN>;
pub type Password = String<PASSWORD_MAX_LEN>;
pub type TimezoneSpec = String<TIMEZONE_MAX_LEN>;
pub type NtpServer = String<NTP_SERVER_MAX_LEN>;

/// User-tunable settings that should survive reboot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PersistedSettings {
    pub ssid: Ssid,
    pub password: Password,
    pub timezone: TimezoneSpec,
    pub brightness: u8,
    pub led_brightness: u8,
    pub rotated: bool,
    pub ntp_interval_secs: u32,
    pub ntp_server: NtpServer,
}

impl PersistedSettings {
    pub fn has_credentials(&self) -> bool {
        !self.ssid.is_empty()
    }

    pub fn with_credentials(mut self, ssid: &str, password: &str) -> Self {
        self.set_credentials(ssid, password);
        self
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) {
        self.ssid = truncated(ssid);
        self.password = truncated(password);
    }

    pub fn set_timezone(&mut self, timezone: &str) {
        self.timezone = truncated(timezone);
    }

    pub fn set_ntp_server(&mut self, server: &str) {
        self.ntp_server = truncated(server);
    }

    /// Clamp every field into its valid range and substitute defaults for
    /// missing values. Stored records are normalized on load so a corrupted
    /// or older record can never push the UI out of range.
    pub fn normalized(mut self) -> Self {
        if self.brightness < BRIGHTNESS_MIN {
            debug!(
                "settings: brightness {} below floor, using default",
                self.brightness
            );
            self.brightness = BRIGHTNESS_DEFAULT;
        }
        if self.ntp_interval_secs < NTP_MIN_INTERVAL_SECS {
            self.ntp_interval_secs = NTP_MIN_INTERVAL_SECS;
        }
        if self.timezone.is_empty() {
            self.timezone = truncated(DEFAULT_TIMEZONE);
        }
        if self.ntp_server.is_empty() {
            self.ntp_server = truncated(DEFAULT_NTP_SERVER);
        }
        self
    }
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            timezone: truncated(DEFAULT_TIMEZONE),
            brightness: BRIGHTNESS_DEFAULT,
            led_brightness: BRIGHTNESS_DEFAULT,
            rotated: false,
            ntp_interval_secs: NTP_DEFAULT_INTERVAL_SECS,
            ntp_server: truncated(DEFAULT_NTP_SERVER),
        }
    }
}

/// Abstract settings persistence backend.
pub trait SettingsStore {
    type Error: core::fmt::Debug;

    fn load(&mut self) -> Result<Option<PersistedSettings>, Self::Error>;
    fn save(&mut self, settings: &PersistedSettings) -> Result<(), Self::Error>;
}

/// Copy as much of `value` as fits, never splitting a UTF-8 sequence.
pub fn truncated<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    for ch in value.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
