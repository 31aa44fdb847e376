//! WiFi onboarding: scan, pick a network, type the password, connect.

use heapless::{String, Vec};
use log::{info, warn};

use crate::{
    connection::{ConnectPoll, MAX_SCAN_RESULTS, Network},
    input::{Tap, TapFilter, TouchSample},
    render::{SetupView, masked_password},
    settings::{PASSWORD_MAX_LEN, Password, Ssid, truncated},
    timing::Now,
};

use super::{
    ModeResult, Screen, ScreenContext,
    keyboard::{Key, PasswordKeyboard},
    layout::is_back_button,
    list::{ListHit, ScrollList},
};

/// Longest password the keyboard accepts.
pub const PASSWORD_INPUT_MAX: usize = PASSWORD_MAX_LEN - 1;
/// How long "Connected!" stays up before handing over to the clock.
pub const CONNECTED_HOLD_MS: u64 = 1_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SetupState {
    Scanning { requested: bool },
    NoNetworks,
    NetworkList,
    PasswordEntry,
    Connecting,
    Connected { since_ms: u64 },
    Failed,
}

#[derive(Debug)]
pub struct SetupScreen {
    state: SetupState,
    networks: Vec<Network, MAX_SCAN_RESULTS>,
    list: ScrollList,
    selected: Option<usize>,
    password: Password,
    keyboard: PasswordKeyboard,
    taps: TapFilter,
    credentials: Option<(Ssid, Password)>,
    redraw: bool,
}

impl Default for SetupScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupScreen {
    pub const fn new() -> Self {
        Self {
            state: SetupState::Scanning { requested: false },
            networks: Vec::new(),
            list: ScrollList::new(0),
            selected: None,
            password: String::new(),
            keyboard: PasswordKeyboard::new(),
            taps: TapFilter::new(),
            credentials: None,
            redraw: false,
        }
    }

    pub const fn state(&self) -> SetupState {
        self.state
    }

    /// Credentials of the last successful connection.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(ssid, password)| (ssid.as_str(), password.as_str()))
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn view(&self) -> SetupView<'_> {
        match self.state {
            SetupState::Scanning { .. } => SetupView::Scanning,
            SetupState::NoNetworks => SetupView::NoNetworks,
            SetupState::NetworkList => SetupView::NetworkList {
                networks: &self.networks,
                offset: self.list.offset(),
            },
            SetupState::PasswordEntry => SetupView::PasswordEntry {
                ssid: self.selected_ssid(),
                masked: masked_password(self.password.as_str()),
                rows: self.keyboard.rows(),
                layer: self.keyboard.layer(),
                shift: self.keyboard.shift(),
            },
            SetupState::Connecting => SetupView::Connecting {
                ssid: self.selected_ssid(),
            },
            SetupState::Connected { .. } => SetupView::Connected {
                ssid: self.selected_ssid(),
            },
            SetupState::Failed => SetupView::Failed {
                ssid: self.selected_ssid(),
            },
        }
    }

    fn selected_ssid(&self) -> &str {
        self.selected
            .and_then(|index| self.networks.get(index))
            .map_or("", |network| network.ssid.as_str())
    }

    fn set_state(&mut self, state: SetupState) {
        self.state = state;
        self.redraw = true;
    }

    fn restart_scan(&mut self) {
        self.networks.clear();
        self.list = ScrollList::new(0);
        self.selected = None;
        self.set_state(SetupState::Scanning { requested: false });
    }

    fn open_password_entry(&mut self) {
        self.password.clear();
        self.keyboard = PasswordKeyboard::new();
        self.set_state(SetupState::PasswordEntry);
    }

    fn on_list_tap(&mut self, tap: Tap) {
        match self.list.hit(tap) {
            Some(ListHit::Item(index)) => {
                self.selected = Some(index);
                info!("setup: selected {}", self.selected_ssid());
                self.open_password_entry();
            }
            Some(hit) => {
                self.list.scroll(hit);
                self.redraw = true;
            }
            None => {}
        }
    }

    fn on_key<C: ScreenContext>(&mut self, ctx: &mut C, key: Key, now: Now) {
        if self.keyboard.apply(key) {
            self.redraw = true;
            return;
        }
        match key {
            Key::Delete => {
                if self.password.pop().is_some() {
                    self.redraw = true;
                }
            }
            Key::Enter => {
                let ssid: Ssid = truncated(self.selected_ssid());
                info!("setup: connecting to {}", ssid);
                ctx.begin_connect(ssid.as_str(), self.password.as_str(), now.monotonic_ms);
                self.set_state(SetupState::Connecting);
            }
            Key::Char(ch) if (' '..='~').contains(&ch) => {
                if self.password.len() < PASSWORD_INPUT_MAX && self.password.push(ch).is_ok() {
                    self.keyboard.after_char();
                    self.redraw = true;
                }
            }
            _ => {}
        }
    }
}

impl Screen for SetupScreen {
    fn init<C: ScreenContext>(&mut self, _ctx: &mut C, _now: Now) {
        info!("setup: starting wifi setup");
        *self = Self::new();
        self.taps.reset_edge(true);
        self.redraw = true;
    }

    fn update<C: ScreenContext>(
        &mut self,
        ctx: &mut C,
        touch: TouchSample,
        now: Now,
    ) -> ModeResult {
        let tap = self.taps.accept(touch, now.monotonic_ms);
        let back = tap.is_some_and(is_back_button);

        match self.state {
            SetupState::Scanning { requested: false } => {
                ctx.begin_scan(now.monotonic_ms);
                self.state = SetupState::Scanning { requested: true };
            }
            SetupState::Scanning { requested: true } => {
                if back {
                    return ModeResult::Cancelled;
                }
                if let Some(networks) = ctx.poll_scan(now.monotonic_ms) {
                    self.list = ScrollList::new(networks.len());
                    self.networks = networks;
                    if self.networks.is_empty() {
                        self.set_state(SetupState::NoNetworks);
                    } else {
                        self.set_state(SetupState::NetworkList);
                    }
                }
            }
            SetupState::NoNetworks => {
                if back {
                    return ModeResult::Cancelled;
                }
                if tap.is_some() {
                    self.restart_scan();
                }
            }
            SetupState::NetworkList => {
                if back {
                    return ModeResult::Cancelled;
                }
                if let Some(tap) = tap {
                    self.on_list_tap(tap);
                }
            }
            SetupState::PasswordEntry => {
                if back {
                    return ModeResult::Cancelled;
                }
                if let Some(key) = tap.and_then(|tap| self.keyboard.key_at(tap)) {
                    self.on_key(ctx, key, now);
                }
            }
            SetupState::Connecting => match ctx.poll_connect(now.monotonic_ms) {
                ConnectPoll::Pending => {}
                ConnectPoll::Connected => {
                    let ssid: Ssid = truncated(self.selected_ssid());
                    self.credentials = Some((ssid, self.password.clone()));
                    self.set_state(SetupState::Connected {
                        since_ms: now.monotonic_ms,
                    });
                }
                ConnectPoll::Failed(err) => {
                    warn!("setup: connection failed: {}", err);
                    self.set_state(SetupState::Failed);
                }
            },
            SetupState::Connected { since_ms } => {
                if now.monotonic_ms.saturating_sub(since_ms) >= CONNECTED_HOLD_MS {
                    return ModeResult::Connected;
                }
            }
            SetupState::Failed => {
                if tap.is_some() {
                    self.set_state(SetupState::PasswordEntry);
                }
            }
        }

        ModeResult::Continue
    }

    fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}
