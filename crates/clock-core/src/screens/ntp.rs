use log::info;

use crate::{
    input::{TapFilter, TouchSample},
    render::NtpView,
    settings::{NtpServer, truncated},
    timing::Now,
};

use super::{
    ModeResult, Screen, ScreenContext,
    keyboard::{HOST_ROWS, Key, host_key_at},
    layout::{
        NTP_INTERVAL_GAP, NTP_INTERVAL_H, NTP_INTERVAL_W, NTP_INTERVAL_X, NTP_INTERVAL_Y,
        NTP_SERVER_BOX_H, NTP_SERVER_BOX_Y, NTP_SYNC_H, NTP_SYNC_W, NTP_SYNC_X, NTP_SYNC_Y,
        is_back_button,
    },
};

/// Selectable sync intervals and their labels.
pub const NTP_INTERVALS: [(u32, &str); 4] = [
    (600, "10 min"),
    (3_600, "1 hour"),
    (21_600, "6 hour"),
    (86_400, "24 hour"),
];
const FALLBACK_INTERVAL_INDEX: usize = 2;
const SERVER_INPUT_MAX: usize = 63;

/// Button index to highlight for `secs`; unknown values highlight "6 hour".
pub fn interval_index(secs: u32) -> usize {
    NTP_INTERVALS
        .iter()
        .position(|(interval, _)| *interval == secs)
        .unwrap_or(FALLBACK_INTERVAL_INDEX)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum NtpState {
    Main,
    Keyboard,
}

#[derive(Debug)]
pub struct NtpScreen {
    state: NtpState,
    taps: TapFilter,
    server: NtpServer,
    interval_secs: u32,
    redraw: bool,
}

impl Default for NtpScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl NtpScreen {
    pub const fn new() -> Self {
        Self {
            state: NtpState::Main,
            taps: TapFilter::new(),
            server: NtpServer::new(),
            interval_secs: 0,
            redraw: false,
        }
    }

    pub fn view(&self) -> NtpView<'_> {
        match self.state {
            NtpState::Main => NtpView::Main {
                server: self.server.as_str(),
                interval_labels: NTP_INTERVALS.map(|(_, label)| label),
                interval_index: interval_index(self.interval_secs),
            },
            NtpState::Keyboard => NtpView::Keyboard {
                server: self.server.as_str(),
                rows: HOST_ROWS,
            },
        }
    }

    fn update_main<C: ScreenContext>(&mut self, ctx: &mut C, x: i16, y: i16, now: Now) -> ModeResult {
        if y >= NTP_SERVER_BOX_Y && y < NTP_SERVER_BOX_Y + NTP_SERVER_BOX_H {
            self.state = NtpState::Keyboard;
            self.redraw = true;
            return ModeResult::Continue;
        }

        if y >= NTP_INTERVAL_Y && y < NTP_INTERVAL_Y + NTP_INTERVAL_H && x >= NTP_INTERVAL_X {
            let col = ((x - NTP_INTERVAL_X) / (NTP_INTERVAL_W + NTP_INTERVAL_GAP)) as usize;
            if let Some((secs, label)) = NTP_INTERVALS.get(col).copied() {
                info!("ntp: interval set to {}", label);
                self.interval_secs = secs;
                ctx.set_sync_interval(secs, now.monotonic_ms);
                ctx.update_settings(|settings| settings.ntp_interval_secs = secs);
                self.redraw = true;
            }
            return ModeResult::Continue;
        }

        if y >= NTP_SYNC_Y
            && y < NTP_SYNC_Y + NTP_SYNC_H
            && x >= NTP_SYNC_X
            && x < NTP_SYNC_X + NTP_SYNC_W
        {
            ctx.force_sync(now.monotonic_ms);
            return ModeResult::Synced;
        }

        ModeResult::Continue
    }

    fn update_keyboard<C: ScreenContext>(&mut self, ctx: &mut C, key: Key, now: Now) {
        match key {
            Key::Cancel => {
                self.server = ctx.settings().ntp_server.clone();
                self.state = NtpState::Main;
            }
            Key::Enter => {
                if !self.server.is_empty() {
                    info!("ntp: server set to {}", self.server);
                    let server = self.server.clone();
                    ctx.set_sync_server(server.as_str());
                    ctx.update_settings(|settings| settings.set_ntp_server(server.as_str()));
                    ctx.force_sync(now.monotonic_ms);
                }
                self.state = NtpState::Main;
            }
            Key::Delete => {
                self.server.pop();
            }
            Key::Char(ch) if self.server.len() < SERVER_INPUT_MAX => {
                let _ = self.server.push(ch);
            }
            _ => return,
        }
        self.redraw = true;
    }
}

impl Screen for NtpScreen {
    fn init<C: ScreenContext>(&mut self, ctx: &mut C, _now: Now) {
        self.state = NtpState::Main;
        self.server = truncated(ctx.settings().ntp_server.as_str());
        self.interval_secs = ctx.sync_interval_secs();
        self.taps.reset_edge(true);
        self.redraw = true;
    }

    fn update<C: ScreenContext>(
        &mut self,
        ctx: &mut C,
        touch: TouchSample,
        now: Now,
    ) -> ModeResult {
        let Some(tap) = self.taps.accept(touch, now.monotonic_ms) else {
            return ModeResult::Continue;
        };

        match self.state {
            NtpState::Main if is_back_button(tap) => ModeResult::Back,
            NtpState::Main => self.update_main(ctx, tap.x, tap.y, now),
            NtpState::Keyboard => {
                if let Some(key) = host_key_at(tap) {
                    self.update_keyboard(ctx, key, now);
                }
                ModeResult::Continue
            }
        }
    }

    fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_interval_highlights_six_hours() {
        assert_eq!(interval_index(3_600), 1);
        assert_eq!(interval_index(86_400), 3);
        assert_eq!(interval_index(15), 2);
    }
}
