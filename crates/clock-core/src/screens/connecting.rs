use log::info;

use crate::{
    connection::ConnectPoll,
    input::TouchSample,
    render::ScreenView,
    settings::Ssid,
    timing::Now,
};

use super::{ModeResult, Screen, ScreenContext};

/// Boot-time connection attempt with the stored credentials.
#[derive(Debug, Default)]
pub struct ConnectingScreen {
    ssid: Ssid,
    redraw: bool,
}

impl ConnectingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ScreenView<'_> {
        ScreenView::Connecting {
            ssid: self.ssid.as_str(),
        }
    }
}

impl Screen for ConnectingScreen {
    fn init<C: ScreenContext>(&mut self, ctx: &mut C, now: Now) {
        let settings = ctx.settings();
        self.ssid = settings.ssid.clone();
        let password = settings.password.clone();
        info!("connecting with stored credentials for {}", self.ssid);
        ctx.begin_connect(self.ssid.as_str(), password.as_str(), now.monotonic_ms);
        self.redraw = true;
    }

    fn update<C: ScreenContext>(
        &mut self,
        ctx: &mut C,
        _touch: TouchSample,
        now: Now,
    ) -> ModeResult {
        match ctx.poll_connect(now.monotonic_ms) {
            ConnectPoll::Pending => ModeResult::Continue,
            ConnectPoll::Connected => ModeResult::Connected,
            ConnectPoll::Failed(_) => ModeResult::ConnectFailed,
        }
    }

    fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}
