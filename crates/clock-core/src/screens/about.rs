use crate::{
    input::{TapFilter, TouchSample},
    render::{APP_NAME, APP_URL, APP_VERSION, ScreenView},
    timing::Now,
};

use super::{ModeResult, Screen, ScreenContext, layout::is_back_button};

#[derive(Debug, Default)]
pub struct AboutScreen {
    taps: TapFilter,
    redraw: bool,
}

impl AboutScreen {
    pub const fn new() -> Self {
        Self {
            taps: TapFilter::new(),
            redraw: false,
        }
    }

    pub const fn view() -> ScreenView<'static> {
        ScreenView::About {
            name: APP_NAME,
            version: APP_VERSION,
            url: APP_URL,
        }
    }
}

impl Screen for AboutScreen {
    fn init<C: ScreenContext>(&mut self, _ctx: &mut C, _now: Now) {
        self.taps.reset_edge(true);
        self.redraw = true;
    }

    fn update<C: ScreenContext>(
        &mut self,
        _ctx: &mut C,
        touch: TouchSample,
        now: Now,
    ) -> ModeResult {
        match self.taps.accept(touch, now.monotonic_ms) {
            Some(tap) if is_back_button(tap) => ModeResult::Back,
            _ => ModeResult::Continue,
        }
    }

    fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}
