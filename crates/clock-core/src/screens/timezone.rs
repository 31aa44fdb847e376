use log::info;

use crate::{
    input::{TapFilter, TouchSample},
    render::TimezoneView,
    timing::Now,
    tz::{TIMEZONES, Zone, zone_index},
};

use super::{
    ModeResult, Screen, ScreenContext,
    layout::is_back_button,
    list::{ListHit, ScrollList},
};

#[derive(Debug)]
pub struct TimezoneScreen {
    taps: TapFilter,
    list: ScrollList,
    selected: usize,
    redraw: bool,
}

impl Default for TimezoneScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl TimezoneScreen {
    pub const fn new() -> Self {
        Self {
            taps: TapFilter::new(),
            list: ScrollList::new(TIMEZONES.len()),
            selected: 0,
            redraw: false,
        }
    }

    pub fn selected(&self) -> &'static Zone {
        &TIMEZONES[self.selected.min(TIMEZONES.len() - 1)]
    }

    pub fn view(&self) -> TimezoneView<'static> {
        TimezoneView {
            zones: &TIMEZONES,
            offset: self.list.offset(),
            selected: self.selected,
        }
    }
}

impl Screen for TimezoneScreen {
    fn init<C: ScreenContext>(&mut self, ctx: &mut C, _now: Now) {
        self.selected = zone_index(ctx.settings().timezone.as_str()).unwrap_or(0);
        self.list = ScrollList::new(TIMEZONES.len());
        self.list.reveal(self.selected);
        self.taps.reset_edge(true);
        self.redraw = true;
    }

    fn update<C: ScreenContext>(
        &mut self,
        _ctx: &mut C,
        touch: TouchSample,
        now: Now,
    ) -> ModeResult {
        let Some(tap) = self.taps.accept(touch, now.monotonic_ms) else {
            return ModeResult::Continue;
        };
        if is_back_button(tap) {
            return ModeResult::Cancelled;
        }

        match self.list.hit(tap) {
            Some(ListHit::Item(index)) => {
                self.selected = index;
                info!("timezone: selected {}", TIMEZONES[index].name);
                ModeResult::TimezoneSelected
            }
            Some(hit) => {
                self.list.scroll(hit);
                self.redraw = true;
                ModeResult::Continue
            }
            None => ModeResult::Continue,
        }
    }

    fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}
