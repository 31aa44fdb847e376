use log::info;

use crate::{
    input::{TapFilter, TouchSample},
    render::SettingsView,
    settings::{BRIGHTNESS_MAX, BRIGHTNESS_MIN, BRIGHTNESS_STEP},
    timing::Now,
};

use super::{
    ModeResult, Screen, ScreenContext,
    layout::{
        DONE_BUTTON_W, DONE_BUTTON_X, ROTATION_TOGGLE_W, ROTATION_TOGGLE_X, SLIDER_BAR_W,
        SLIDER_BAR_X, SLIDER_BTN_W, SLIDER_BTN_X1, SLIDER_BTN_X2, settings_row_at,
    },
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Row {
    Timezone,
    Wifi,
    Ntp,
    Brightness,
    LedBrightness,
    Rotation,
    About,
    Done,
}

impl Row {
    const ALL: [Self; 8] = [
        Self::Timezone,
        Self::Wifi,
        Self::Ntp,
        Self::Brightness,
        Self::LedBrightness,
        Self::Rotation,
        Self::About,
        Self::Done,
    ];
}

#[derive(Debug, Default)]
pub struct SettingsScreen {
    taps: TapFilter,
    brightness: u8,
    led_brightness: u8,
    rotated: bool,
    redraw: bool,
}

impl SettingsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn view(&self) -> SettingsView {
        SettingsView {
            brightness: self.brightness,
            led_brightness: self.led_brightness,
            rotated: self.rotated,
        }
    }
}

impl Screen for SettingsScreen {
    fn init<C: ScreenContext>(&mut self, ctx: &mut C, _now: Now) {
        let settings = ctx.settings();
        self.brightness = settings.brightness.max(BRIGHTNESS_MIN);
        self.led_brightness = settings.led_brightness;
        self.rotated = settings.rotated;
        ctx.set_indicator(0);
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
        let Some(row) = settings_row_at(tap.y).map(|index| Row::ALL[index]) else {
            return ModeResult::Continue;
        };

        let leave = match row {
            Row::Timezone => Some(ModeResult::OpenTimezone),
            Row::Wifi => Some(ModeResult::OpenWifi),
            Row::Ntp => Some(ModeResult::OpenNtp),
            Row::About => Some(ModeResult::OpenAbout),
            Row::Done if tap.x >= DONE_BUTTON_X && tap.x < DONE_BUTTON_X + DONE_BUTTON_W => {
                Some(ModeResult::Done)
            }
            _ => None,
        };
        if let Some(result) = leave {
            ctx.set_indicator(0);
            return result;
        }

        match row {
            Row::Brightness => {
                if let Some(level) = slider_value(tap.x, self.brightness, BRIGHTNESS_MIN) {
                    self.brightness = level;
                    ctx.set_backlight(level);
                    ctx.update_settings(|settings| settings.brightness = level);
                    self.redraw = true;
                }
            }
            Row::LedBrightness => {
                if let Some(level) = slider_value(tap.x, self.led_brightness, 0) {
                    self.led_brightness = level;
                    ctx.set_indicator(level);
                    ctx.update_settings(|settings| settings.led_brightness = level);
                    self.redraw = true;
                }
            }
            Row::Rotation => {
                if tap.x >= ROTATION_TOGGLE_X && tap.x < ROTATION_TOGGLE_X + ROTATION_TOGGLE_W {
                    let rotated = !self.rotated;
                    self.rotated = rotated;
                    info!("settings: rotation {}", if rotated { "on" } else { "off" });
                    ctx.set_rotation(rotated);
                    ctx.update_settings(|settings| settings.rotated = rotated);
                    ctx.request_clear();
                    self.redraw = true;
                }
            }
            _ => {}
        }

        ModeResult::Continue
    }

    fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}

/// New value for a slider row tapped at `x`: the bar sets an absolute level,
/// the side buttons step down or up.
fn slider_value(x: i16, current: u8, min: u8) -> Option<u8> {
    if x >= SLIDER_BAR_X && x < SLIDER_BAR_X + SLIDER_BAR_W {
        let level = (i32::from(x - SLIDER_BAR_X) * i32::from(BRIGHTNESS_MAX))
            / i32::from(SLIDER_BAR_W);
        return Some((level as u8).max(min));
    }
    if x >= SLIDER_BTN_X1 && x < SLIDER_BTN_X1 + SLIDER_BTN_W {
        return Some(current.saturating_sub(BRIGHTNESS_STEP).max(min));
    }
    if x >= SLIDER_BTN_X2 && x < SLIDER_BTN_X2 + SLIDER_BTN_W {
        return Some(current.saturating_add(BRIGHTNESS_STEP).min(BRIGHTNESS_MAX));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_buttons_step_within_bounds() {
        assert_eq!(slider_value(SLIDER_BTN_X1 + 1, 40, 32), Some(32));
        assert_eq!(slider_value(SLIDER_BTN_X1 + 1, 100, 32), Some(84));
        assert_eq!(slider_value(SLIDER_BTN_X2 + 1, 250, 32), Some(255));
        assert_eq!(slider_value(SLIDER_BTN_X2 + 1, 0, 0), Some(16));
    }

    #[test]
    fn slider_bar_maps_position_and_floors() {
        assert_eq!(slider_value(SLIDER_BAR_X, 200, 32), Some(32));
        assert_eq!(slider_value(SLIDER_BAR_X, 200, 0), Some(0));
        assert_eq!(slider_value(SLIDER_BAR_X + SLIDER_BAR_W / 2, 0, 0), Some(127));
        assert_eq!(slider_value(SLIDER_BAR_X + SLIDER_BAR_W, 0, 0), None);
        assert_eq!(slider_value(20, 0, 0), None);
    }
}
