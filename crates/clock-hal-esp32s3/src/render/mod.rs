//! embedded-graphics renderer for the 320x240 RGB565 panel.
//!
//! Every frame repaints the regions it owns with an opaque background, so the
//! board only needs a full clear when the mode or rotation changes.

mod clock;
mod menus;
mod setup;
mod widgets;

use core::fmt::Write;

use clock_core::{
    connection::signal_bars,
    render::{ClockFace, NtpView, ScreenView, SettingsView, SetupView, TimezoneView},
    screens::{
        keyboard::{
            HOST_BOTTOM_ROW_Y, HOST_BUTTON_W, HOST_CANCEL_X, HOST_DEL_X, HOST_DONE_X,
            HOST_KEY_HEIGHT, HOST_KEY_WIDTH, KEY_HEIGHT, KEY_WIDTH, KeyboardLayer, SPECIAL_ROW_Y,
            host_key_origin, password_key_origin,
        },
        layout::{
            BACK_BUTTON_W, CLOCK_DATE_Y, CLOCK_STATS_LINE2_Y, CLOCK_STATS_LINE3_Y, CLOCK_STATS_Y,
            CLOCK_TIME_Y, DISPLAY_HEIGHT, DISPLAY_WIDTH, DONE_BUTTON_W, DONE_BUTTON_X,
            HEADER_HEIGHT, HEADER_TEXT_Y, ITEM_HEIGHT, ITEM_TEXT_X, ITEM_TEXT_Y, LIST_END_Y,
            LIST_ITEM_H, LIST_START_Y, LIST_VISIBLE, NTP_INTERVAL_GAP, NTP_INTERVAL_H,
            NTP_INTERVAL_W, NTP_INTERVAL_X, NTP_INTERVAL_Y, NTP_SERVER_BOX_H, NTP_SERVER_BOX_Y,
            NTP_SYNC_H, NTP_SYNC_W, NTP_SYNC_X, NTP_SYNC_Y, ROTATION_TOGGLE_W, ROTATION_TOGGLE_X,
            SETTINGS_ROWS, SLIDER_BAR_W, SLIDER_BAR_X, SLIDER_BTN_W, SLIDER_BTN_X1,
            SLIDER_BTN_X2, settings_row_y,
        },
    },
    settings::BRIGHTNESS_MAX,
};
use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyleBuilder,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use heapless::String;

use widgets::*;

/// Draws one [`ScreenView`] onto any RGB565 target.
pub trait ViewRenderer {
    fn render<D>(&mut self, view: ScreenView<'_>, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>;
}

#[derive(Debug, Default)]
pub struct TftRenderer;

impl TftRenderer {
    pub const fn new() -> Self {
        Self
    }
}

impl ViewRenderer for TftRenderer {
    fn render<D>(&mut self, view: ScreenView<'_>, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        match view {
            ScreenView::Splash => menus::draw_splash(target),
            ScreenView::Connecting { ssid } => menus::draw_boot_connecting(target, ssid),
            ScreenView::Setup(view) => setup::draw_setup(target, &view),
            ScreenView::Clock(face) => clock::draw_clock(target, face),
            ScreenView::Settings(view) => menus::draw_settings(target, view),
            ScreenView::Timezone(view) => menus::draw_timezone(target, view),
            ScreenView::Ntp(view) => menus::draw_ntp(target, view),
            ScreenView::About { name, version, url } => {
                menus::draw_about(target, name, version, url)
            }
        }
    }
}
