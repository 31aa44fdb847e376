//! Screen geometry shared by hit-testing and the renderer.
//!
//! Coordinates are in the 320x240 landscape frame after rotation.

use crate::input::Tap;

pub const DISPLAY_WIDTH: i16 = 320;
pub const DISPLAY_HEIGHT: i16 = 240;

pub const HEADER_HEIGHT: i16 = 30;
pub const HEADER_TEXT_Y: i16 = 8;
pub const BACK_BUTTON_W: i16 = 60;

pub const ITEM_START_Y: i16 = 32;
pub const ITEM_HEIGHT: i16 = 26;
pub const ITEM_TEXT_X: i16 = 10;
pub const ITEM_TEXT_Y: i16 = 5;

pub const LIST_START_Y: i16 = 35;
pub const LIST_ITEM_H: i16 = 28;
pub const LIST_VISIBLE: usize = 6;
pub const LIST_END_Y: i16 = LIST_START_Y + LIST_VISIBLE as i16 * LIST_ITEM_H;

pub const SLIDER_BTN_W: i16 = 24;
pub const SLIDER_BTN_X1: i16 = 120;
pub const SLIDER_BAR_X: i16 = 150;
pub const SLIDER_BAR_W: i16 = 120;
pub const SLIDER_BTN_X2: i16 = 276;

pub const ROTATION_TOGGLE_X: i16 = 260;
pub const ROTATION_TOGGLE_W: i16 = 50;

pub const DONE_BUTTON_W: i16 = DISPLAY_WIDTH / 3;
pub const DONE_BUTTON_X: i16 = (DISPLAY_WIDTH - DONE_BUTTON_W) / 2;

pub const SETTINGS_ROWS: usize = 8;

pub const NTP_SERVER_BOX_Y: i16 = 60;
pub const NTP_SERVER_BOX_H: i16 = 28;
pub const NTP_INTERVAL_Y: i16 = 122;
pub const NTP_INTERVAL_H: i16 = 24;
pub const NTP_INTERVAL_X: i16 = 10;
pub const NTP_INTERVAL_W: i16 = 72;
pub const NTP_INTERVAL_GAP: i16 = 4;
pub const NTP_SYNC_Y: i16 = 158;
pub const NTP_SYNC_X: i16 = 10;
pub const NTP_SYNC_W: i16 = 80;
pub const NTP_SYNC_H: i16 = 28;

pub const CLOCK_TIME_Y: i16 = 20;
pub const CLOCK_DATE_Y: i16 = 116;
pub const CLOCK_STATS_Y: i16 = 168;
pub const CLOCK_STATS_LINE2_Y: i16 = 188;
pub const CLOCK_STATS_LINE3_Y: i16 = 208;

pub const fn is_back_button(tap: Tap) -> bool {
    tap.y < HEADER_HEIGHT && tap.x < BACK_BUTTON_W
}

/// Settings row under `y`, if any.
pub const fn settings_row_at(y: i16) -> Option<usize> {
    if y < ITEM_START_Y {
        return None;
    }
    let row = ((y - ITEM_START_Y) / ITEM_HEIGHT) as usize;
    if row < SETTINGS_ROWS { Some(row) } else { None }
}

pub const fn settings_row_y(row: usize) -> i16 {
    ITEM_START_Y + row as i16 * ITEM_HEIGHT
}
