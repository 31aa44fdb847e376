//! On-screen keyboards: the full password keyboard and the compact
//! host-name keyboard used for the NTP server.

use crate::input::Tap;

use super::layout::DISPLAY_WIDTH;

pub const KEYBOARD_Y: i16 = 120;
pub const KEY_WIDTH: i16 = 28;
pub const KEY_HEIGHT: i16 = 22;
pub const KEY_SPACING: i16 = 2;
pub const KEY_PITCH_X: i16 = KEY_WIDTH + KEY_SPACING;
pub const KEY_PITCH_Y: i16 = KEY_HEIGHT + KEY_SPACING;
pub const SPECIAL_ROW_Y: i16 = KEYBOARD_Y + 4 * KEY_PITCH_Y;

pub const HOST_KEY_WIDTH: i16 = 29;
pub const HOST_KEY_HEIGHT: i16 = 22;
pub const HOST_BOTTOM_ROW_Y: i16 = KEYBOARD_Y + 4 * HOST_KEY_HEIGHT;
pub const HOST_CANCEL_X: i16 = 10;
pub const HOST_DEL_X: i16 = 120;
pub const HOST_DONE_X: i16 = 230;
pub const HOST_BUTTON_W: i16 = 80;

const LOWER_ROWS: [&str; 4] = ["1234567890", "qwertyuiop", "asdfghjkl", "zxcvbnm"];
const UPPER_ROWS: [&str; 4] = ["1234567890", "QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];
const SYMBOL_ROWS: [&str; 4] = ["!@#$%^&*()", "-_=+[]{}\\|", ";:'\"<>,.", "`~?/"];
pub const HOST_ROWS: [&str; 4] = ["1234567890", "qwertyuiop", "asdfghjkl.", "zxcvbnm-_"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Key {
    Char(char),
    Shift,
    Mode,
    Delete,
    Enter,
    Cancel,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KeyboardLayer {
    #[default]
    Letters,
    Symbols,
}

/// Password keyboard state: letters or symbols, with one-shot shift.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PasswordKeyboard {
    layer: KeyboardLayer,
    shift: bool,
}

impl PasswordKeyboard {
    pub const fn new() -> Self {
        Self {
            layer: KeyboardLayer::Letters,
            shift: false,
        }
    }

    pub const fn layer(&self) -> KeyboardLayer {
        self.layer
    }

    pub const fn shift(&self) -> bool {
        self.shift
    }

    pub const fn rows(&self) -> [&'static str; 4] {
        match (self.layer, self.shift) {
            (KeyboardLayer::Symbols, _) => SYMBOL_ROWS,
            (KeyboardLayer::Letters, true) => UPPER_ROWS,
            (KeyboardLayer::Letters, false) => LOWER_ROWS,
        }
    }

    pub fn key_at(&self, tap: Tap) -> Option<Key> {
        if tap.y < KEYBOARD_Y {
            return None;
        }

        let row = ((tap.y - KEYBOARD_Y) / KEY_PITCH_Y) as usize;
        if row >= 4 {
            if tap.y < SPECIAL_ROW_Y || tap.y >= SPECIAL_ROW_Y + KEY_HEIGHT {
                return None;
            }
            return Some(match tap.x {
                x if x < 45 => Key::Shift,
                x if x < 90 => Key::Mode,
                x if x < 195 => Key::Char(' '),
                x if x < 240 => Key::Delete,
                _ => Key::Enter,
            });
        }

        key_in_row(self.rows()[row], tap.x, KEY_PITCH_X).map(Key::Char)
    }

    /// Apply a modifier key; returns `false` for keys this layer does not own.
    pub fn apply(&mut self, key: Key) -> bool {
        match key {
            Key::Shift => self.shift = !self.shift,
            Key::Mode => {
                self.layer = match self.layer {
                    KeyboardLayer::Letters => KeyboardLayer::Symbols,
                    KeyboardLayer::Symbols => KeyboardLayer::Letters,
                };
                self.shift = false;
            }
            _ => return false,
        }
        true
    }

    /// Shift releases after one character.
    pub fn after_char(&mut self) {
        self.shift = false;
    }
}

/// Left edge of a keyboard row of `len` keys centered on the display.
pub const fn row_start_x(len: usize, pitch: i16) -> i16 {
    (DISPLAY_WIDTH - len as i16 * pitch) / 2
}

fn key_in_row(keys: &str, x: i16, pitch: i16) -> Option<char> {
    let start = row_start_x(keys.len(), pitch);
    if x < start {
        return None;
    }
    let col = ((x - start) / pitch) as usize;
    keys.chars().nth(col)
}

/// Hit-test the NTP host-name keyboard.
pub fn host_key_at(tap: Tap) -> Option<Key> {
    if tap.y < KEYBOARD_Y {
        return None;
    }

    let row = ((tap.y - KEYBOARD_Y) / HOST_KEY_HEIGHT) as usize;
    if row >= 4 {
        let within = |x0: i16| tap.x >= x0 && tap.x < x0 + HOST_BUTTON_W;
        return if within(HOST_CANCEL_X) {
            Some(Key::Cancel)
        } else if within(HOST_DEL_X) {
            Some(Key::Delete)
        } else if within(HOST_DONE_X) {
            Some(Key::Enter)
        } else {
            None
        };
    }

    key_in_row(HOST_ROWS[row], tap.x, HOST_KEY_WIDTH).map(Key::Char)
}

/// Top-left corner of key `col` in row `row` of a password keyboard page.
pub const fn password_key_origin(row: usize, col: usize, row_len: usize) -> (i16, i16) {
    (
        row_start_x(row_len, KEY_PITCH_X) + col as i16 * KEY_PITCH_X,
        KEYBOARD_Y + row as i16 * KEY_PITCH_Y,
    )
}

pub const fn host_key_origin(row: usize, col: usize, row_len: usize) -> (i16, i16) {
    (
        row_start_x(row_len, HOST_KEY_WIDTH) + col as i16 * HOST_KEY_WIDTH,
        KEYBOARD_Y + row as i16 * HOST_KEY_HEIGHT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap(x: i16, y: i16) -> Tap {
        Tap { x, y }
    }

    #[test]
    fn password_letters_and_shift() {
        let mut keyboard = PasswordKeyboard::new();
        let (x, y) = password_key_origin(1, 0, 10);
        assert_eq!(keyboard.key_at(tap(x + 5, y + 5)), Some(Key::Char('q')));

        assert!(keyboard.apply(Key::Shift));
        assert_eq!(keyboard.key_at(tap(x + 5, y + 5)), Some(Key::Char('Q')));
        keyboard.after_char();
        assert!(!keyboard.shift());
    }

    #[test]
    fn mode_switches_to_symbols_and_clears_shift() {
        let mut keyboard = PasswordKeyboard::new();
        keyboard.apply(Key::Shift);
        keyboard.apply(Key::Mode);
        assert_eq!(keyboard.layer(), KeyboardLayer::Symbols);
        assert!(!keyboard.shift());
        let (x, y) = password_key_origin(0, 1, 10);
        assert_eq!(keyboard.key_at(tap(x + 1, y + 1)), Some(Key::Char('@')));
    }

    #[test]
    fn special_row_split_by_x() {
        let keyboard = PasswordKeyboard::new();
        let y = SPECIAL_ROW_Y + 5;
        assert_eq!(keyboard.key_at(tap(10, y)), Some(Key::Shift));
        assert_eq!(keyboard.key_at(tap(60, y)), Some(Key::Mode));
        assert_eq!(keyboard.key_at(tap(150, y)), Some(Key::Char(' ')));
        assert_eq!(keyboard.key_at(tap(200, y)), Some(Key::Delete));
        assert_eq!(keyboard.key_at(tap(300, y)), Some(Key::Enter));
        assert_eq!(keyboard.key_at(tap(300, SPECIAL_ROW_Y + KEY_HEIGHT)), None);
    }

    #[test]
    fn taps_outside_short_rows_miss() {
        let keyboard = PasswordKeyboard::new();
        let (x, y) = password_key_origin(3, 0, 7);
        assert_eq!(keyboard.key_at(tap(x - 1, y + 1)), None);
        assert_eq!(keyboard.key_at(tap(x + 7 * KEY_PITCH_X, y + 1)), None);
        assert_eq!(keyboard.key_at(tap(x + 1, y + 1)), Some(Key::Char('z')));
    }

    #[test]
    fn host_keyboard_layout() {
        let (x, y) = host_key_origin(2, 9, 10);
        assert_eq!(host_key_at(tap(x + 2, y + 2)), Some(Key::Char('.')));
        let y = HOST_BOTTOM_ROW_Y + 5;
        assert_eq!(host_key_at(tap(20, y)), Some(Key::Cancel));
        assert_eq!(host_key_at(tap(150, y)), Some(Key::Delete));
        assert_eq!(host_key_at(tap(250, y)), Some(Key::Enter));
        assert_eq!(host_key_at(tap(100, y)), None);
    }
}
