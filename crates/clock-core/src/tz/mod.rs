//! POSIX `TZ` rules and UTC to local conversion.
//!
//! Supports the subset the zone table needs: quoted or alphabetic names,
//! `[+-]hh[:mm[:ss]]` offsets, and `Mm.w.d`, `Jn` and `n` transition dates
//! with optional (possibly extended, e.g. `/26`) transition times.

mod civil;
mod zones;

pub use civil::{days_from_civil, days_in_month, is_leap_year};
pub use zones::{TIMEZONES, Zone, zone_index};

use log::warn;

use crate::error::ClockError;

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i32 = 3_600;
const DEFAULT_TRANSITION_SECS: i32 = 2 * SECS_PER_HOUR;
/// Rules used when a DST name is given without explicit dates.
const DEFAULT_START: RuleDate = RuleDate::Month {
    month: 3,
    week: 2,
    weekday: 0,
};
const DEFAULT_END: RuleDate = RuleDate::Month {
    month: 11,
    week: 1,
    weekday: 0,
};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RuleDate {
    /// `Mm.w.d`: weekday `d` (0 = Sunday) of week `w` (5 = last) of month `m`.
    Month { month: u8, week: u8, weekday: u8 },
    /// `Jn`: day 1..=365, February 29 never counted.
    JulianNoLeap(u16),
    /// `n`: zero-based day of year, leap day counted.
    ZeroBased(u16),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Transition {
    date: RuleDate,
    /// Local wall time of the switch, seconds after midnight.
    time_secs: i32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct DaylightRule {
    offset_secs: i32,
    start: Transition,
    end: Transition,
}

/// Parsed zone: offsets are seconds east of UTC.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeZone {
    std_offset_secs: i32,
    dst: Option<DaylightRule>,
}

/// Broken-down local time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LocalTime {
    pub year: i32,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// 0 = Sunday
    pub weekday: u8,
    /// 0-based day of year.
    pub yday: u16,
    pub is_dst: bool,
}

impl LocalTime {
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[usize::from(self.month.clamp(1, 12) - 1)]
    }

    pub fn weekday_name(&self) -> &'static str {
        WEEKDAY_NAMES[usize::from(self.weekday % 7)]
    }
}

impl TimeZone {
    pub const UTC: Self = Self {
        std_offset_secs: 0,
        dst: None,
    };

    pub fn parse(spec: &str) -> Result<Self, ClockError> {
        let mut cursor = Cursor::new(spec);
        cursor.name()?;
        let std_offset_secs = -cursor.offset()?;

        if cursor.is_done() {
            return Ok(Self {
                std_offset_secs,
                dst: None,
            });
        }

        cursor.name()?;
        let offset_secs = if cursor.peek().is_some_and(|c| c != b',') {
            -cursor.offset()?
        } else {
            std_offset_secs + SECS_PER_HOUR
        };

        let (start, end) = if cursor.is_done() {
            (
                Transition {
                    date: DEFAULT_START,
                    time_secs: DEFAULT_TRANSITION_SECS,
                },
                Transition {
                    date: DEFAULT_END,
                    time_secs: DEFAULT_TRANSITION_SECS,
                },
            )
        } else {
            cursor.expect(b',')?;
            let start = cursor.transition()?;
            cursor.expect(b',')?;
            let end = cursor.transition()?;
            (start, end)
        };

        if !cursor.is_done() {
            return Err(ClockError::InvalidConfiguration);
        }

        Ok(Self {
            std_offset_secs,
            dst: Some(DaylightRule {
                offset_secs,
                start,
                end,
            }),
        })
    }

    /// Parse `spec`, falling back to UTC when it cannot be understood.
    pub fn from_posix_or_utc(spec: &str) -> Self {
        match Self::parse(spec) {
            Ok(zone) => zone,
            Err(err) => {
                warn!("tz: cannot parse {:?} ({}), using UTC", spec, err);
                Self::UTC
            }
        }
    }

    pub const fn has_dst(&self) -> bool {
        self.dst.is_some()
    }

    /// Seconds east of UTC in effect at `unix_secs`.
    pub fn offset_at(&self, unix_secs: i64) -> i32 {
        match self.dst {
            Some(rule) if self.in_dst(&rule, unix_secs) => rule.offset_secs,
            _ => self.std_offset_secs,
        }
    }

    pub fn to_local(&self, unix_secs: i64) -> LocalTime {
        let offset = self.offset_at(unix_secs);
        let is_dst = self.dst.is_some() && offset != self.std_offset_secs;
        civil::breakdown(unix_secs + i64::from(offset), is_dst)
    }

    fn in_dst(&self, rule: &DaylightRule, unix_secs: i64) -> bool {
        let year = civil::year_of(unix_secs + i64::from(self.std_offset_secs));
        let start = transition_unix(year, rule.start) - i64::from(self.std_offset_secs);
        let end = transition_unix(year, rule.end) - i64::from(rule.offset_secs);

        if start < end {
            unix_secs >= start && unix_secs < end
        } else {
            unix_secs < end || unix_secs >= start
        }
    }
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::UTC
    }
}

/// Local-clock seconds since the epoch at which `transition` fires in `year`.
fn transition_unix(year: i32, transition: Transition) -> i64 {
    let day = match transition.date {
        RuleDate::Month {
            month,
            week,
            weekday,
        } => {
            let first = days_from_civil(year, month, 1);
            let first_weekday = civil::weekday(first);
            let mut mday = 1 + (i64::from(weekday) - i64::from(first_weekday)).rem_euclid(7)
                + 7 * (i64::from(week) - 1);
            let month_len = i64::from(days_in_month(year, month));
            while mday > month_len {
                mday -= 7;
            }
            first + mday - 1
        }
        RuleDate::JulianNoLeap(n) => {
            let mut index = i64::from(n) - 1;
            if is_leap_year(year) && n >= 60 {
                index += 1;
            }
            days_from_civil(year, 1, 1) + index
        }
        RuleDate::ZeroBased(n) => days_from_civil(year, 1, 1) + i64::from(n),
    };
    day * SECS_PER_DAY + i64::from(transition.time_secs)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(spec: &'a str) -> Self {
        Self {
            bytes: spec.trim().as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn expect(&mut self, byte: u8) -> Result<(), ClockError> {
        if self.bump() == Some(byte) {
            Ok(())
        } else {
            Err(ClockError::InvalidConfiguration)
        }
    }

    fn name(&mut self) -> Result<(), ClockError> {
        let start = self.pos;
        if self.peek() == Some(b'<') {
            self.pos += 1;
            while let Some(byte) = self.bump() {
                if byte == b'>' {
                    return if self.pos - start > 2 {
                        Ok(())
                    } else {
                        Err(ClockError::InvalidConfiguration)
                    };
                }
            }
            return Err(ClockError::InvalidConfiguration);
        }

        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos - start >= 3 {
            Ok(())
        } else {
            Err(ClockError::InvalidConfiguration)
        }
    }

    fn number(&mut self, max_digits: usize) -> Result<u32, ClockError> {
        let mut value = 0u32;
        let mut digits = 0;
        while digits < max_digits {
            match self.peek() {
                Some(byte) if byte.is_ascii_digit() => {
                    value = value * 10 + u32::from(byte - b'0');
                    self.pos += 1;
                    digits += 1;
                }
                _ => break,
            }
        }
        if digits == 0 {
            Err(ClockError::InvalidConfiguration)
        } else {
            Ok(value)
        }
    }

    /// `[+-]h[h][:mm[:ss]]`, returned in seconds with the written sign.
    fn signed_hms(&mut self, max_hour_digits: usize) -> Result<i32, ClockError> {
        let sign = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                -1
            }
            Some(b'+') => {
                self.pos += 1;
                1
            }
            _ => 1,
        };
        let hours = self.number(max_hour_digits)?;
        let mut secs = hours * 3_600;
        if self.peek() == Some(b':') {
            self.pos += 1;
            secs += self.number(2)? * 60;
            if self.peek() == Some(b':') {
                self.pos += 1;
                secs += self.number(2)?;
            }
        }
        let secs = i32::try_from(secs).map_err(|_| ClockError::InvalidConfiguration)?;
        Ok(sign * secs)
    }

    /// POSIX offset: positive means west of Greenwich.
    fn offset(&mut self) -> Result<i32, ClockError> {
        let secs = self.signed_hms(2)?;
        if secs.abs() > 24 * SECS_PER_HOUR {
            return Err(ClockError::InvalidConfiguration);
        }
        Ok(secs)
    }

    fn transition(&mut self) -> Result<Transition, ClockError> {
        let date = match self.peek() {
            Some(b'M') => {
                self.pos += 1;
                let month = self.number(2)?;
                self.expect(b'.')?;
                let week = self.number(1)?;
                self.expect(b'.')?;
                let weekday = self.number(1)?;
                if !(1..=12).contains(&month) || !(1..=5).contains(&week) || weekday > 6 {
                    return Err(ClockError::InvalidConfiguration);
                }
                RuleDate::Month {
                    month: month as u8,
                    week: week as u8,
                    weekday: weekday as u8,
                }
            }
            Some(b'J') => {
                self.pos += 1;
                let day = self.number(3)?;
                if !(1..=365).contains(&day) {
                    return Err(ClockError::InvalidConfiguration);
                }
                RuleDate::JulianNoLeap(day as u16)
            }
            _ => {
                let day = self.number(3)?;
                if day > 365 {
                    return Err(ClockError::InvalidConfiguration);
                }
                RuleDate::ZeroBased(day as u16)
            }
        };

        let time_secs = if self.peek() == Some(b'/') {
            self.pos += 1;
            let secs = self.signed_hms(3)?;
            if secs.abs() > 167 * SECS_PER_HOUR {
                return Err(ClockError::InvalidConfiguration);
            }
            secs
        } else {
            DEFAULT_TRANSITION_SECS
        };

        Ok(Transition { date, time_secs })
    }
}
