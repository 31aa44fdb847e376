use core::fmt::Write;

use crate::{
    input::{TapFilter, TouchSample},
    render::{ClockFace, StatusLine},
    sync::SyncStats,
    timing::Now,
};

use super::{ModeResult, Screen, ScreenContext};

/// Local years before this mean the wall clock was never set.
pub const MIN_VALID_YEAR: i32 = 2025;

#[derive(Debug, Default)]
pub struct ClockScreen {
    taps: TapFilter,
    led_level: u8,
    indicator_on: Option<bool>,
    shown_second: Option<i64>,
    face: ClockFace,
    redraw: bool,
}

impl ClockScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn face(&self) -> &ClockFace {
        &self.face
    }

    fn refresh<C: ScreenContext>(&mut self, ctx: &mut C, now: Now) {
        let unix_secs = now.unix_secs();
        let local = ctx.local_time(unix_secs);
        let valid = local.year >= MIN_VALID_YEAR;
        let colon = valid && local.second % 2 == 0;

        if self.indicator_on != Some(colon) {
            ctx.set_indicator(if colon { self.led_level } else { 0 });
            self.indicator_on = Some(colon);
        }

        let stats = ctx.sync_stats(now.monotonic_ms);
        self.face.time = valid.then_some(local);
        self.face.colon_visible = colon;
        self.face.synced = stats.synced;
        format_status_lines(&mut self.face, &stats, unix_secs);

        self.shown_second = Some(unix_secs);
        self.redraw = true;
    }
}

impl Screen for ClockScreen {
    fn init<C: ScreenContext>(&mut self, ctx: &mut C, now: Now) {
        self.led_level = ctx.settings().led_brightness;
        self.taps.reset_edge(true);
        self.indicator_on = None;
        self.shown_second = None;
        self.refresh(ctx, now);
    }

    fn update<C: ScreenContext>(
        &mut self,
        ctx: &mut C,
        touch: TouchSample,
        now: Now,
    ) -> ModeResult {
        let tapped = self.taps.accept(touch, now.monotonic_ms).is_some();
        if ctx.settings_button_pressed() || tapped {
            ctx.set_indicator(0);
            return ModeResult::OpenSettings;
        }

        if self.shown_second != Some(now.unix_secs()) {
            self.refresh(ctx, now);
        }
        ModeResult::Continue
    }

    fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}

fn format_status_lines(face: &mut ClockFace, stats: &SyncStats, now_unix: i64) {
    face.status.clear();
    face.detail.clear();
    face.next_sync.clear();

    if !stats.synced {
        let _ = write!(face.status, "Syncing: {}", stats.server);
        let _ = write!(face.detail, "Waiting: {}s", stats.elapsed_ms / 1_000);
        return;
    }

    let _ = write!(face.status, "NTP: {}", stats.server);
    if let Some(since) = stats.secs_since_last_sync(now_unix) {
        write_last_sync(&mut face.detail, since, stats.sync_count);
    }
    match stats.secs_until_next_sync(now_unix) {
        Some(until) if until > 0 && until < 60 => {
            let _ = write!(face.next_sync, "Next sync: {}s", until);
        }
        Some(until) if until > 0 => {
            let _ = write!(face.next_sync, "Next sync: {}m {}s", until / 60, until % 60);
        }
        _ => {
            let _ = face.next_sync.push_str("Sync pending...");
        }
    }
}

fn write_last_sync(line: &mut StatusLine, since: i64, count: u32) {
    let _ = if since < 60 {
        write!(line, "Last: {}s ago  Syncs: {}", since, count)
    } else if since < 3_600 {
        write!(line, "Last: {}m ago  Syncs: {}", since / 60, count)
    } else {
        write!(
            line,
            "Last: {}h {}m ago  Syncs: {}",
            since / 3_600,
            since % 3_600 / 60,
            count
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::truncated;

    fn stats(synced: bool, last: Option<i64>, elapsed_ms: u64) -> SyncStats {
        SyncStats {
            synced,
            last_sync_unix: last,
            sync_count: 3,
            interval_secs: 3_600,
            server: truncated("pool.ntp.org"),
            elapsed_ms,
        }
    }

    #[test]
    fn unsynced_lines_show_wait_time() {
        let mut face = ClockFace::default();
        format_status_lines(&mut face, &stats(false, None, 7_900), 0);
        assert_eq!(face.status.as_str(), "Syncing: pool.ntp.org");
        assert_eq!(face.detail.as_str(), "Waiting: 7s");
        assert_eq!(face.next_sync.as_str(), "");
    }

    #[test]
    fn synced_lines_scale_units() {
        let mut face = ClockFace::default();
        format_status_lines(&mut face, &stats(true, Some(1_000), 0), 1_042);
        assert_eq!(face.status.as_str(), "NTP: pool.ntp.org");
        assert_eq!(face.detail.as_str(), "Last: 42s ago  Syncs: 3");
        assert_eq!(face.next_sync.as_str(), "Next sync: 59m 18s");

        format_status_lines(&mut face, &stats(true, Some(1_000), 0), 1_000 + 125);
        assert_eq!(face.detail.as_str(), "Last: 2m ago  Syncs: 3");

        format_status_lines(&mut face, &stats(true, Some(1_000), 0), 1_000 + 3_600 + 61);
        assert_eq!(face.detail.as_str(), "Last: 1h 1m ago  Syncs: 3");
        assert_eq!(face.next_sync.as_str(), "Sync pending...");

        format_status_lines(&mut face, &stats(true, Some(1_000), 0), 1_000 + 3_570);
        assert_eq!(face.next_sync.as_str(), "Next sync: 30s");
    }
}
