//! Periodic wall-clock synchronization over NTP.
//!
//! The network side lives behind [`SntpClient`]. Whatever task performs the
//! round trips reports completions through the shared [`SyncStatus`]; the
//! [`TimeSyncManager`] owns the configuration and answers status queries.

mod schedule;

pub use schedule::{
    SYNC_BACKOFF_BASE_SECS, SYNC_BACKOFF_MAX_SECS, SyncCycle, SyncOutcome, SyncSchedule,
};

use core::cell::Cell;

use critical_section::Mutex;
use log::{debug, info, warn};

use crate::{
    error::ClockError,
    settings::{NTP_DEFAULT_INTERVAL_SECS, NTP_MIN_INTERVAL_SECS, NtpServer, truncated},
};

pub const SERVER_UNSET_LABEL: &str = "N/A";

/// Completion bookkeeping written by the sync task.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SyncRecord {
    pub synced: bool,
    pub last_sync_unix: Option<i64>,
    pub sync_count: u32,
    pub sync_started_at_ms: Option<u64>,
}

/// Interrupt-safe cell holding the current [`SyncRecord`].
pub struct SyncStatus {
    record: Mutex<Cell<SyncRecord>>,
}

impl SyncStatus {
    pub const fn new() -> Self {
        Self {
            record: Mutex::new(Cell::new(SyncRecord {
                synced: false,
                last_sync_unix: None,
                sync_count: 0,
                sync_started_at_ms: None,
            })),
        }
    }

    pub fn snapshot(&self) -> SyncRecord {
        critical_section::with(|cs| self.record.borrow(cs).get())
    }

    /// Completion callback: one call per finished round trip.
    pub fn record_sync(&self, unix_secs: i64) {
        self.update(|record| {
            record.synced = true;
            record.last_sync_unix = Some(unix_secs);
            record.sync_count = record.sync_count.saturating_add(1);
            record.sync_started_at_ms = None;
        });
        info!("ntp: time synchronized ({})", unix_secs);
    }

    pub fn mark_unsynced(&self) {
        self.update(|record| record.synced = false);
    }

    fn mark_started(&self, now_ms: u64) {
        self.update(|record| {
            if !record.synced {
                record.sync_started_at_ms = Some(now_ms);
            }
        });
    }

    fn update(&self, f: impl FnOnce(&mut SyncRecord)) {
        critical_section::with(|cs| {
            let cell = self.record.borrow(cs);
            let mut record = cell.get();
            f(&mut record);
            cell.set(record);
        });
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Client that performs NTP round trips on its own schedule.
pub trait SntpClient {
    type Error: core::fmt::Debug;

    fn start(&mut self, server: &str, interval_ms: u64) -> Result<(), Self::Error>;
    fn stop(&mut self) -> Result<(), Self::Error>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncStats {
    pub synced: bool,
    pub last_sync_unix: Option<i64>,
    pub sync_count: u32,
    pub interval_secs: u32,
    pub server: NtpServer,
    /// Time spent waiting for the first completion of the current cycle.
    pub elapsed_ms: u64,
}

impl SyncStats {
    pub fn secs_since_last_sync(&self, now_unix: i64) -> Option<i64> {
        self.last_sync_unix.map(|last| (now_unix - last).max(0))
    }

    pub fn secs_until_next_sync(&self, now_unix: i64) -> Option<i64> {
        self.last_sync_unix
            .map(|last| (last + i64::from(self.interval_secs) - now_unix).max(0))
    }
}

pub const fn clamp_interval(secs: u32) -> u32 {
    if secs < NTP_MIN_INTERVAL_SECS {
        NTP_MIN_INTERVAL_SECS
    } else {
        secs
    }
}

pub struct TimeSyncManager<'a, C>
where
    C: SntpClient,
{
    client: C,
    status: &'a SyncStatus,
    interval_secs: u32,
    server: NtpServer,
    running: bool,
}

impl<'a, C> TimeSyncManager<'a, C>
where
    C: SntpClient,
{
    pub fn new(client: C, status: &'a SyncStatus) -> Self {
        Self {
            client,
            status,
            interval_secs: NTP_DEFAULT_INTERVAL_SECS,
            server: NtpServer::new(),
            running: false,
        }
    }

    /// (Re)start periodic sync against `server`.
    pub fn start(&mut self, server: &str, interval_secs: u32, now_ms: u64) {
        self.stop_client();
        self.server = truncated(server);
        self.interval_secs = Self::checked_interval(interval_secs);
        self.launch(now_ms);
    }

    pub fn set_interval(&mut self, secs: u32, now_ms: u64) {
        self.interval_secs = Self::checked_interval(secs);
        if self.running {
            self.stop_client();
            self.launch(now_ms);
        }
    }

    /// Takes effect on the next start or forced sync.
    pub fn set_server(&mut self, server: &str) {
        self.server = truncated(server);
    }

    /// Drop the synced flag and begin a fresh cycle right away.
    pub fn force_sync(&mut self, now_ms: u64) {
        if !self.running {
            debug!("ntp: force sync ignored, sync not started");
            return;
        }
        info!("ntp: forcing resync");
        self.status.mark_unsynced();
        self.stop_client();
        self.launch(now_ms);
    }

    pub fn stats(&self, now_ms: u64) -> SyncStats {
        let record = self.status.snapshot();
        let elapsed_ms = match (record.synced, record.sync_started_at_ms) {
            (false, Some(started)) => now_ms.saturating_sub(started),
            _ => 0,
        };
        let server = if self.server.is_empty() {
            truncated(SERVER_UNSET_LABEL)
        } else {
            self.server.clone()
        };

        SyncStats {
            synced: record.synced,
            last_sync_unix: record.last_sync_unix,
            sync_count: record.sync_count,
            interval_secs: self.interval_secs,
            server,
            elapsed_ms,
        }
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub fn server(&self) -> &str {
        self.server.as_str()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn checked_interval(secs: u32) -> u32 {
        let clamped = clamp_interval(secs);
        if clamped != secs {
            debug!(
                "ntp: interval {}s raised to {}s ({})",
                secs,
                clamped,
                ClockError::InvalidConfiguration
            );
        }
        clamped
    }

    fn launch(&mut self, now_ms: u64) {
        self.status.mark_started(now_ms);
        let interval_ms = u64::from(self.interval_secs) * 1_000;
        match self.client.start(self.server.as_str(), interval_ms) {
            Ok(()) => {
                self.running = true;
                info!(
                    "ntp: syncing with {} every {}s",
                    self.server, self.interval_secs
                );
            }
            Err(err) => {
                self.running = false;
                warn!("ntp: client start failed: {:?}", err);
            }
        }
    }

    fn stop_client(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Err(err) = self.client.stop() {
            debug!("ntp: client stop failed: {:?}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSntp {
        starts: std::vec::Vec<(std::string::String, u64)>,
        stops: u32,
    }

    impl SntpClient for FakeSntp {
        type Error = ();

        fn start(&mut self, server: &str, interval_ms: u64) -> Result<(), Self::Error> {
            self.starts.push((server.into(), interval_ms));
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Self::Error> {
            self.stops += 1;
            Ok(())
        }
    }

    #[test]
    fn interval_is_floored() {
        let status = SyncStatus::new();
        let mut sync = TimeSyncManager::new(FakeSntp::default(), &status);
        for (requested, stored) in [(0, 15), (14, 15), (15, 15), (3_600, 3_600)] {
            sync.set_interval(requested, 0);
            assert_eq!(sync.interval_secs(), stored);
        }
        assert!(sync.client().starts.is_empty());
    }

    #[test]
    fn set_interval_restarts_running_schedule() {
        let status = SyncStatus::new();
        let mut sync = TimeSyncManager::new(FakeSntp::default(), &status);
        sync.start("pool.ntp.org", 86_400, 0);
        sync.set_interval(3_600, 10);
        assert_eq!(sync.client().stops, 1);
        assert_eq!(
            sync.client().starts.last(),
            Some(&("pool.ntp.org".into(), 3_600_000))
        );
    }

    #[test]
    fn force_sync_resets_synced_until_next_completion() {
        let status = SyncStatus::new();
        let mut sync = TimeSyncManager::new(FakeSntp::default(), &status);
        sync.start("pool.ntp.org", 60, 0);
        status.record_sync(1_750_000_000);
        let before = sync.stats(1_000);
        assert!(before.synced);
        assert_eq!(before.elapsed_ms, 0);

        sync.force_sync(2_000);
        let during = sync.stats(2_500);
        assert!(!during.synced);
        assert_eq!(during.elapsed_ms, 500);

        status.record_sync(1_750_000_100);
        let after = sync.stats(3_000);
        assert!(after.synced);
        assert_eq!(after.sync_count, before.sync_count + 1);
        assert_eq!(status.snapshot().sync_started_at_ms, None);
    }

    #[test]
    fn force_sync_without_schedule_is_ignored() {
        let status = SyncStatus::new();
        status.record_sync(1);
        let mut sync = TimeSyncManager::new(FakeSntp::default(), &status);
        sync.force_sync(5);
        assert!(status.snapshot().synced);
        assert!(sync.client().starts.is_empty());
    }

    #[test]
    fn set_server_applies_on_next_cycle() {
        let status = SyncStatus::new();
        let mut sync = TimeSyncManager::new(FakeSntp::default(), &status);
        sync.start("pool.ntp.org", 600, 0);
        sync.set_server("time.example.net");
        assert_eq!(sync.client().starts.len(), 1);
        sync.force_sync(1);
        assert_eq!(
            sync.client().starts.last().map(|(server, _)| server.as_str()),
            Some("time.example.net")
        );
    }

    #[test]
    fn stats_label_missing_server() {
        let status = SyncStatus::new();
        let sync = TimeSyncManager::new(FakeSntp::default(), &status);
        assert_eq!(sync.stats(0).server.as_str(), SERVER_UNSET_LABEL);
    }

    #[test]
    fn stats_derive_last_and_next_sync() {
        let status = SyncStatus::new();
        let mut sync = TimeSyncManager::new(FakeSntp::default(), &status);
        sync.start("pool.ntp.org", 3_600, 0);
        status.record_sync(10_000);
        let stats = sync.stats(0);
        assert_eq!(stats.secs_since_last_sync(10_090), Some(90));
        assert_eq!(stats.secs_until_next_sync(10_090), Some(3_510));
        assert_eq!(stats.secs_until_next_sync(20_000), Some(0));
    }
}
