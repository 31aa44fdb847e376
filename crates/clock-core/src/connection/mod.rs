//! WiFi association lifecycle: connect, bounded automatic retry, scanning.
//!
//! The radio driver runs outside the main loop and reports what happened
//! through a [`RadioEvents`] mailbox. [`ConnectionManager`] drains that
//! mailbox from the main loop and is the only place that mutates
//! [`ConnectionState`].

mod scan;

pub use scan::{collect_networks, signal_bars};

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::{debug, info, warn};

use crate::{error::ClockError, mailbox::EventMailbox, settings::Ssid, timing::MonotonicClock};

pub const WIFI_MAX_RETRY: u8 = 5;
pub const WIFI_CONNECT_TIMEOUT_MS: u64 = 15_000;
pub const MAX_SCAN_RESULTS: usize = 15;
/// Access points accepted from one raw radio scan before de-duplication.
pub const RAW_SCAN_CAPACITY: usize = 32;
pub const RADIO_EVENT_QUEUE: usize = 8;

const BLOCKING_POLL_MS: u32 = 10;
const SCAN_TIMEOUT_MS: u64 = 10_000;

/// Asynchronous notifications from the radio driver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RadioEvent {
    StaStarted,
    Disconnected,
    GotAddress,
}

pub type RadioEvents = EventMailbox<RadioEvent, RADIO_EVENT_QUEUE>;

/// One access point as shown in the setup list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Network {
    pub ssid: Ssid,
    pub rssi: i8,
    pub secured: bool,
}

/// Radio driver requests. All calls return immediately; outcomes arrive as
/// [`RadioEvent`]s or through [`WifiRadio::poll_scan`].
pub trait WifiRadio {
    type Error: core::fmt::Debug;

    fn start(&mut self) -> Result<(), Self::Error>;
    fn configure(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error>;
    fn connect(&mut self) -> Result<(), Self::Error>;
    fn disconnect(&mut self) -> Result<(), Self::Error>;
    fn start_scan(&mut self) -> Result<(), Self::Error>;
    /// Copies finished results into `out`; `Ok(false)` while still scanning.
    fn poll_scan(&mut self, out: &mut Vec<Network, RAW_SCAN_CAPACITY>)
    -> Result<bool, Self::Error>;
}

/// Snapshot of the association bookkeeping.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConnectionState {
    pub associated: bool,
    pub retry_count: u8,
    pub last_error: Option<ClockError>,
}

/// Progress of a cooperative connect attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectPoll {
    Pending,
    Connected,
    Failed(ClockError),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Session {
    Idle,
    Connecting { started_ms: u64 },
    Associated,
    Failed,
}

impl Session {
    const fn retries_enabled(self) -> bool {
        matches!(self, Self::Connecting { .. } | Self::Associated)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ScanPhase {
    Idle,
    Running { started_ms: u64 },
    Failed,
}

pub struct ConnectionManager<'a, R>
where
    R: WifiRadio,
{
    radio: R,
    events: &'a RadioEvents,
    state: ConnectionState,
    session: Session,
    initialized: bool,
    connected_signal: bool,
    failed_signal: bool,
    scan_phase: ScanPhase,
    raw_scan: Vec<Network, RAW_SCAN_CAPACITY>,
}

impl<'a, R> ConnectionManager<'a, R>
where
    R: WifiRadio,
{
    pub fn new(radio: R, events: &'a RadioEvents) -> Self {
        Self {
            radio,
            events,
            state: ConnectionState::default(),
            session: Session::Idle,
            initialized: false,
            connected_signal: false,
            failed_signal: false,
            scan_phase: ScanPhase::Idle,
            raw_scan: Vec::new(),
        }
    }

    /// Bring the radio up. Only the first successful call does anything.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        match self.radio.start() {
            Ok(()) => {
                self.initialized = true;
                info!("wifi: station initialized");
            }
            Err(err) => warn!("wifi: start failed: {:?}", err),
        }
    }

    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub const fn snapshot(&self) -> ConnectionState {
        self.state
    }

    pub const fn is_associated(&self) -> bool {
        self.state.associated
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Drain radio events and apply the reconnection policy. Call once per
    /// loop iteration regardless of the active mode.
    pub fn service(&mut self) {
        while let Some(event) = self.events.take() {
            self.apply_event(event);
        }
    }

    /// Start a cooperative connect attempt; finish it with
    /// [`Self::poll_connect`].
    pub fn begin_connect(&mut self, ssid: &str, password: &str, now_ms: u64) {
        self.initialize();
        info!("wifi: connecting to {}", ssid);

        self.state.retry_count = 0;
        self.state.last_error = None;
        self.state.associated = false;
        self.connected_signal = false;
        self.failed_signal = false;
        self.events.clear();
        self.session = Session::Connecting { started_ms: now_ms };

        if let Err(err) = self.radio.disconnect() {
            debug!("wifi: disconnect before connect failed: {:?}", err);
        }
        if let Err(err) = self.radio.configure(ssid, password) {
            warn!("wifi: configure failed: {:?}", err);
            self.fail_session(ClockError::InvalidConfiguration);
            return;
        }
        self.request_association();
    }

    pub fn poll_connect(&mut self, now_ms: u64) -> ConnectPoll {
        self.service();

        if self.connected_signal {
            return ConnectPoll::Connected;
        }

        match self.session {
            Session::Connecting { started_ms } => {
                if now_ms.saturating_sub(started_ms) >= WIFI_CONNECT_TIMEOUT_MS {
                    warn!(
                        "wifi: no address after {}ms, giving up",
                        WIFI_CONNECT_TIMEOUT_MS
                    );
                    self.fail_session(ClockError::ConnectionTimeout);
                    self.release_radio();
                    ConnectPoll::Failed(ClockError::ConnectionTimeout)
                } else {
                    ConnectPoll::Pending
                }
            }
            Session::Associated => ConnectPoll::Connected,
            Session::Failed | Session::Idle => {
                let error = self
                    .state
                    .last_error
                    .unwrap_or(ClockError::InvalidConfiguration);
                if self.failed_signal {
                    self.failed_signal = false;
                    self.release_radio();
                }
                ConnectPoll::Failed(error)
            }
        }
    }

    /// Blocking connect with the fixed timeout. Returns `true` only if an
    /// address was acquired in time.
    pub fn connect<C, D>(&mut self, ssid: &str, password: &str, clock: &C, delay: &mut D) -> bool
    where
        C: MonotonicClock,
        D: DelayNs,
    {
        self.begin_connect(ssid, password, clock.now_ms());
        loop {
            match self.poll_connect(clock.now_ms()) {
                ConnectPoll::Pending => delay.delay_ms(BLOCKING_POLL_MS),
                ConnectPoll::Connected => {
                    info!("wifi: connected to {}", ssid);
                    return true;
                }
                ConnectPoll::Failed(err) => {
                    warn!("wifi: failed to connect to {}: {}", ssid, err);
                    return false;
                }
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.session = Session::Idle;
        self.state.associated = false;
        self.connected_signal = false;
        self.release_radio();
    }

    /// Kick off an active scan; collect with [`Self::poll_scan`].
    pub fn begin_scan(&mut self, now_ms: u64) {
        self.initialize();
        self.raw_scan.clear();
        self.scan_phase = match self.radio.start_scan() {
            Ok(()) => {
                info!("wifi: starting scan");
                ScanPhase::Running { started_ms: now_ms }
            }
            Err(err) => {
                warn!("wifi: scan request failed: {:?}", err);
                ScanPhase::Failed
            }
        };
    }

    /// `None` while the scan is running. Failures and timeouts resolve to an
    /// empty list.
    pub fn poll_scan(&mut self, now_ms: u64) -> Option<Vec<Network, MAX_SCAN_RESULTS>> {
        match self.scan_phase {
            ScanPhase::Running { started_ms } => match self.radio.poll_scan(&mut self.raw_scan) {
                Ok(false) if now_ms.saturating_sub(started_ms) < SCAN_TIMEOUT_MS => None,
                Ok(false) => {
                    warn!("wifi: scan did not finish within {}ms", SCAN_TIMEOUT_MS);
                    Some(self.finish_scan(false))
                }
                Ok(true) => Some(self.finish_scan(true)),
                Err(err) => {
                    warn!("wifi: scan failed: {:?}", err);
                    Some(self.finish_scan(false))
                }
            },
            ScanPhase::Failed | ScanPhase::Idle => Some(self.finish_scan(false)),
        }
    }

    /// Blocking scan returning de-duplicated networks.
    pub fn scan<C, D>(&mut self, clock: &C, delay: &mut D) -> Vec<Network, MAX_SCAN_RESULTS>
    where
        C: MonotonicClock,
        D: DelayNs,
    {
        self.begin_scan(clock.now_ms());
        loop {
            if let Some(networks) = self.poll_scan(clock.now_ms()) {
                return networks;
            }
            delay.delay_ms(BLOCKING_POLL_MS);
        }
    }

    fn finish_scan(&mut self, completed: bool) -> Vec<Network, MAX_SCAN_RESULTS> {
        self.scan_phase = ScanPhase::Idle;
        let networks = if completed {
            collect_networks(&self.raw_scan)
        } else {
            Vec::new()
        };
        self.raw_scan.clear();

        if networks.is_empty() {
            info!("wifi: {}", ClockError::ScanEmpty);
        } else {
            info!("wifi: found {} networks", networks.len());
        }
        networks
    }

    fn apply_event(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::StaStarted => debug!("wifi: station started"),
            RadioEvent::Disconnected => {
                self.state.associated = false;
                self.connected_signal = false;
                if !self.session.retries_enabled() {
                    debug!("wifi: disconnected (no active session)");
                    return;
                }
                info!("wifi: disconnected");
                if self.consume_retry() {
                    self.request_association();
                }
            }
            RadioEvent::GotAddress => {
                info!("wifi: got address");
                self.state.retry_count = 0;
                self.state.associated = true;
                self.state.last_error = None;
                self.connected_signal = true;
                self.failed_signal = false;
                self.session = Session::Associated;
            }
        }
    }

    fn consume_retry(&mut self) -> bool {
        if self.state.retry_count < WIFI_MAX_RETRY {
            self.state.retry_count += 1;
            info!(
                "wifi: retrying connection ({}/{})",
                self.state.retry_count, WIFI_MAX_RETRY
            );
            true
        } else {
            self.fail_session(ClockError::ConnectionRetriesExhausted);
            false
        }
    }

    fn request_association(&mut self) {
        while let Err(err) = self.radio.connect() {
            warn!("wifi: connect request rejected: {:?}", err);
            if !self.consume_retry() {
                return;
            }
        }
    }

    fn fail_session(&mut self, error: ClockError) {
        self.session = Session::Failed;
        self.state.associated = false;
        self.state.last_error = Some(error);
        self.connected_signal = false;
        self.failed_signal = true;
    }

    fn release_radio(&mut self) {
        if let Err(err) = self.radio.disconnect() {
            debug!("wifi: disconnect failed: {:?}", err);
        }
    }
}

#[cfg(test)]
mod tests;
