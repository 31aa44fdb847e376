use core::cell::Cell;

use embedded_hal::delay::DelayNs;

use super::*;
use crate::settings::truncated;

#[derive(Default)]
struct FakeRadio {
    starts: u32,
    connects: u32,
    disconnects: u32,
    configured: Option<(std::string::String, std::string::String)>,
    reject_connect: bool,
    scan_polls_until_done: u32,
    scan_results: std::vec::Vec<Network>,
}

impl WifiRadio for FakeRadio {
    type Error = &'static str;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.starts += 1;
        Ok(())
    }

    fn configure(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error> {
        self.configured = Some((ssid.into(), password.into()));
        Ok(())
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        self.connects += 1;
        if self.reject_connect {
            Err("busy")
        } else {
            Ok(())
        }
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        self.disconnects += 1;
        Ok(())
    }

    fn start_scan(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn poll_scan(
        &mut self,
        out: &mut Vec<Network, RAW_SCAN_CAPACITY>,
    ) -> Result<bool, Self::Error> {
        if self.scan_polls_until_done > 0 {
            self.scan_polls_until_done -= 1;
            return Ok(false);
        }
        for network in &self.scan_results {
            let _ = out.push(network.clone());
        }
        Ok(true)
    }
}

struct VirtualClock<'a>(&'a Cell<u64>);

impl MonotonicClock for VirtualClock<'_> {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

struct VirtualDelay<'a> {
    time: &'a Cell<u64>,
    events: &'a RadioEvents,
    address_at_ms: Option<u64>,
}

impl DelayNs for VirtualDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.time.set(self.time.get() + u64::from(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.time.set(self.time.get() + u64::from(ms));
        if let Some(at) = self.address_at_ms
            && self.time.get() >= at
        {
            self.address_at_ms = None;
            self.events.post(RadioEvent::GotAddress);
        }
    }
}

fn ap(ssid: &str, rssi: i8, secured: bool) -> Network {
    Network {
        ssid: truncated(ssid),
        rssi,
        secured,
    }
}

#[test]
fn initialize_starts_radio_once() {
    let events = RadioEvents::new();
    let mut manager = ConnectionManager::new(FakeRadio::default(), &events);
    manager.initialize();
    manager.initialize();
    manager.begin_scan(0);
    assert_eq!(manager.radio().starts, 1);
    assert!(manager.is_initialized());
}

#[test]
fn consecutive_disconnects_retry_up_to_cap_then_fail() {
    let events = RadioEvents::new();
    let mut manager = ConnectionManager::new(FakeRadio::default(), &events);
    manager.begin_connect("home", "secret", 0);
    assert_eq!(manager.radio().connects, 1);
    assert_eq!(
        manager.radio().configured,
        Some(("home".into(), "secret".into()))
    );

    let mut previous = 0;
    for expected in 1..=WIFI_MAX_RETRY {
        events.post(RadioEvent::Disconnected);
        assert_eq!(manager.poll_connect(100), ConnectPoll::Pending);
        let retry = manager.snapshot().retry_count;
        assert!(retry >= previous);
        assert_eq!(retry, expected);
        previous = retry;
    }
    assert_eq!(manager.radio().connects, 1 + u32::from(WIFI_MAX_RETRY));

    events.post(RadioEvent::Disconnected);
    assert_eq!(
        manager.poll_connect(200),
        ConnectPoll::Failed(ClockError::ConnectionRetriesExhausted)
    );
    let state = manager.snapshot();
    assert_eq!(state.retry_count, WIFI_MAX_RETRY);
    assert_eq!(state.last_error, Some(ClockError::ConnectionRetriesExhausted));

    events.post(RadioEvent::Disconnected);
    manager.service();
    assert_eq!(manager.radio().connects, 1 + u32::from(WIFI_MAX_RETRY));
}

#[test]
fn address_resets_retry_counter() {
    let events = RadioEvents::new();
    let mut manager = ConnectionManager::new(FakeRadio::default(), &events);
    manager.begin_connect("home", "secret", 0);
    events.post(RadioEvent::Disconnected);
    events.post(RadioEvent::Disconnected);
    events.post(RadioEvent::GotAddress);

    assert_eq!(manager.poll_connect(10), ConnectPoll::Connected);
    let state = manager.snapshot();
    assert!(state.associated);
    assert_eq!(state.retry_count, 0);
    assert_eq!(state.last_error, None);
}

#[test]
fn associated_session_reconnects_after_drop() {
    let events = RadioEvents::new();
    let mut manager = ConnectionManager::new(FakeRadio::default(), &events);
    manager.begin_connect("home", "secret", 0);
    events.post(RadioEvent::GotAddress);
    manager.service();
    let connects = manager.radio().connects;

    events.post(RadioEvent::Disconnected);
    manager.service();
    assert!(!manager.is_associated());
    assert_eq!(manager.radio().connects, connects + 1);
    assert_eq!(manager.snapshot().retry_count, 1);
}

#[test]
fn blocking_connect_times_out_and_disassociates() {
    let time = Cell::new(0);
    let events = RadioEvents::new();
    let mut manager = ConnectionManager::new(FakeRadio::default(), &events);
    let mut delay = VirtualDelay {
        time: &time,
        events: &events,
        address_at_ms: None,
    };

    assert!(!manager.connect("home", "wrong", &VirtualClock(&time), &mut delay));
    assert!(time.get() >= WIFI_CONNECT_TIMEOUT_MS);
    assert!(time.get() < WIFI_CONNECT_TIMEOUT_MS + 100);
    assert!(!manager.is_associated());
    assert_eq!(
        manager.snapshot().last_error,
        Some(ClockError::ConnectionTimeout)
    );
    // One disconnect before configuring, one after giving up.
    assert_eq!(manager.radio().disconnects, 2);

    // Late drops after the attempt ended are not retried.
    events.post(RadioEvent::Disconnected);
    manager.service();
    assert_eq!(manager.radio().connects, 1);
}

#[test]
fn blocking_connect_succeeds_when_address_arrives_in_time() {
    let time = Cell::new(0);
    let events = RadioEvents::new();
    let mut manager = ConnectionManager::new(FakeRadio::default(), &events);
    let mut delay = VirtualDelay {
        time: &time,
        events: &events,
        address_at_ms: Some(3_000),
    };

    assert!(manager.connect("home", "secret", &VirtualClock(&time), &mut delay));
    assert!(manager.is_associated());
    assert!(time.get() < WIFI_CONNECT_TIMEOUT_MS);
}

#[test]
fn stale_events_are_discarded_by_new_request() {
    let events = RadioEvents::new();
    let mut manager = ConnectionManager::new(FakeRadio::default(), &events);
    events.post(RadioEvent::GotAddress);
    manager.begin_connect("home", "secret", 0);
    assert_eq!(manager.poll_connect(1), ConnectPoll::Pending);
}

#[test]
fn rejected_connect_requests_consume_retries() {
    let events = RadioEvents::new();
    let radio = FakeRadio {
        reject_connect: true,
        ..FakeRadio::default()
    };
    let mut manager = ConnectionManager::new(radio, &events);
    manager.begin_connect("home", "secret", 0);
    assert_eq!(
        manager.poll_connect(1),
        ConnectPoll::Failed(ClockError::ConnectionRetriesExhausted)
    );
    assert_eq!(manager.radio().connects, 1 + u32::from(WIFI_MAX_RETRY));
}

#[test]
fn blocking_scan_deduplicates_results() {
    let time = Cell::new(0);
    let events = RadioEvents::new();
    let radio = FakeRadio {
        scan_polls_until_done: 3,
        scan_results: vec![
            ap("home", -42, true),
            ap("", -30, false),
            ap("cafe", -71, false),
            ap("home", -80, true),
        ],
        ..FakeRadio::default()
    };
    let mut manager = ConnectionManager::new(radio, &events);
    let mut delay = VirtualDelay {
        time: &time,
        events: &events,
        address_at_ms: None,
    };

    let networks = manager.scan(&VirtualClock(&time), &mut delay);
    assert_eq!(networks.len(), 2);
    assert_eq!(networks[0], ap("home", -42, true));
    assert!(!networks[1].secured);
    assert_eq!(time.get(), 30);
}

#[test]
fn empty_scan_yields_empty_list() {
    let events = RadioEvents::new();
    let mut manager = ConnectionManager::new(FakeRadio::default(), &events);
    manager.begin_scan(0);
    let networks = manager.poll_scan(5);
    assert_eq!(networks.map(|list| list.len()), Some(0));
}
