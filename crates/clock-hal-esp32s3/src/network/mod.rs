//! Shared state between the UI loop and the async radio/SNTP workers.
//!
//! The UI side never awaits: it queues [`RadioCommand`]s and polls result
//! slots. The workers own the driver and the network stack and report
//! association edges back through the core's `RadioEvents` mailbox.

pub mod sntp;
pub mod worker;

use core::cell::RefCell;

use clock_core::{
    connection::{Network, RAW_SCAN_CAPACITY, WifiRadio},
    mailbox::EventMailbox,
    settings::{Password, Ssid, truncated},
};
use critical_section::Mutex;
use heapless::Vec;
use log::warn;

const RADIO_COMMAND_QUEUE: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RadioCommand {
    Start,
    Configure,
    Connect,
    Disconnect,
    Scan,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkError {
    ScanFailed,
}

#[derive(Clone, Debug, Default)]
enum ScanSlot {
    #[default]
    Idle,
    Pending,
    Done(Vec<Network, RAW_SCAN_CAPACITY>),
    Failed,
}

#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub ssid: Ssid,
    pub password: Password,
}

pub struct RadioLink {
    commands: EventMailbox<RadioCommand, RADIO_COMMAND_QUEUE>,
    credentials: Mutex<RefCell<Credentials>>,
    scan: Mutex<RefCell<ScanSlot>>,
}

impl RadioLink {
    pub const fn new() -> Self {
        Self {
            commands: EventMailbox::new(),
            credentials: Mutex::new(RefCell::new(Credentials {
                ssid: Ssid::new(),
                password: Password::new(),
            })),
            scan: Mutex::new(RefCell::new(ScanSlot::Idle)),
        }
    }

    pub fn client(&self) -> RadioLinkClient<'_> {
        RadioLinkClient { link: self }
    }

    /// Always queues `command`. On overflow the oldest pending command is
    /// dropped, so the newest request still reaches the worker.
    fn post(&self, command: RadioCommand) -> Result<(), LinkError> {
        if !self.commands.post(command) {
            warn!("wifi: command queue full, dropped oldest before {:?}", command);
        }
        Ok(())
    }

    pub(crate) fn take_command(&self) -> Option<RadioCommand> {
        self.commands.take()
    }

    pub(crate) fn credentials(&self) -> Credentials {
        critical_section::with(|cs| self.credentials.borrow_ref(cs).clone())
    }

    pub(crate) fn finish_scan(&self, result: Option<Vec<Network, RAW_SCAN_CAPACITY>>) {
        critical_section::with(|cs| {
            *self.scan.borrow_ref_mut(cs) = match result {
                Some(networks) => ScanSlot::Done(networks),
                None => ScanSlot::Failed,
            };
        });
    }
}

impl Default for RadioLink {
    fn default() -> Self {
        Self::new()
    }
}

/// [`WifiRadio`] handle given to the connection manager.
pub struct RadioLinkClient<'a> {
    link: &'a RadioLink,
}

impl WifiRadio for RadioLinkClient<'_> {
    type Error = LinkError;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.link.post(RadioCommand::Start)
    }

    fn configure(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error> {
        critical_section::with(|cs| {
            *self.link.credentials.borrow_ref_mut(cs) = Credentials {
                ssid: truncated(ssid),
                password: truncated(password),
            };
        });
        self.link.post(RadioCommand::Configure)
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        self.link.post(RadioCommand::Connect)
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        self.link.post(RadioCommand::Disconnect)
    }

    fn start_scan(&mut self) -> Result<(), Self::Error> {
        critical_section::with(|cs| *self.link.scan.borrow_ref_mut(cs) = ScanSlot::Pending);
        self.link.post(RadioCommand::Scan)
    }

    fn poll_scan(
        &mut self,
        out: &mut Vec<Network, RAW_SCAN_CAPACITY>,
    ) -> Result<bool, Self::Error> {
        critical_section::with(|cs| {
            let mut slot = self.link.scan.borrow_ref_mut(cs);
            match core::mem::take(&mut *slot) {
                ScanSlot::Done(networks) => {
                    *out = networks;
                    Ok(true)
                }
                ScanSlot::Failed => Err(LinkError::ScanFailed),
                pending @ ScanSlot::Pending => {
                    *slot = pending;
                    Ok(false)
                }
                ScanSlot::Idle => Ok(false),
            }
        })
    }
}
