//! SNTPv4 client task and the handle the sync manager drives it through.

use core::cell::RefCell;

use clock_core::{
    settings::{NtpServer, truncated},
    sync::{SntpClient, SyncCycle, SyncOutcome, SyncStatus},
    timing::MonotonicClock,
};
use critical_section::Mutex;
use embassy_net::{
    IpAddress, Stack,
    dns::DnsQueryType,
    udp::{PacketMetadata, UdpSocket},
};
use embassy_time::{Duration, Timer, with_timeout};
use log::{debug, info, warn};

use crate::platform::clock::SystemClock;

const NTP_PORT: u16 = 123;
const NTP_PACKET_LEN: usize = 48;
/// LI = 0, VN = 4, mode = 3 (client).
const NTP_CLIENT_HEADER: u8 = 0x23;
const NTP_MODE_SERVER: u8 = 4;
const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;
const REPLY_TIMEOUT_SECS: u64 = 5;
const SNTP_POLL_MS: u64 = 250;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NtpError {
    Dns,
    NoAddress,
    Bind,
    Send,
    Timeout,
    Receive,
    BadReply,
}

#[derive(Clone, Debug)]
struct SntpRequest {
    server: NtpServer,
    interval_ms: u64,
    running: bool,
    generation: u32,
}

/// Configuration cell written by [`SntpHandle`] and read by [`sntp_worker`].
pub struct SntpLink {
    request: Mutex<RefCell<SntpRequest>>,
}

impl SntpLink {
    pub const fn new() -> Self {
        Self {
            request: Mutex::new(RefCell::new(SntpRequest {
                server: NtpServer::new(),
                interval_ms: 0,
                running: false,
                generation: 0,
            })),
        }
    }

    pub fn handle(&self) -> SntpHandle<'_> {
        SntpHandle { link: self }
    }

    fn snapshot(&self) -> SntpRequest {
        critical_section::with(|cs| self.request.borrow_ref(cs).clone())
    }

    fn update(&self, f: impl FnOnce(&mut SntpRequest)) {
        critical_section::with(|cs| {
            let mut request = self.request.borrow_ref_mut(cs);
            f(&mut request);
            request.generation = request.generation.wrapping_add(1);
        });
    }
}

impl Default for SntpLink {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SntpHandle<'a> {
    link: &'a SntpLink,
}

impl SntpClient for SntpHandle<'_> {
    type Error = core::convert::Infallible;

    fn start(&mut self, server: &str, interval_ms: u64) -> Result<(), Self::Error> {
        self.link.update(|request| {
            request.server = truncated(server);
            request.interval_ms = interval_ms;
            request.running = true;
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.link.update(|request| request.running = false);
        Ok(())
    }
}

/// Performs a round trip as soon as a (re)started cycle is seen, then follows
/// the [`SyncCycle`] schedule: the configured interval after success, bounded
/// backoff after failure.
pub async fn sntp_worker(
    stack: Stack<'_>,
    link: &SntpLink,
    status: &SyncStatus,
    clock: &SystemClock,
) -> ! {
    let mut cycle = SyncCycle::new(0, 0);
    let mut due_ms: Option<u64> = None;

    loop {
        let request = link.snapshot();
        if request.generation != cycle.generation() {
            let interval_secs = u32::try_from(request.interval_ms / 1_000).unwrap_or(u32::MAX);
            cycle = SyncCycle::new(request.generation, interval_secs);
            due_ms = request.running.then(|| clock.now_ms());
            debug!(
                "ntp: cycle {} server={} interval={}s running={}",
                cycle.generation(),
                request.server,
                cycle.schedule().interval_secs(),
                request.running
            );
        }

        let ready = stack.is_link_up() && stack.config_v4().is_some();
        if let Some(due) = due_ms
            && ready
            && clock.now_ms() >= due
        {
            let result = query(stack, &request.server).await;
            let outcome = if result.is_ok() {
                SyncOutcome::Succeeded
            } else {
                SyncOutcome::Failed
            };
            let Some(delay_secs) = cycle.finish(link.snapshot().generation, outcome) else {
                debug!("ntp: cycle {} restarted mid query, result dropped", cycle.generation());
                continue;
            };

            match result {
                Ok(unix_ms) => {
                    clock.set_unix_ms(unix_ms);
                    status.record_sync(unix_ms.div_euclid(1_000));
                }
                Err(err) => {
                    warn!("ntp: {} round trip failed: {:?}", request.server, err);
                    info!("ntp: retrying in {}s", delay_secs);
                }
            }
            due_ms = Some(clock.now_ms() + u64::from(delay_secs) * 1_000);
        }

        Timer::after_millis(SNTP_POLL_MS).await;
    }
}

async fn query(stack: Stack<'_>, server: &str) -> Result<i64, NtpError> {
    let addresses = stack
        .dns_query(server, DnsQueryType::A)
        .await
        .map_err(|_| NtpError::Dns)?;
    let address: IpAddress = *addresses.first().ok_or(NtpError::NoAddress)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(0).map_err(|_| NtpError::Bind)?;

    let mut request = [0u8; NTP_PACKET_LEN];
    request[0] = NTP_CLIENT_HEADER;
    socket
        .send_to(&request, (address, NTP_PORT))
        .await
        .map_err(|_| NtpError::Send)?;

    let mut reply = [0u8; NTP_PACKET_LEN];
    let (len, _) = with_timeout(
        Duration::from_secs(REPLY_TIMEOUT_SECS),
        socket.recv_from(&mut reply),
    )
    .await
    .map_err(|_| NtpError::Timeout)?
    .map_err(|_| NtpError::Receive)?;

    parse_reply(&reply[..len])
}

/// Transmit timestamp of a server reply as Unix milliseconds.
fn parse_reply(reply: &[u8]) -> Result<i64, NtpError> {
    if reply.len() < NTP_PACKET_LEN {
        return Err(NtpError::BadReply);
    }
    let mode = reply[0] & 0x07;
    let stratum = reply[1];
    if mode != NTP_MODE_SERVER || stratum == 0 {
        return Err(NtpError::BadReply);
    }

    let secs = u64::from(u32::from_be_bytes([reply[40], reply[41], reply[42], reply[43]]));
    let fraction = u64::from(u32::from_be_bytes([reply[44], reply[45], reply[46], reply[47]]));
    if secs < NTP_UNIX_OFFSET_SECS {
        return Err(NtpError::BadReply);
    }

    let millis = (fraction * 1_000) >> 32;
    Ok(((secs - NTP_UNIX_OFFSET_SECS) * 1_000 + millis) as i64)
}
