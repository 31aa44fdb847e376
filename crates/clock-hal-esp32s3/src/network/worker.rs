//! Async owner of the WiFi controller.

use clock_core::{
    connection::{Network, RAW_SCAN_CAPACITY, RadioEvent, RadioEvents},
    settings::truncated,
};
use embassy_net::Stack;
use embassy_time::{Duration, Timer, with_timeout};
use esp_radio::wifi::{AuthMethod, ClientConfig, ModeConfig, ScanConfig, WifiController};
use heapless::Vec;
use log::{debug, info, warn};

use super::{RadioCommand, RadioLink};

const RADIO_POLL_MS: u64 = 100;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const SCAN_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Default)]
struct LinkEdges {
    associated: bool,
    addressed: bool,
}

/// Executes queued commands and turns controller/stack state changes into
/// [`RadioEvent`]s. Never returns.
pub async fn radio_worker(
    controller: &mut WifiController<'_>,
    stack: Stack<'_>,
    link: &RadioLink,
    events: &RadioEvents,
) -> ! {
    let mut edges = LinkEdges::default();

    loop {
        while let Some(command) = link.take_command() {
            execute(controller, link, events, &mut edges, command).await;
        }

        let associated = matches!(controller.is_connected(), Ok(true));
        let addressed = associated && stack.is_link_up() && stack.config_v4().is_some();

        if edges.associated && !associated {
            info!("wifi: link lost");
            post(events, RadioEvent::Disconnected);
        }
        if addressed && !edges.addressed {
            if let Some(config) = stack.config_v4() {
                info!("wifi: dhcp address {}", config.address);
            }
            post(events, RadioEvent::GotAddress);
        }
        edges.associated = associated;
        edges.addressed = addressed;

        Timer::after_millis(RADIO_POLL_MS).await;
    }
}

async fn execute(
    controller: &mut WifiController<'_>,
    link: &RadioLink,
    events: &RadioEvents,
    edges: &mut LinkEdges,
    command: RadioCommand,
) {
    debug!("wifi: command {:?}", command);
    match command {
        RadioCommand::Start => {
            if controller.is_started().unwrap_or(false) {
                return;
            }
            match controller.start_async().await {
                Ok(()) => post(events, RadioEvent::StaStarted),
                Err(err) => warn!("wifi: start failed: {:?}", err),
            }
        }
        RadioCommand::Configure => {
            let credentials = link.credentials();
            let auth_method = if credentials.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::Wpa2Personal
            };
            let mode = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(credentials.ssid.as_str().into())
                    .with_password(credentials.password.as_str().into())
                    .with_auth_method(auth_method),
            );
            if let Err(err) = controller.set_config(&mode) {
                warn!("wifi: set_config failed: {:?}", err);
            }
        }
        RadioCommand::Connect => {
            let outcome = with_timeout(
                Duration::from_secs(CONNECT_TIMEOUT_SECS),
                controller.connect_async(),
            )
            .await;
            match outcome {
                Ok(Ok(())) => {
                    info!("wifi: associated");
                    edges.associated = true;
                }
                Ok(Err(err)) => {
                    info!("wifi: connect failed: {:?}", err);
                    edges.associated = false;
                    post(events, RadioEvent::Disconnected);
                }
                Err(_) => {
                    info!("wifi: connect timed out");
                    let _ = controller.disconnect_async().await;
                    edges.associated = false;
                    post(events, RadioEvent::Disconnected);
                }
            }
        }
        RadioCommand::Disconnect => {
            if matches!(controller.is_connected(), Ok(true))
                && let Err(err) = controller.disconnect_async().await
            {
                debug!("wifi: disconnect failed: {:?}", err);
            }
            // Requested teardown is not a link loss.
            edges.associated = false;
            edges.addressed = false;
        }
        RadioCommand::Scan => link.finish_scan(scan(controller).await),
    }
}

async fn scan(controller: &mut WifiController<'_>) -> Option<Vec<Network, RAW_SCAN_CAPACITY>> {
    let config = ScanConfig::default().with_max(RAW_SCAN_CAPACITY);
    let results = match with_timeout(
        Duration::from_secs(SCAN_TIMEOUT_SECS),
        controller.scan_with_config_async(config),
    )
    .await
    {
        Ok(Ok(results)) => results,
        Ok(Err(err)) => {
            warn!("wifi: scan failed: {:?}", err);
            return None;
        }
        Err(_) => {
            warn!("wifi: scan timed out");
            return None;
        }
    };

    let mut networks = Vec::new();
    for ap in results.iter() {
        let network = Network {
            ssid: truncated(ap.ssid.as_str()),
            rssi: ap.signal_strength,
            secured: !matches!(ap.auth_method, None | Some(AuthMethod::None)),
        };
        if networks.push(network).is_err() {
            break;
        }
    }
    Some(networks)
}

fn post(events: &RadioEvents, event: RadioEvent) {
    if !events.post(event) {
        debug!("wifi: event queue full, dropped oldest");
    }
}
