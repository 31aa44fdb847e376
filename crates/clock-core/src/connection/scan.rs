use heapless::Vec;

use super::{MAX_SCAN_RESULTS, Network};

/// Reduce a raw scan to the list shown to the user: hidden networks dropped,
/// one row per SSID (first report wins), at most [`MAX_SCAN_RESULTS`] rows.
pub fn collect_networks(raw: &[Network]) -> Vec<Network, MAX_SCAN_RESULTS> {
    let mut out: Vec<Network, MAX_SCAN_RESULTS> = Vec::new();
    for network in raw {
        if network.ssid.is_empty() || out.iter().any(|seen| seen.ssid == network.ssid) {
            continue;
        }
        if out.push(network.clone()).is_err() {
            break;
        }
    }
    out
}

/// Signal strength as 1..=4 bars.
pub const fn signal_bars(rssi: i8) -> u8 {
    if rssi > -50 {
        4
    } else if rssi > -60 {
        3
    } else if rssi > -70 {
        2
    } else {
        1
    }
}
