use super::*;

pub(super) fn draw_setup<D>(target: &mut D, view: &SetupView<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    match view {
        SetupView::Scanning => {
            header(target, "WiFi Setup", true)?;
            banner(target, "Scanning for networks...", 110, &FONT_10X20, FG)
        }
        SetupView::NoNetworks => {
            header(target, "WiFi Setup", true)?;
            banner(target, "No networks found", 100, &FONT_10X20, WARN)?;
            banner(target, "Tap to scan again", 130, &FONT_6X10, DIM)
        }
        SetupView::NetworkList { networks, offset } => {
            header(target, "Select WiFi", true)?;
            draw_networks(target, networks, *offset)
        }
        SetupView::PasswordEntry {
            ssid,
            masked,
            rows,
            layer,
            shift,
        } => {
            header(target, ssid, true)?;
            text(target, "Password:", 10, 44, &FONT_6X10, DIM, BG)?;
            fill(target, 8, 60, DISPLAY_WIDTH - 16, 28, BG)?;
            outline(target, 8, 60, DISPLAY_WIDTH - 16, 28, FG)?;
            text(target, masked, 14, 64, &FONT_10X20, FG, BG)?;
            password_keyboard(target, rows, *layer, *shift)
        }
        SetupView::Connecting { ssid } => {
            banner(target, "Connecting to", 90, &FONT_10X20, FG)?;
            banner(target, ssid, 120, &FONT_10X20, ACCENT)
        }
        SetupView::Connected { ssid } => {
            banner(target, "Connected!", 90, &FONT_10X20, OK)?;
            banner(target, ssid, 120, &FONT_10X20, FG)
        }
        SetupView::Failed { ssid } => {
            banner(target, "Connection failed", 90, &FONT_10X20, ERROR)?;
            banner(target, ssid, 120, &FONT_10X20, FG)?;
            banner(target, "Tap to try again", 160, &FONT_6X10, DIM)
        }
    }
}

fn draw_networks<D>(
    target: &mut D,
    networks: &[clock_core::connection::Network],
    offset: usize,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    list_window(
        target,
        networks.iter().map(|network| network.ssid.as_str()),
        offset,
        networks.len(),
        None,
    )?;

    for (row, network) in networks.iter().skip(offset).take(LIST_VISIBLE).enumerate() {
        let y = LIST_START_Y + row as i16 * LIST_ITEM_H;
        if network.secured {
            text(target, "*", DISPLAY_WIDTH - 52, y + 4, &FONT_10X20, DIM, BG)?;
        }
        signal_meter(target, DISPLAY_WIDTH - 34, y + 4, signal_bars(network.rssi))?;
    }
    Ok(())
}

/// Four ascending bars, `bars` of them lit.
fn signal_meter<D>(target: &mut D, x: i16, y: i16, bars: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for bar in 0..4u8 {
        let h = 5 + i16::from(bar) * 5;
        let color = if bar < bars { OK } else { DIM };
        fill(target, x + i16::from(bar) * 6, y + 20 - h, 4, h, color)?;
    }
    Ok(())
}
