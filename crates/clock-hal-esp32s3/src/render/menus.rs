use super::*;

pub(super) fn draw_splash<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    banner(target, clock_core::render::APP_NAME, 90, &FONT_10X20, ACCENT)?;
    banner(target, "Starting...", 130, &FONT_6X10, DIM)
}

pub(super) fn draw_boot_connecting<D>(target: &mut D, ssid: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    banner(target, "Connecting to", 90, &FONT_10X20, FG)?;
    banner(target, ssid, 120, &FONT_10X20, ACCENT)
}

pub(super) fn draw_settings<D>(target: &mut D, view: SettingsView) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    header(target, "Settings", false)?;

    const LABELS: [&str; SETTINGS_ROWS] = [
        "Timezone",
        "WiFi Setup",
        "NTP Server",
        "Brightness",
        "LED",
        "Rotate 180",
        "About",
        "",
    ];

    for (row, label) in LABELS.iter().enumerate() {
        let y = settings_row_y(row);
        let h = ITEM_HEIGHT - 2;
        fill(target, 0, y, DISPLAY_WIDTH, ITEM_HEIGHT, BG)?;
        match row {
            0..=2 | 6 => {
                text(target, label, ITEM_TEXT_X, y + ITEM_TEXT_Y, &FONT_10X20, FG, BG)?;
                text(target, ">", DISPLAY_WIDTH - 20, y + ITEM_TEXT_Y, &FONT_10X20, DIM, BG)?;
            }
            3 => {
                text(target, label, ITEM_TEXT_X, y + ITEM_TEXT_Y, &FONT_10X20, FG, BG)?;
                slider(target, y, h, view.brightness)?;
            }
            4 => {
                text(target, label, ITEM_TEXT_X, y + ITEM_TEXT_Y, &FONT_10X20, FG, BG)?;
                slider(target, y, h, view.led_brightness)?;
            }
            5 => {
                text(target, label, ITEM_TEXT_X, y + ITEM_TEXT_Y, &FONT_10X20, FG, BG)?;
                let state = if view.rotated { "ON" } else { "OFF" };
                button(target, ROTATION_TOGGLE_X, y, ROTATION_TOGGLE_W, h, state, view.rotated)?;
            }
            _ => button(target, DONE_BUTTON_X, y, DONE_BUTTON_W, h, "Done", true)?,
        }
        if row < SETTINGS_ROWS - 1 {
            fill(target, 0, y + ITEM_HEIGHT - 1, DISPLAY_WIDTH, 1, DIM)?;
        }
    }
    Ok(())
}

pub(super) fn draw_timezone<D>(target: &mut D, view: TimezoneView<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    header(target, "Timezone", true)?;
    list_window(
        target,
        view.zones.iter().map(|zone| zone.name),
        view.offset,
        view.zones.len(),
        Some(view.selected),
    )
}

pub(super) fn draw_ntp<D>(target: &mut D, view: NtpView<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    match view {
        NtpView::Main {
            server,
            interval_labels,
            interval_index,
        } => {
            header(target, "NTP", true)?;
            fill(target, 0, HEADER_HEIGHT, DISPLAY_WIDTH, DISPLAY_HEIGHT - HEADER_HEIGHT, BG)?;
            text(target, "Server:", 10, NTP_SERVER_BOX_Y - 14, &FONT_6X10, DIM, BG)?;
            server_box(target, server)?;

            text(target, "Sync interval:", 10, NTP_INTERVAL_Y - 14, &FONT_6X10, DIM, BG)?;
            for (index, label) in interval_labels.iter().enumerate() {
                let x = NTP_INTERVAL_X + index as i16 * (NTP_INTERVAL_W + NTP_INTERVAL_GAP);
                button(
                    target,
                    x,
                    NTP_INTERVAL_Y,
                    NTP_INTERVAL_W,
                    NTP_INTERVAL_H,
                    label,
                    index == interval_index,
                )?;
            }

            button(target, NTP_SYNC_X, NTP_SYNC_Y, NTP_SYNC_W, NTP_SYNC_H, "Sync", false)
        }
        NtpView::Keyboard { server, rows } => {
            header(target, "NTP Server", false)?;
            server_box(target, server)?;
            host_keyboard(target, &rows)
        }
    }
}

fn server_box<D>(target: &mut D, server: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    fill(target, 8, NTP_SERVER_BOX_Y, DISPLAY_WIDTH - 16, NTP_SERVER_BOX_H, BG)?;
    outline(target, 8, NTP_SERVER_BOX_Y, DISPLAY_WIDTH - 16, NTP_SERVER_BOX_H, FG)?;
    text(target, server, 14, NTP_SERVER_BOX_Y + 4, &FONT_10X20, FG, BG)
}

pub(super) fn draw_about<D>(
    target: &mut D,
    name: &str,
    version: &str,
    url: &str,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    header(target, "About", true)?;
    banner(target, name, 70, &FONT_10X20, ACCENT)?;

    let mut line = Line::new();
    let _ = write!(line, "Version {}", version);
    banner(target, &line, 110, &FONT_10X20, FG)?;
    banner(target, url, 150, &FONT_6X10, DIM)
}
