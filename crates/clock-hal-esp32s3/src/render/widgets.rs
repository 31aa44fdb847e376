use super::*;

pub(super) const BG: Rgb565 = Rgb565::BLACK;
pub(super) const FG: Rgb565 = Rgb565::WHITE;
pub(super) const ACCENT: Rgb565 = Rgb565::CYAN;
pub(super) const OK: Rgb565 = Rgb565::GREEN;
pub(super) const WARN: Rgb565 = Rgb565::YELLOW;
pub(super) const ERROR: Rgb565 = Rgb565::RED;
pub(super) const DIM: Rgb565 = Rgb565::new(6, 12, 6);
pub(super) const HEADER_BG: Rgb565 = Rgb565::new(0, 10, 14);
pub(super) const BUTTON_BG: Rgb565 = Rgb565::new(4, 8, 8);

pub(super) type Line = String<64>;

pub(super) fn fill<D>(target: &mut D, x: i16, y: i16, w: i16, h: i16, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if w <= 0 || h <= 0 {
        return Ok(());
    }
    Rectangle::new(
        Point::new(i32::from(x), i32::from(y)),
        Size::new(w as u32, h as u32),
    )
    .into_styled(PrimitiveStyle::with_fill(color))
    .draw(target)
}

pub(super) fn outline<D>(
    target: &mut D,
    x: i16,
    y: i16,
    w: i16,
    h: i16,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(
        Point::new(i32::from(x), i32::from(y)),
        Size::new(w.max(0) as u32, h.max(0) as u32),
    )
    .into_styled(PrimitiveStyle::with_stroke(color, 1))
    .draw(target)
}

pub(super) fn text<D>(
    target: &mut D,
    s: &str,
    x: i16,
    y: i16,
    font: &MonoFont<'_>,
    color: Rgb565,
    background: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = MonoTextStyleBuilder::new()
        .font(font)
        .text_color(color)
        .background_color(background)
        .build();
    Text::with_baseline(s, Point::new(i32::from(x), i32::from(y)), style, Baseline::Top)
        .draw(target)?;
    Ok(())
}

/// Text centered horizontally on `center_x`.
pub(super) fn text_centered<D>(
    target: &mut D,
    s: &str,
    center_x: i16,
    y: i16,
    font: &MonoFont<'_>,
    color: Rgb565,
    background: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = MonoTextStyleBuilder::new()
        .font(font)
        .text_color(color)
        .background_color(background)
        .build();
    let layout = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(
        s,
        Point::new(i32::from(center_x), i32::from(y)),
        style,
        layout,
    )
    .draw(target)?;
    Ok(())
}

/// Full-width line of centered text; the band is cleared first.
pub(super) fn banner<D>(
    target: &mut D,
    s: &str,
    y: i16,
    font: &MonoFont<'_>,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let height = font.character_size.height as i16;
    fill(target, 0, y, DISPLAY_WIDTH, height, BG)?;
    text_centered(target, s, DISPLAY_WIDTH / 2, y, font, color, BG)
}

pub(super) fn header<D>(target: &mut D, title: &str, back: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    fill(target, 0, 0, DISPLAY_WIDTH, HEADER_HEIGHT, HEADER_BG)?;
    if back {
        fill(target, 0, 0, BACK_BUTTON_W, HEADER_HEIGHT, BUTTON_BG)?;
        text(target, "< Back", 6, HEADER_TEXT_Y + 2, &FONT_6X10, FG, BUTTON_BG)?;
    }
    text_centered(
        target,
        title,
        DISPLAY_WIDTH / 2,
        HEADER_TEXT_Y - 2,
        &FONT_10X20,
        FG,
        HEADER_BG,
    )
}

pub(super) fn button<D>(
    target: &mut D,
    x: i16,
    y: i16,
    w: i16,
    h: i16,
    label: &str,
    highlighted: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let background = if highlighted { ACCENT } else { BUTTON_BG };
    let color = if highlighted { BG } else { FG };
    fill(target, x, y, w, h, background)?;
    outline(target, x, y, w, h, DIM)?;
    let font = if h >= 24 && label.len() as i16 * 10 <= w - 4 {
        &FONT_10X20
    } else {
        &FONT_6X10
    };
    let text_y = y + (h - font.character_size.height as i16) / 2;
    text_centered(target, label, x + w / 2, text_y, font, color, background)
}

/// Rows of a [`clock_core::screens::list::ScrollList`] window plus
/// scroll hints above and below.
pub(super) fn list_window<'a, D, I>(
    target: &mut D,
    labels: I,
    offset: usize,
    len: usize,
    selected: Option<usize>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    I: Iterator<Item = &'a str>,
{
    fill(target, 0, HEADER_HEIGHT, DISPLAY_WIDTH, LIST_START_Y - HEADER_HEIGHT, BG)?;
    for (row, label) in labels.skip(offset).take(LIST_VISIBLE).enumerate() {
        let index = offset + row;
        let y = LIST_START_Y + row as i16 * LIST_ITEM_H;
        let highlighted = selected == Some(index);
        let background = if highlighted { ACCENT } else { BG };
        let color = if highlighted { BG } else { FG };
        fill(target, 0, y, DISPLAY_WIDTH, LIST_ITEM_H - 1, background)?;
        text(target, label, ITEM_TEXT_X, y + 4, &FONT_10X20, color, background)?;
        fill(target, 0, y + LIST_ITEM_H - 1, DISPLAY_WIDTH, 1, DIM)?;
    }

    let shown = len.saturating_sub(offset).min(LIST_VISIBLE) as i16;
    let first_blank = LIST_START_Y + shown * LIST_ITEM_H;
    fill(target, 0, first_blank, DISPLAY_WIDTH, DISPLAY_HEIGHT - first_blank, BG)?;

    if offset > 0 {
        text(target, "^ more", DISPLAY_WIDTH - 50, HEADER_HEIGHT - 10, &FONT_6X10, DIM, HEADER_BG)?;
    }
    if offset + LIST_VISIBLE < len {
        text_centered(
            target,
            "v more v",
            DISPLAY_WIDTH / 2,
            LIST_END_Y + 10,
            &FONT_10X20,
            DIM,
            BG,
        )?;
    }
    Ok(())
}

/// Horizontal slider row: [-] bar [+].
pub(super) fn slider<D>(target: &mut D, y: i16, h: i16, level: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    button(target, SLIDER_BTN_X1, y, SLIDER_BTN_W, h, "-", false)?;
    button(target, SLIDER_BTN_X2, y, SLIDER_BTN_W, h, "+", false)?;
    let filled = (i32::from(level) * i32::from(SLIDER_BAR_W) / i32::from(BRIGHTNESS_MAX)) as i16;
    fill(target, SLIDER_BAR_X, y + 6, SLIDER_BAR_W, h - 12, DIM)?;
    fill(target, SLIDER_BAR_X, y + 6, filled, h - 12, ACCENT)
}

/// Password keyboard: four character rows and the special row.
pub(super) fn password_keyboard<D>(
    target: &mut D,
    rows: &[&str; 4],
    layer: KeyboardLayer,
    shift: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut label = [0u8; 4];
    for (row, keys) in rows.iter().enumerate() {
        for (col, ch) in keys.chars().enumerate() {
            let (x, y) = password_key_origin(row, col, keys.len());
            button(target, x, y, KEY_WIDTH, KEY_HEIGHT, ch.encode_utf8(&mut label), false)?;
        }
    }

    let mode = match layer {
        KeyboardLayer::Letters => "123",
        KeyboardLayer::Symbols => "abc",
    };
    button(target, 0, SPECIAL_ROW_Y, 44, KEY_HEIGHT, "Shift", shift)?;
    button(target, 45, SPECIAL_ROW_Y, 44, KEY_HEIGHT, mode, false)?;
    button(target, 90, SPECIAL_ROW_Y, 104, KEY_HEIGHT, "Space", false)?;
    button(target, 195, SPECIAL_ROW_Y, 44, KEY_HEIGHT, "Del", false)?;
    button(target, 240, SPECIAL_ROW_Y, DISPLAY_WIDTH - 240, KEY_HEIGHT, "Go", true)
}

/// Host-name keyboard used for the NTP server field.
pub(super) fn host_keyboard<D>(target: &mut D, rows: &[&str; 4]) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut label = [0u8; 4];
    for (row, keys) in rows.iter().enumerate() {
        for (col, ch) in keys.chars().enumerate() {
            let (x, y) = host_key_origin(row, col, keys.len());
            button(
                target,
                x,
                y,
                HOST_KEY_WIDTH - 1,
                HOST_KEY_HEIGHT - 1,
                ch.encode_utf8(&mut label),
                false,
            )?;
        }
    }

    let h = HOST_KEY_HEIGHT + 6;
    button(target, HOST_CANCEL_X, HOST_BOTTOM_ROW_Y, HOST_BUTTON_W, h, "Cancel", false)?;
    button(target, HOST_DEL_X, HOST_BOTTOM_ROW_Y, HOST_BUTTON_W, h, "Del", false)?;
    button(target, HOST_DONE_X, HOST_BOTTOM_ROW_Y, HOST_BUTTON_W, h, "Done", true)
}
