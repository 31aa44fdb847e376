use super::*;

const DIGIT_W: i16 = 38;
const DIGIT_H: i16 = 76;
const SEGMENT: i16 = 6;
const DIGIT_GAP: i16 = 6;
const COLON_W: i16 = 20;
const FACE_W: i16 = 3 * (2 * DIGIT_W + DIGIT_GAP) + 2 * COLON_W;
const FACE_X: i16 = (DISPLAY_WIDTH - FACE_W) / 2;

const UNLIT: Rgb565 = Rgb565::new(2, 4, 2);

/// Bit 0 is segment a, bit 6 is segment g.
const DIGIT_SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];
const DASH: u8 = 0x40;

pub(super) fn draw_clock<D>(target: &mut D, face: &ClockFace) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let color = if face.synced { FG } else { WARN };
    let fields = match face.time {
        Some(time) => [time.hour, time.minute, time.second].map(|v| {
            let v = usize::from(v % 100);
            [DIGIT_SEGMENTS[v / 10], DIGIT_SEGMENTS[v % 10]]
        }),
        None => [[DASH, DASH]; 3],
    };

    let mut x = FACE_X;
    for (index, pair) in fields.iter().enumerate() {
        seven_segment(target, x, CLOCK_TIME_Y, pair[0], color)?;
        seven_segment(target, x + DIGIT_W + DIGIT_GAP, CLOCK_TIME_Y, pair[1], color)?;
        x += 2 * DIGIT_W + DIGIT_GAP;
        if index < 2 {
            colon(target, x, CLOCK_TIME_Y, face.colon_visible || face.time.is_none(), color)?;
            x += COLON_W;
        }
    }

    let mut date = Line::new();
    match face.time {
        Some(time) => {
            let _ = write!(
                date,
                "{}, {} {} {}",
                time.weekday_name(),
                time.month_name(),
                time.day,
                time.year
            );
        }
        None => {
            let _ = date.push_str("Waiting for time...");
        }
    }
    banner(target, &date, CLOCK_DATE_Y, &FONT_10X20, FG)?;

    let status_color = if face.synced { OK } else { WARN };
    banner(target, &face.status, CLOCK_STATS_Y, &FONT_6X10, status_color)?;
    banner(target, &face.detail, CLOCK_STATS_LINE2_Y, &FONT_6X10, DIM)?;
    banner(target, &face.next_sync, CLOCK_STATS_LINE3_Y, &FONT_6X10, DIM)
}

fn seven_segment<D>(target: &mut D, x: i16, y: i16, mask: u8, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let half = DIGIT_H / 2;
    let span_w = DIGIT_W - 2 * SEGMENT;
    let span_h = half - SEGMENT;
    let segments: [(i16, i16, i16, i16); 7] = [
        (x + SEGMENT, y, span_w, SEGMENT),
        (x + DIGIT_W - SEGMENT, y + SEGMENT, SEGMENT, span_h),
        (x + DIGIT_W - SEGMENT, y + half, SEGMENT, span_h),
        (x + SEGMENT, y + DIGIT_H - SEGMENT, span_w, SEGMENT),
        (x, y + half, SEGMENT, span_h),
        (x, y + SEGMENT, SEGMENT, span_h),
        (x + SEGMENT, y + half - SEGMENT / 2, span_w, SEGMENT),
    ];

    for (bit, (sx, sy, sw, sh)) in segments.into_iter().enumerate() {
        let lit = mask & (1 << bit) != 0;
        fill(target, sx, sy, sw, sh, if lit { color } else { UNLIT })?;
    }
    Ok(())
}

fn colon<D>(target: &mut D, x: i16, y: i16, visible: bool, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let dot_x = x + (COLON_W - SEGMENT) / 2;
    let color = if visible { color } else { BG };
    fill(target, dot_x, y + DIGIT_H / 3 - SEGMENT / 2, SEGMENT, SEGMENT, color)?;
    fill(target, dot_x, y + 2 * DIGIT_H / 3 - SEGMENT / 2, SEGMENT, SEGMENT, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_fits_the_panel() {
        assert!(FACE_X >= 0);
        assert!(FACE_X + FACE_W <= DISPLAY_WIDTH);
        assert!(CLOCK_TIME_Y + DIGIT_H < CLOCK_DATE_Y);
    }

    #[test]
    fn segment_table_lights_expected_bars() {
        assert_eq!(DIGIT_SEGMENTS[8].count_ones(), 7);
        assert_eq!(DIGIT_SEGMENTS[1].count_ones(), 2);
        assert_eq!(DIGIT_SEGMENTS[0] & DASH, 0);
    }
}
