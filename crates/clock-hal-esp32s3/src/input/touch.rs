//! XPT2046 resistive touch controller.
//!
//! The controller shares nothing with the display bus; it sits on its own SPI
//! host at 1 MHz, mode 0. Pen-down is reported on a separate active-low IRQ
//! line, so the bus is only touched while a finger is on the panel.

use core::sync::atomic::{AtomicBool, Ordering};

use clock_core::{
    input::{TouchSample, TouchSource},
    screens::layout::{DISPLAY_HEIGHT, DISPLAY_WIDTH},
};
use embedded_hal::{digital::InputPin, spi::SpiDevice};

const CMD_READ_X: u8 = 0xD0;
const CMD_READ_Y: u8 = 0x90;
const SAMPLES: u32 = 4;

/// Raw ADC span observed at the panel edges.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TouchCalibration {
    pub x_min: u16,
    pub x_max: u16,
    pub y_min: u16,
    pub y_max: u16,
}

impl Default for TouchCalibration {
    fn default() -> Self {
        Self {
            x_min: 340,
            x_max: 3900,
            y_min: 240,
            y_max: 3800,
        }
    }
}

impl TouchCalibration {
    /// Map raw readings to landscape display coordinates. The panel is
    /// mounted with its axes swapped: raw Y drives screen X.
    pub fn to_screen(self, raw_x: u16, raw_y: u16, rotated: bool) -> (i16, i16) {
        let x = scale(raw_y, self.y_min, self.y_max, DISPLAY_WIDTH);
        let y = scale(raw_x, self.x_min, self.x_max, DISPLAY_HEIGHT);
        if rotated {
            (DISPLAY_WIDTH - 1 - x, DISPLAY_HEIGHT - 1 - y)
        } else {
            (x, y)
        }
    }
}

fn scale(raw: u16, min: u16, max: u16, span: i16) -> i16 {
    let range = i32::from(max.saturating_sub(min)).max(1);
    let value = (i32::from(raw) - i32::from(min)) * i32::from(span) / range;
    value.clamp(0, i32::from(span) - 1) as i16
}

#[derive(Debug)]
pub enum TouchError<SpiErr, IrqErr> {
    Spi(SpiErr),
    Irq(IrqErr),
}

pub struct Xpt2046<'a, SPI, IRQ> {
    spi: SPI,
    irq: IRQ,
    calibration: TouchCalibration,
    rotated: &'a AtomicBool,
}

impl<'a, SPI, IRQ> Xpt2046<'a, SPI, IRQ>
where
    SPI: SpiDevice<u8>,
    IRQ: InputPin,
{
    /// `rotated` is shared with the board so a rotation change applies to
    /// touch mapping at the same moment it applies to the panel.
    pub fn new(spi: SPI, irq: IRQ, rotated: &'a AtomicBool) -> Self {
        Self {
            spi,
            irq,
            calibration: TouchCalibration::default(),
            rotated,
        }
    }

    fn read_channel(&mut self, command: u8) -> Result<u16, SPI::Error> {
        let mut frame = [command, 0, 0];
        self.spi.transfer_in_place(&mut frame)?;
        Ok(((u16::from(frame[1]) << 8) | u16::from(frame[2])) >> 3)
    }

    fn read_averaged(&mut self) -> Result<(u16, u16), SPI::Error> {
        let mut sum_x = 0u32;
        let mut sum_y = 0u32;
        for _ in 0..SAMPLES {
            sum_x += u32::from(self.read_channel(CMD_READ_X)?);
            sum_y += u32::from(self.read_channel(CMD_READ_Y)?);
        }
        Ok(((sum_x / SAMPLES) as u16, (sum_y / SAMPLES) as u16))
    }
}

impl<SPI, IRQ> TouchSource for Xpt2046<'_, SPI, IRQ>
where
    SPI: SpiDevice<u8>,
    IRQ: InputPin,
{
    type Error = TouchError<SPI::Error, IRQ::Error>;

    fn poll(&mut self) -> Result<TouchSample, Self::Error> {
        if self.irq.is_high().map_err(TouchError::Irq)? {
            return Ok(TouchSample::RELEASED);
        }

        let (raw_x, raw_y) = self.read_averaged().map_err(TouchError::Spi)?;
        let (x, y) = self
            .calibration
            .to_screen(raw_x, raw_y, self.rotated.load(Ordering::Acquire));
        Ok(TouchSample::pressed_at(x, y))
    }
}
