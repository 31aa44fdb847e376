//! ILI9341 panel, PWM backlight and the active-low RGB indicator LED.

use clock_core::timing::gamma_correct;
use embedded_graphics::{pixelcolor::Rgb565, prelude::DrawTarget};
use embedded_hal::{digital::OutputPin, pwm::SetDutyCycle};
use mipidsi::{
    Display,
    interface::{Interface, InterfacePixelFormat},
    models::ILI9341Rgb565,
    options::{Orientation, Rotation},
};

/// A colour panel that can flip between the two landscape orientations.
pub trait Panel: DrawTarget<Color = Rgb565> {
    fn set_rotated(&mut self, rotated: bool) -> Result<(), Self::Error>;
}

/// Landscape orientation; `rotated` turns the image upside down.
pub const fn orientation(rotated: bool) -> Orientation {
    let rotation = if rotated {
        Rotation::Deg270
    } else {
        Rotation::Deg90
    };
    Orientation::new().rotate(rotation)
}

impl<DI, RST> Panel for Display<DI, ILI9341Rgb565, RST>
where
    DI: Interface,
    Rgb565: InterfacePixelFormat<DI::Word>,
    RST: OutputPin,
{
    fn set_rotated(&mut self, rotated: bool) -> Result<(), Self::Error> {
        self.set_orientation(orientation(rotated))
    }
}

#[derive(Debug)]
pub struct Backlight<P> {
    pwm: P,
}

impl<P> Backlight<P>
where
    P: SetDutyCycle,
{
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }

    pub fn set_level(&mut self, level: u8) -> Result<(), P::Error> {
        self.pwm.set_duty_cycle_fraction(u16::from(level), 255)
    }
}

/// Red channel of the on-board RGB LED. The LED is wired to the supply, so a
/// low output lights it.
#[derive(Debug)]
pub struct ActiveLowLed<P> {
    pwm: P,
}

impl<P> ActiveLowLed<P>
where
    P: SetDutyCycle,
{
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }

    pub fn set_level(&mut self, level: u8) -> Result<(), P::Error> {
        self.pwm
            .set_duty_cycle_fraction(u16::from(led_duty(level)), 255)
    }
}

/// High-time out of 255 for a linear brightness. Zero is fully off.
pub const fn led_duty(level: u8) -> u8 {
    if level == 0 {
        u8::MAX
    } else {
        u8::MAX - gamma_correct(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn led_duty_is_inverted_and_gamma_corrected() {
        assert_eq!(led_duty(0), 255);
        assert_eq!(led_duty(255), 0);
        assert_eq!(led_duty(128), 191);
    }
}
