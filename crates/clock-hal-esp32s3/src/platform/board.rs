//! CYD board outputs bundled behind the application's `Board` seam.

use core::sync::atomic::{AtomicBool, Ordering};

use clock_core::{app::Board, render::ScreenView};
use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use embedded_hal::{digital::InputPin, pwm::SetDutyCycle};
use log::{debug, info};

use crate::{
    input::button::BootButton,
    platform::display::{ActiveLowLed, Backlight, Panel},
    render::{TftRenderer, ViewRenderer},
};

pub struct CydBoard<'a, P, BL, LED, BTN> {
    panel: P,
    backlight: Backlight<BL>,
    led: ActiveLowLed<LED>,
    button: BootButton<BTN>,
    /// Shared with the touch driver.
    rotated: &'a AtomicBool,
    renderer: TftRenderer,
    panel_fault_logged: bool,
}

impl<'a, P, BL, LED, BTN> CydBoard<'a, P, BL, LED, BTN>
where
    P: Panel,
    BL: SetDutyCycle,
    LED: SetDutyCycle,
    BTN: InputPin,
{
    pub fn new(
        panel: P,
        backlight: Backlight<BL>,
        led: ActiveLowLed<LED>,
        button: BootButton<BTN>,
        rotated: &'a AtomicBool,
    ) -> Self {
        Self {
            panel,
            backlight,
            led,
            button,
            rotated,
            renderer: TftRenderer::new(),
            panel_fault_logged: false,
        }
    }

    pub fn render(&mut self, view: ScreenView<'_>) {
        if let Err(err) = self.renderer.render(view, &mut self.panel) {
            self.panel_fault("render", &err);
        }
    }

    fn panel_fault<E: core::fmt::Debug>(&mut self, what: &str, err: &E) {
        if !self.panel_fault_logged {
            info!("display: {} failed: {:?}", what, err);
            self.panel_fault_logged = true;
        }
    }
}

impl<P, BL, LED, BTN> Board for CydBoard<'_, P, BL, LED, BTN>
where
    P: Panel,
    BL: SetDutyCycle,
    LED: SetDutyCycle,
    BTN: InputPin,
{
    fn clear_screen(&mut self) {
        if let Err(err) = self.panel.clear(Rgb565::BLACK) {
            self.panel_fault("clear", &err);
        }
    }

    fn set_backlight(&mut self, level: u8) {
        if let Err(err) = self.backlight.set_level(level) {
            debug!("backlight: duty update failed: {:?}", err);
        }
    }

    fn set_indicator(&mut self, level: u8) {
        if let Err(err) = self.led.set_level(level) {
            debug!("led: duty update failed: {:?}", err);
        }
    }

    fn set_rotation(&mut self, rotated: bool) {
        self.rotated.store(rotated, Ordering::Release);
        if let Err(err) = self.panel.set_rotated(rotated) {
            self.panel_fault("rotate", &err);
        }
    }

    fn settings_button_pressed(&mut self) -> bool {
        self.button.pressed()
    }
}
