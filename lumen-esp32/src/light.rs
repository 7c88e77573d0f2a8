//! Light output on GPIO 18

use esp_idf_svc::hal::gpio::{Gpio18, Output, PinDriver};
use lumen_mcu::Light;

/// The sole actuator output. Driven low at boot.
pub struct GpioLight {
    pin: PinDriver<'static, Gpio18, Output>,
}

impl GpioLight {
    pub fn new(pin: Gpio18) -> anyhow::Result<Self> {
        let mut pin = PinDriver::output(pin)?;
        pin.set_low()?;
        Ok(Self { pin })
    }
}

impl Light for GpioLight {
    fn set(&mut self, on: bool) {
        let _ = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}
