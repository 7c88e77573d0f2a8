//! Lumen BLE light server for ESP32
//!
//! A single GATT service with three characteristics: a static data
//! value, a command sink that toggles the light on GPIO 18, and a
//! response characteristic that acknowledges toggles with a
//! notification. Command dispatch and the connection lifecycle live in
//! `lumen-mcu`; this crate only wires them to NimBLE and the pin.

mod ble;
mod light;

use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::*;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("Lumen light server v0.1");

    let peripherals = Peripherals::take()?;

    // The BLE controller keeps its calibration data in NVS.
    let _nvs = EspDefaultNvsPartition::take()?;

    let light = light::GpioLight::new(peripherals.pins.gpio18)?;
    info!("Light initialized on GPIO18");

    let _app = ble::start_gatt_server(light)?;

    // Everything from here on happens on the NimBLE host task.
    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}
