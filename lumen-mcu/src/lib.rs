//! Lumen MCU library
//!
//! MCU-agnostic core of the Lumen BLE light server.
//!
//! This crate provides:
//! - Seams toward the vendor BLE stack and the light output
//! - The command dispatcher and the connection lifecycle
//!
//! The firmware crate (`lumen-esp32`) implements the traits with its
//! BLE binding and GPIO driver and forwards stack callbacks into
//! [`LightServer`]; tests drive the same entry points with synthetic
//! events, so none of this needs a radio to run.

pub mod ble;
pub mod light;
pub mod server;

pub use ble::*;
pub use light::*;
pub use server::*;
