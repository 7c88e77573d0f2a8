//! GATT protocol surface for the Lumen light server
//!
//! Service/characteristic UUIDs, fixed attribute values and the command
//! vocabulary. Clients hardcode these, so they must not change.

pub mod command;

/// Primary service UUID (16-bit)
pub const SERVICE_UUID: u16 = 0x0180;

/// Data characteristic UUID (read) - returns [`DATA_VALUE`]
pub const DATA_CHAR_UUID: u16 = 0xFEF4;

/// Command characteristic UUID (write) - accepts the vocabulary in [`command`]
pub const COMMAND_CHAR_UUID: u16 = 0xDEAD;

/// Response characteristic UUID (read/write/notify) - reads return
/// [`RESPONSE_READ_VALUE`], toggle acknowledgements arrive as notifications
pub const RESPONSE_CHAR_UUID: u16 = 0x1ABC;

/// Name carried in the advertisement and the GAP device-name attribute
pub const DEVICE_NAME: &str = "BLE-Server";

/// Value served by the data characteristic
pub const DATA_VALUE: &[u8] = b"Data from the server";

/// Value served by a read of the response characteristic
pub const RESPONSE_READ_VALUE: &[u8] = b"ACK";
