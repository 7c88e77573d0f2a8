//! Seams toward the vendor BLE stack
//!
//! The firmware crate implements these traits with its BLE binding;
//! tests implement them with recording mocks.

/// Connection handle assigned by the host stack.
///
/// Valid only within the callback invocation that delivered it; the
/// core never stores one across events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHandle(pub u16);

/// The host stack reported a non-zero status for a notification send
/// (connection dropped mid-send, insufficient resources, ...).
#[derive(Debug, thiserror::Error)]
#[error("notification send failed: {reason}")]
pub struct NotifyError {
    pub reason: String,
}

/// Sends notifications on the response characteristic.
///
/// The characteristic handle is assigned once at service registration
/// and owned by the implementation for the process lifetime.
pub trait ResponseNotifier {
    fn notify(&mut self, conn: ConnectionHandle, message: &str) -> Result<(), NotifyError>;
}

/// The host stack refused to (re)start advertising.
#[derive(Debug, thiserror::Error)]
#[error("advertising start failed: {reason}")]
pub struct AdvertiseError {
    pub reason: String,
}

/// Starts undirected, general-discoverable advertising.
pub trait Advertiser {
    fn start(&mut self) -> Result<(), AdvertiseError>;
}

/// GAP events forwarded from the host stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapEvent {
    /// A connection attempt finished; `status` is the stack's result
    /// code, zero on success.
    Connect { conn: ConnectionHandle, status: i32 },
    /// An established connection ended.
    Disconnect,
    /// An advertising interval ran out without a connection being made.
    AdvertiseComplete,
}
