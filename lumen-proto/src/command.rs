//! Command vocabulary for the command characteristic
//!
//! A write payload is matched byte-for-byte against four ASCII literals.
//! The whole payload must equal the literal - no prefixes, no suffixes,
//! no terminating NUL. Everything else decodes to `Unrecognized`.

/// Toggles the light and acknowledges with a notification
pub const LIGHT_TOGGLE: &[u8] = b"LIGHTON";

/// Accepted and logged, no effect
pub const LIGHT_OFF: &[u8] = b"LIGHT OFF";

/// Accepted and logged, no effect
pub const FAN_ON: &[u8] = b"FAN ON";

/// Accepted and logged, no effect
pub const FAN_OFF: &[u8] = b"FAN OFF";

/// Notification payload after a toggle that switched the light on
pub const LIGHT_ON_RESPONSE: &str = "LIGHTON";

/// Notification payload after a toggle that switched the light off
pub const LIGHT_OFF_RESPONSE: &str = "LIGHTOFF";

/// A decoded command write. Built per write event and consumed
/// immediately; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Toggle the light state
    LightToggle,
    LightOff,
    FanOn,
    FanOff,
    /// Anything that is not one of the four literals
    Unrecognized(&'a [u8]),
}

impl<'a> Command<'a> {
    /// Decode a write payload. Infallible: unknown input is
    /// `Unrecognized`, never an error.
    pub fn parse(payload: &'a [u8]) -> Self {
        if payload == LIGHT_TOGGLE {
            Command::LightToggle
        } else if payload == LIGHT_OFF {
            Command::LightOff
        } else if payload == FAN_ON {
            Command::FanOn
        } else if payload == FAN_OFF {
            Command::FanOff
        } else {
            Command::Unrecognized(payload)
        }
    }
}
