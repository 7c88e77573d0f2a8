//! Command dispatch and connection lifecycle

use log::{info, warn};
use lumen_proto::command::{self, Command};

use crate::ble::{Advertiser, ConnectionHandle, GapEvent, ResponseNotifier};
use crate::light::Light;

/// The two readable characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTarget {
    /// The static data characteristic (0xFEF4)
    Data,
    /// The response characteristic (0x1ABC)
    Response,
}

/// Link state as seen by this server. One connection at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Advertising,
    Connected,
}

/// The server composite: light state, command dispatch and the
/// connection lifecycle, behind the transport seams.
///
/// All entry points run sequentially on the host stack task; that
/// single-threaded access pattern is what keeps `light_on` consistent
/// without a lock.
pub struct LightServer<L, N, A> {
    light_on: bool,
    link: LinkState,
    light: L,
    notifier: N,
    advertiser: A,
}

impl<L: Light, N: ResponseNotifier, A: Advertiser> LightServer<L, N, A> {
    pub fn new(light: L, notifier: N, advertiser: A) -> Self {
        Self {
            light_on: false,
            link: LinkState::Advertising,
            light,
            notifier,
            advertiser,
        }
    }

    /// Put the device on the air. Called once after GATT registration.
    pub fn start(&mut self) {
        self.start_advertising();
    }

    /// Logical light state; mirrors the last applied toggle.
    pub fn light_on(&self) -> bool {
        self.light_on
    }

    /// Write callback for the command characteristic.
    ///
    /// Unknown payloads are logged and otherwise ignored; the client is
    /// never told its command was rejected.
    pub fn on_write(&mut self, conn: ConnectionHandle, payload: &[u8]) {
        match Command::parse(payload) {
            Command::LightToggle => {
                let on = !self.light_on;
                self.set_light(on);
                let message = if on {
                    command::LIGHT_ON_RESPONSE
                } else {
                    command::LIGHT_OFF_RESPONSE
                };
                info!("[LIGHT] Toggled to {}", if on { "ON" } else { "OFF" });
                if let Err(e) = self.notifier.notify(conn, message) {
                    warn!("Failed to notify conn {}: {}", conn.0, e);
                }
            }
            Command::LightOff => info!("Command accepted: LIGHT OFF"),
            Command::FanOn => info!("Command accepted: FAN ON"),
            Command::FanOff => info!("Command accepted: FAN OFF"),
            Command::Unrecognized(data) => {
                info!("Data from the client: {}", data.escape_ascii());
            }
        }
    }

    /// Read callback for the two readable characteristics.
    pub fn on_read(&mut self, target: ReadTarget) -> &'static [u8] {
        match target {
            ReadTarget::Data => lumen_proto::DATA_VALUE,
            ReadTarget::Response => lumen_proto::RESPONSE_READ_VALUE,
        }
    }

    /// GAP event callback.
    pub fn on_gap_event(&mut self, event: GapEvent) {
        match event {
            GapEvent::Connect { conn, status: 0 } => {
                info!("Client connected (conn={})", conn.0);
                self.link = LinkState::Connected;
            }
            GapEvent::Connect { status, .. } => {
                warn!("Connect failed (status={status}), advertising again");
                self.link = LinkState::Advertising;
                self.start_advertising();
            }
            GapEvent::Disconnect => {
                info!("Client disconnected, advertising again");
                self.link = LinkState::Advertising;
                self.set_light(false);
                self.start_advertising();
            }
            GapEvent::AdvertiseComplete => {
                if self.link == LinkState::Advertising {
                    self.start_advertising();
                }
            }
        }
    }

    fn set_light(&mut self, on: bool) {
        self.light_on = on;
        self.light.set(on);
    }

    fn start_advertising(&mut self) {
        if let Err(e) = self.advertiser.start() {
            warn!("{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::ble::{AdvertiseError, NotifyError};

    #[derive(Default, Clone)]
    struct RecordingLight {
        levels: Rc<RefCell<Vec<bool>>>,
    }

    impl Light for RecordingLight {
        fn set(&mut self, on: bool) {
            self.levels.borrow_mut().push(on);
        }
    }

    #[derive(Default, Clone)]
    struct RecordingNotifier {
        sent: Rc<RefCell<Vec<(u16, String)>>>,
        fail: bool,
    }

    impl ResponseNotifier for RecordingNotifier {
        fn notify(&mut self, conn: ConnectionHandle, message: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError {
                    reason: "insufficient resources".to_string(),
                });
            }
            self.sent.borrow_mut().push((conn.0, message.to_string()));
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    struct RecordingAdvertiser {
        starts: Rc<RefCell<u32>>,
    }

    impl Advertiser for RecordingAdvertiser {
        fn start(&mut self) -> Result<(), AdvertiseError> {
            *self.starts.borrow_mut() += 1;
            Ok(())
        }
    }

    const CONN: ConnectionHandle = ConnectionHandle(1);

    type TestServer = LightServer<RecordingLight, RecordingNotifier, RecordingAdvertiser>;

    fn server() -> (TestServer, RecordingLight, RecordingNotifier, RecordingAdvertiser) {
        let light = RecordingLight::default();
        let notifier = RecordingNotifier::default();
        let advertiser = RecordingAdvertiser::default();
        let server = LightServer::new(light.clone(), notifier.clone(), advertiser.clone());
        (server, light, notifier, advertiser)
    }

    #[test]
    fn toggle_drives_light_and_notifies_new_state() {
        let (mut server, light, notifier, _adv) = server();
        server.on_write(CONN, b"LIGHTON");
        assert!(server.light_on());
        assert_eq!(*light.levels.borrow(), vec![true]);
        assert_eq!(*notifier.sent.borrow(), vec![(1, "LIGHTON".to_string())]);
    }

    #[test]
    fn double_toggle_ends_off_with_two_notifications() {
        let (mut server, light, notifier, _adv) = server();
        server.on_write(CONN, b"LIGHTON");
        server.on_write(CONN, b"LIGHTON");
        assert!(!server.light_on());
        assert_eq!(*light.levels.borrow(), vec![true, false]);
        assert_eq!(
            *notifier.sent.borrow(),
            vec![(1, "LIGHTON".to_string()), (1, "LIGHTOFF".to_string())]
        );
    }

    #[test]
    fn noop_commands_change_nothing() {
        let (mut server, light, notifier, _adv) = server();
        let payloads: &[&[u8]] = &[b"LIGHT OFF", b"FAN ON", b"FAN OFF"];
        for &payload in payloads {
            server.on_write(CONN, payload);
        }
        assert!(!server.light_on());
        assert!(light.levels.borrow().is_empty());
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn unrecognized_payloads_change_nothing() {
        let (mut server, light, notifier, _adv) = server();
        let payloads: &[&[u8]] = &[b"LIGHTON\0", b"LIGHTON!", b"lighton", b""];
        for &payload in payloads {
            server.on_write(CONN, payload);
        }
        assert!(!server.light_on());
        assert!(light.levels.borrow().is_empty());
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn notify_failure_does_not_undo_the_toggle() {
        let light = RecordingLight::default();
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let mut server = LightServer::new(light.clone(), notifier, RecordingAdvertiser::default());
        server.on_write(CONN, b"LIGHTON");
        assert!(server.light_on());
        assert_eq!(*light.levels.borrow(), vec![true]);

        server.on_write(CONN, b"LIGHTON");
        assert!(!server.light_on());
        assert_eq!(*light.levels.borrow(), vec![true, false]);
    }

    #[test]
    fn disconnect_resets_light_and_restarts_advertising() {
        let (mut server, light, _notifier, adv) = server();
        server.start();
        server.on_gap_event(GapEvent::Connect { conn: CONN, status: 0 });
        server.on_write(CONN, b"LIGHTON");
        server.on_gap_event(GapEvent::Disconnect);
        assert!(!server.light_on());
        assert_eq!(*light.levels.borrow(), vec![true, false]);
        assert_eq!(*adv.starts.borrow(), 2);
    }

    #[test]
    fn disconnect_while_already_off_still_drives_pin_low() {
        let (mut server, light, _notifier, _adv) = server();
        server.on_gap_event(GapEvent::Connect { conn: CONN, status: 0 });
        server.on_gap_event(GapEvent::Disconnect);
        assert!(!server.light_on());
        assert_eq!(*light.levels.borrow(), vec![false]);
    }

    #[test]
    fn failed_connect_restarts_advertising() {
        let (mut server, _light, _notifier, adv) = server();
        server.start();
        server.on_gap_event(GapEvent::Connect { conn: CONN, status: 1 });
        assert_eq!(*adv.starts.borrow(), 2);
    }

    #[test]
    fn advertise_complete_restarts_only_while_unconnected() {
        let (mut server, _light, _notifier, adv) = server();
        server.start();
        server.on_gap_event(GapEvent::AdvertiseComplete);
        assert_eq!(*adv.starts.borrow(), 2);

        server.on_gap_event(GapEvent::Connect { conn: CONN, status: 0 });
        server.on_gap_event(GapEvent::AdvertiseComplete);
        assert_eq!(*adv.starts.borrow(), 2);
    }

    #[test]
    fn reads_serve_fixed_values() {
        let (mut server, ..) = server();
        assert_eq!(server.on_read(ReadTarget::Data), b"Data from the server");
        assert_eq!(server.on_read(ReadTarget::Response), b"ACK");
    }
}
