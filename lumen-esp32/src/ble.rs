//! GATT server wiring for the NimBLE stack
//!
//! Builds the attribute table, installs the callbacks and forwards
//! every event into the core [`LightServer`]. The UUIDs and fixed
//! values come from `lumen-proto`; clients hardcode them.

use std::sync::{Arc, Mutex};

use esp32_nimble::utilities::mutex::Mutex as BleMutex;
use esp32_nimble::utilities::BleUuid;
use esp32_nimble::{
    BLEAdvertisementData, BLEAdvertising, BLECharacteristic, BLEDevice, NimbleProperties,
};
use log::*;
use lumen_mcu::{
    AdvertiseError, Advertiser, ConnectionHandle, GapEvent, LightServer, NotifyError, ReadTarget,
    ResponseNotifier,
};
use lumen_proto as proto;

use crate::light::GpioLight;

/// The application behind the vendor callbacks.
pub type App = LightServer<GpioLight, NimbleNotifier, NimbleAdvertiser>;

/// Sends toggle acknowledgements through the response characteristic.
///
/// NimBLE routes the notification to the subscribed link itself; the
/// send is an enqueue into the host stack's outbound queue and reports
/// no per-connection status at this layer.
pub struct NimbleNotifier {
    response: Arc<BleMutex<BLECharacteristic>>,
}

impl ResponseNotifier for NimbleNotifier {
    fn notify(&mut self, _conn: ConnectionHandle, message: &str) -> Result<(), NotifyError> {
        self.response.lock().set_value(message.as_bytes()).notify();
        Ok(())
    }
}

/// Starts advertising through the NimBLE advertising singleton.
pub struct NimbleAdvertiser {
    advertising: &'static BleMutex<BLEAdvertising>,
}

impl Advertiser for NimbleAdvertiser {
    fn start(&mut self) -> Result<(), AdvertiseError> {
        self.advertising.lock().start().map_err(|e| AdvertiseError {
            reason: format!("{e:?}"),
        })
    }
}

/// Register the GATT table, install the callbacks and start
/// advertising. Everything after this runs on the NimBLE host task.
pub fn start_gatt_server(light: GpioLight) -> anyhow::Result<Arc<Mutex<App>>> {
    let ble_device = BLEDevice::take();
    BLEDevice::set_device_name(proto::DEVICE_NAME)?;

    let ble_advertising = ble_device.get_advertising();
    let server = ble_device.get_server();

    // The core lifecycle owns every advertising restart.
    server.advertise_on_disconnect(false);

    let service = server.create_service(BleUuid::Uuid16(proto::SERVICE_UUID));

    // Response characteristic first: the notifier wraps it.
    let response_char = service.lock().create_characteristic(
        BleUuid::Uuid16(proto::RESPONSE_CHAR_UUID),
        NimbleProperties::READ | NimbleProperties::WRITE | NimbleProperties::NOTIFY,
    );

    let app = Arc::new(Mutex::new(LightServer::new(
        light,
        NimbleNotifier {
            response: response_char.clone(),
        },
        NimbleAdvertiser {
            advertising: ble_advertising,
        },
    )));

    {
        let app = app.clone();
        response_char.lock().on_read(move |value, _desc| {
            if let Ok(mut a) = app.lock() {
                value.set_value(a.on_read(ReadTarget::Response));
            }
        });
    }
    response_char.lock().on_write(|args| {
        warn!(
            "Ignoring write to the response characteristic ({} bytes)",
            args.recv_data().len()
        );
    });

    let data_char = service.lock().create_characteristic(
        BleUuid::Uuid16(proto::DATA_CHAR_UUID),
        NimbleProperties::READ,
    );
    {
        let app = app.clone();
        data_char.lock().on_read(move |value, _desc| {
            if let Ok(mut a) = app.lock() {
                value.set_value(a.on_read(ReadTarget::Data));
            }
        });
    }

    let command_char = service.lock().create_characteristic(
        BleUuid::Uuid16(proto::COMMAND_CHAR_UUID),
        NimbleProperties::WRITE,
    );
    {
        let app = app.clone();
        command_char.lock().on_write(move |args| {
            let conn = ConnectionHandle(args.desc().conn_handle());
            if let Ok(mut a) = app.lock() {
                a.on_write(conn, args.recv_data());
            }
        });
    }

    {
        let app = app.clone();
        server.on_connect(move |server, desc| {
            info!("Client connected: {:?}", desc);
            if let Err(e) = server.update_conn_params(desc.conn_handle(), 24, 48, 0, 60) {
                warn!("Failed to update connection params: {:?}", e);
            }
            if let Ok(mut a) = app.lock() {
                a.on_gap_event(GapEvent::Connect {
                    conn: ConnectionHandle(desc.conn_handle()),
                    status: 0,
                });
            }
        });
    }

    {
        let app = app.clone();
        server.on_disconnect(move |_desc, reason| {
            info!("Client disconnected ({:?})", reason);
            if let Ok(mut a) = app.lock() {
                a.on_gap_event(GapEvent::Disconnect);
            }
        });
    }

    ble_advertising.lock().set_data(
        BLEAdvertisementData::new()
            .name(proto::DEVICE_NAME)
            .add_service_uuid(BleUuid::Uuid16(proto::SERVICE_UUID)),
    )?;

    app.lock().unwrap().start();
    server.ble_gatts_show_local();
    info!("GATT server up, advertising as '{}'", proto::DEVICE_NAME);

    Ok(app)
}
