#[cfg(feature = "ble")]
pub(crate) mod ble;
mod monitor;
mod peripheral;
mod transport;

#[cfg(feature = "ble")]
pub use ble::BleTransport;

pub use {
    monitor::{DEFAULT_POLL_INTERVAL, DEFAULT_SCAN_TIMEOUT, LinkMonitor, TickAction},
    peripheral::{
        CommandOutcome, LinkState, PeripheralIds, PeripheralRef, SERVICE_UUID,
        WRITE_CHARACTERISTIC_UUID,
    },
    transport::{DisabledTransport, PeripheralTransport},
};
