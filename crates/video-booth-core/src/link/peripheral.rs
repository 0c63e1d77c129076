use std::fmt;

use uuid::Uuid;

/// Service the trigger peripheral advertises.
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x0003abcd_0000_1000_8000_00805f9b34fb);

/// Characteristic commands are written to (short form `FFE1`).
pub const WRITE_CHARACTERISTIC_UUID: Uuid = Uuid::from_u128(0x0000ffe1_0000_1000_8000_00805f9b34fb);

/// Connection state of a peripheral as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// Not connected.
    #[default]
    Disconnected,
    /// A connect request is in flight.
    Connecting,
    /// Connected and writable.
    Connected,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "disconnected"),
            LinkState::Connecting => write!(f, "connecting"),
            LinkState::Connected => write!(f, "connected"),
        }
    }
}

/// The peripheral the monitor keeps alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeripheralRef {
    /// Persisted identifier (the adapter's address string).
    pub identifier: String,
    /// Last observed state.
    pub state: LinkState,
}

impl PeripheralRef {
    /// A freshly discovered, not yet connected peripheral.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            state: LinkState::Disconnected,
        }
    }
}

/// GATT identifiers used to talk to the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralIds {
    /// Service filter for discovery.
    pub service: Uuid,
    /// Characteristic commands are written to.
    pub characteristic: Uuid,
}

impl Default for PeripheralIds {
    fn default() -> Self {
        Self {
            service: SERVICE_UUID,
            characteristic: WRITE_CHARACTERISTIC_UUID,
        }
    }
}

/// What happened to a command handed to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Bytes were written.
    Sent,
    /// No connected peripheral; nothing was written.
    NotConnected,
    /// The write was attempted and failed.
    WriteFailed,
}
