use crate::{
    LinkError, LinkResult,
    link::{LinkState, PeripheralIds},
};

use std::{panic::Location, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use uuid::Uuid;

/// Bluetooth LE operations the link monitor needs.
///
/// Peripherals are addressed by their persisted identifier string.
#[async_trait]
pub trait PeripheralTransport: Send + Sync {
    /// Scan for peripherals advertising `service` for at most `timeout`.
    ///
    /// Returns `true` as soon as `identifier` is seen; the scan is stopped
    /// either way.
    async fn discover(&self, service: Uuid, identifier: &str, timeout: Duration)
    -> LinkResult<bool>;

    /// Current connection state of `identifier`.
    async fn state(&self, identifier: &str) -> LinkResult<LinkState>;

    /// Connect to `identifier` and discover its services.
    async fn connect(&self, identifier: &str) -> LinkResult<()>;

    /// Write `payload` to the characteristic in `ids` without response.
    async fn write(&self, identifier: &str, ids: PeripheralIds, payload: &[u8]) -> LinkResult<()>;

    /// Drop the connection to `identifier`.
    async fn disconnect(&self, identifier: &str) -> LinkResult<()>;
}

/// Transport used when no Bluetooth stack is compiled in.
///
/// Never finds anything, so the monitor simply never connects.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledTransport;

#[async_trait]
impl PeripheralTransport for DisabledTransport {
    async fn discover(&self, _: Uuid, _: &str, _: Duration) -> LinkResult<bool> {
        Ok(false)
    }

    async fn state(&self, _: &str) -> LinkResult<LinkState> {
        Ok(LinkState::Disconnected)
    }

    async fn connect(&self, _: &str) -> LinkResult<()> {
        Err(LinkError::AdapterUnavailable {
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn write(&self, _: &str, _: PeripheralIds, _: &[u8]) -> LinkResult<()> {
        Err(LinkError::AdapterUnavailable {
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn disconnect(&self, _: &str) -> LinkResult<()> {
        Ok(())
    }
}
