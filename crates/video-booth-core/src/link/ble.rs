//! [`PeripheralTransport`] over the platform Bluetooth LE stack.

use crate::{
    LinkError, LinkResult,
    link::{LinkState, PeripheralIds, PeripheralTransport},
};

use std::{collections::HashSet, panic::Location, time::Duration};

use async_trait::async_trait;
use btleplug::{
    api::{
        Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter,
        WriteType,
    },
    platform::{Adapter, Manager, Peripheral},
};
use error_location::ErrorLocation;
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

#[track_caller]
fn transport_error(e: btleplug::Error) -> LinkError {
    LinkError::Transport {
        reason: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// The command characteristic of the command service, if the peripheral has it.
pub(crate) fn command_characteristic(
    characteristics: impl IntoIterator<Item = Characteristic>,
    ids: PeripheralIds,
) -> Option<Characteristic> {
    characteristics
        .into_iter()
        .find(|c| c.service_uuid == ids.service && c.uuid == ids.characteristic)
}

/// Bluetooth LE transport on the first available adapter.
///
/// Peripherals are identified by their address string.
pub struct BleTransport {
    adapter: Adapter,
    connecting: Mutex<HashSet<String>>,
}

impl BleTransport {
    /// Open the first Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// `AdapterUnavailable` when the system has no adapter, `Transport` when
    /// the Bluetooth stack cannot be reached.
    #[instrument]
    pub async fn new() -> LinkResult<Self> {
        let manager = Manager::new().await.map_err(transport_error)?;
        let adapter = manager
            .adapters()
            .await
            .map_err(transport_error)?
            .into_iter()
            .next()
            .ok_or_else(|| LinkError::AdapterUnavailable {
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            adapter,
            connecting: Mutex::new(HashSet::new()),
        })
    }

    async fn find(&self, identifier: &str) -> LinkResult<Option<Peripheral>> {
        let peripherals = self.adapter.peripherals().await.map_err(transport_error)?;
        Ok(peripherals
            .into_iter()
            .find(|p| p.address().to_string() == identifier))
    }

    async fn require(&self, identifier: &str) -> LinkResult<Peripheral> {
        self.find(identifier)
            .await?
            .ok_or_else(|| LinkError::PeripheralNotFound {
                identifier: identifier.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn scan_for(&self, identifier: &str) -> LinkResult<bool> {
        let mut events = self.adapter.events().await.map_err(transport_error)?;

        if self.find(identifier).await?.is_some() {
            return Ok(true);
        }

        while let Some(event) = events.next().await {
            if let CentralEvent::DeviceDiscovered(id) = event {
                let peripheral = self.adapter.peripheral(&id).await.map_err(transport_error)?;
                let address = peripheral.address().to_string();
                debug!(address = %address, "Peripheral discovered");
                if address == identifier {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}

#[async_trait]
impl PeripheralTransport for BleTransport {
    #[instrument(skip(self))]
    async fn discover(
        &self,
        service: Uuid,
        identifier: &str,
        timeout: Duration,
    ) -> LinkResult<bool> {
        self.adapter
            .start_scan(ScanFilter {
                services: vec![service],
            })
            .await
            .map_err(transport_error)?;

        let found = tokio::time::timeout(timeout, self.scan_for(identifier))
            .await
            .unwrap_or(Ok(false));

        if let Err(e) = self.adapter.stop_scan().await {
            warn!(error = ?e, "Failed to stop scan");
        }

        found
    }

    async fn state(&self, identifier: &str) -> LinkResult<LinkState> {
        if self.connecting.lock().await.contains(identifier) {
            return Ok(LinkState::Connecting);
        }

        let Some(peripheral) = self.find(identifier).await? else {
            return Ok(LinkState::Disconnected);
        };

        if peripheral.is_connected().await.map_err(transport_error)? {
            Ok(LinkState::Connected)
        } else {
            Ok(LinkState::Disconnected)
        }
    }

    #[instrument(skip(self))]
    async fn connect(&self, identifier: &str) -> LinkResult<()> {
        self.connecting.lock().await.insert(identifier.to_string());

        let result = async {
            let peripheral = self.require(identifier).await?;
            peripheral.connect().await.map_err(transport_error)?;
            peripheral
                .discover_services()
                .await
                .map_err(transport_error)?;
            Ok::<(), LinkError>(())
        }
        .await;

        self.connecting.lock().await.remove(identifier);
        result
    }

    async fn write(&self, identifier: &str, ids: PeripheralIds, payload: &[u8]) -> LinkResult<()> {
        let peripheral = self.require(identifier).await?;

        let characteristic = command_characteristic(peripheral.characteristics(), ids)
            .ok_or_else(|| LinkError::CharacteristicNotFound {
                uuid: ids.characteristic,
                location: ErrorLocation::from(Location::caller()),
            })?;

        peripheral
            .write(&characteristic, payload, WriteType::WithoutResponse)
            .await
            .map_err(transport_error)
    }

    async fn disconnect(&self, identifier: &str) -> LinkResult<()> {
        let Some(peripheral) = self.find(identifier).await? else {
            return Ok(());
        };

        if peripheral.is_connected().await.map_err(transport_error)? {
            peripheral.disconnect().await.map_err(transport_error)?;
        }

        Ok(())
    }
}
