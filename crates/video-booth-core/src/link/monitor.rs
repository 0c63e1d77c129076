use crate::{
    LinkError, LinkResult,
    link::{CommandOutcome, LinkState, PeripheralIds, PeripheralRef, PeripheralTransport},
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tokio::{
    runtime::Handle,
    sync::{Mutex, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info, instrument, warn};

/// How long a discovery scan runs before giving up.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// How often the monitor polls the link.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// What a single [`LinkMonitor::tick`] did.
#[derive(Debug)]
pub enum TickAction {
    /// Nothing remembered and nothing saved.
    Idle,
    /// The remembered peripheral is connected.
    Connected,
    /// A connect is already in flight.
    ConnectPending,
    /// A connect was spawned; the handle resolves once it has finished.
    ConnectIssued(JoinHandle<()>),
    /// The saved peripheral was not seen during the scan.
    NotFound,
}

/// Keeps the trigger peripheral connected and forwards commands to it.
///
/// Cloning is cheap; clones share the remembered peripheral.
#[derive(Clone)]
pub struct LinkMonitor {
    transport: Arc<dyn PeripheralTransport>,
    ids: PeripheralIds,
    saved_identifier: Arc<Mutex<Option<String>>>,
    remembered: Arc<Mutex<Option<PeripheralRef>>>,
    scan_timeout: Duration,
    handle: Handle,
}

impl LinkMonitor {
    /// Creates a monitor that reconnects to `saved_identifier` when set.
    pub fn new(
        transport: Arc<dyn PeripheralTransport>,
        ids: PeripheralIds,
        saved_identifier: Option<String>,
        handle: Handle,
    ) -> Self {
        Self {
            transport,
            ids,
            saved_identifier: Arc::new(Mutex::new(saved_identifier)),
            remembered: Arc::new(Mutex::new(None)),
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            handle,
        }
    }

    /// Override the discovery scan length.
    pub fn with_scan_timeout(mut self, scan_timeout: Duration) -> Self {
        self.scan_timeout = scan_timeout;
        self
    }

    /// Snapshot of the remembered peripheral.
    pub async fn remembered(&self) -> Option<PeripheralRef> {
        self.remembered.lock().await.clone()
    }

    /// One poll of the link.
    ///
    /// A remembered peripheral that dropped is reconnected in the background.
    /// Without one, the saved identifier (if any) is looked for with a timed
    /// scan and connected when found.
    #[instrument(skip(self))]
    pub async fn tick(&self) -> TickAction {
        let mut remembered = self.remembered.lock().await;

        if let Some(peripheral) = remembered.as_mut() {
            if peripheral.state == LinkState::Connecting {
                debug!(identifier = %peripheral.identifier, "Connect already in flight");
                return TickAction::ConnectPending;
            }

            let state = match self.transport.state(&peripheral.identifier).await {
                Ok(state) => state,
                Err(e) => {
                    warn!(identifier = %peripheral.identifier, error = ?e, "Failed to query peripheral state");
                    LinkState::Disconnected
                }
            };
            peripheral.state = state;

            return match state {
                LinkState::Connected => {
                    debug!(identifier = %peripheral.identifier, "Peripheral connected");
                    TickAction::Connected
                }
                LinkState::Connecting => TickAction::ConnectPending,
                LinkState::Disconnected => {
                    info!(identifier = %peripheral.identifier, "Peripheral disconnected, reconnecting");
                    peripheral.state = LinkState::Connecting;
                    TickAction::ConnectIssued(self.spawn_connect(peripheral.identifier.clone()))
                }
            };
        }
        drop(remembered);

        let Some(identifier) = self.saved_identifier.lock().await.clone() else {
            return TickAction::Idle;
        };

        debug!(identifier = %identifier, timeout_ms = self.scan_timeout.as_millis(), "Scanning for saved peripheral");

        match self
            .transport
            .discover(self.ids.service, &identifier, self.scan_timeout)
            .await
        {
            Ok(true) => {
                info!(identifier = %identifier, "Saved peripheral found");
                let mut remembered = self.remembered.lock().await;
                *remembered = Some(PeripheralRef {
                    identifier: identifier.clone(),
                    state: LinkState::Connecting,
                });
                TickAction::ConnectIssued(self.spawn_connect(identifier))
            }
            Ok(false) => {
                debug!(identifier = %identifier, "Saved peripheral not seen");
                TickAction::NotFound
            }
            Err(e) => {
                warn!(identifier = %identifier, error = ?e, "Discovery scan failed");
                TickAction::NotFound
            }
        }
    }

    fn spawn_connect(&self, identifier: String) -> JoinHandle<()> {
        let transport = Arc::clone(&self.transport);
        let remembered = Arc::clone(&self.remembered);

        self.handle.spawn(async move {
            let state = match transport.connect(&identifier).await {
                Ok(()) => {
                    info!(identifier = %identifier, "Peripheral connected");
                    LinkState::Connected
                }
                Err(e) => {
                    warn!(identifier = %identifier, error = ?e, "Failed to connect peripheral");
                    LinkState::Disconnected
                }
            };

            let mut remembered = remembered.lock().await;
            if let Some(peripheral) = remembered.as_mut()
                && peripheral.identifier == identifier
            {
                peripheral.state = state;
            }
        })
    }

    /// Poll immediately, then every `interval`, until `shutdown_rx` flips.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
        info!(interval_ms = interval.as_millis(), "Link monitor started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Link monitor stopped");
    }

    /// Write `command` as ASCII to the connected peripheral.
    ///
    /// Without a connected peripheral nothing is written and
    /// [`CommandOutcome::NotConnected`] is returned. Write failures are
    /// logged and reported, never retried.
    ///
    /// # Errors
    ///
    /// `NonAsciiCommand` when a peripheral is connected and `command`
    /// contains non-ASCII characters.
    #[instrument(skip(self))]
    pub async fn send_command(&self, command: &str) -> LinkResult<CommandOutcome> {
        let identifier = {
            let mut remembered = self.remembered.lock().await;
            let Some(peripheral) = remembered.as_mut() else {
                debug!("No peripheral remembered, command dropped");
                return Ok(CommandOutcome::NotConnected);
            };

            if peripheral.state == LinkState::Connected {
                match self.transport.state(&peripheral.identifier).await {
                    Ok(state) => peripheral.state = state,
                    Err(e) => {
                        warn!(error = ?e, "Failed to query peripheral state");
                        peripheral.state = LinkState::Disconnected;
                    }
                }
            }

            if peripheral.state != LinkState::Connected {
                debug!(state = %peripheral.state, "Peripheral not connected, command dropped");
                return Ok(CommandOutcome::NotConnected);
            }

            peripheral.identifier.clone()
        };

        if !command.is_ascii() {
            return Err(LinkError::NonAsciiCommand {
                command: command.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        match self
            .transport
            .write(&identifier, self.ids, command.as_bytes())
            .await
        {
            Ok(()) => {
                info!(identifier = %identifier, "Command sent");
                Ok(CommandOutcome::Sent)
            }
            Err(e) => {
                warn!(identifier = %identifier, error = ?e, "Command write failed");
                Ok(CommandOutcome::WriteFailed)
            }
        }
    }

    /// Replace the persisted identifier.
    ///
    /// A remembered peripheral with a different identifier is disconnected
    /// and forgotten so the next tick looks for the new one.
    #[instrument(skip(self))]
    pub async fn set_saved_identifier(&self, identifier: Option<String>) {
        *self.saved_identifier.lock().await = identifier.clone();

        let stale = {
            let remembered = self.remembered.lock().await;
            remembered
                .as_ref()
                .is_some_and(|p| Some(&p.identifier) != identifier.as_ref())
        };

        if stale {
            self.disconnect().await;
        }
    }

    /// Disconnect and forget the remembered peripheral.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) {
        let Some(peripheral) = self.remembered.lock().await.take() else {
            return;
        };

        match self.transport.disconnect(&peripheral.identifier).await {
            Ok(()) => info!(identifier = %peripheral.identifier, "Peripheral disconnected"),
            Err(e) => {
                warn!(identifier = %peripheral.identifier, error = ?e, "Failed to disconnect peripheral")
            }
        }
    }
}
