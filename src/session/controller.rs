//! Session controller
//!
//! Owns one logical connection to a unit. Outbound commands are serialised by
//! an async mutex that owns the transport and is held for "encode + write"
//! only. Inbound notifications never touch that lock: they update the status
//! cache and fan out to subscribers on whatever thread the transport uses.

use std::sync::{Arc, PoisonError, RwLock};

use futures::lock::Mutex;
use log::{debug, info, warn};

use crate::commands::{Command, CommandBuilder};
use crate::config::CommandSettings;
use crate::error::{ProtocolError, SessionError};
use crate::protocol::parcel::Parcel;
use crate::protocol::status::StatusSnapshot;
use crate::protocol::types::{FanSpeed, Mode};
use crate::session::state::{AtomicConnectionState, ConnectionState};
use crate::session::subscribers::{Subscribers, SubscriptionId, UpdateCallback};
use crate::transport::{NotificationHandler, Transport, TransportError};

/// State reachable from the notification path
#[derive(Default)]
struct Shared {
    state: AtomicConnectionState,
    status: RwLock<Option<StatusSnapshot>>,
    subscribers: Subscribers,
}

impl Shared {
    fn status(&self) -> Option<StatusSnapshot> {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_status(&self) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Cache `status` and report whether it was stored
    ///
    /// With `connected_only` the state is checked under the cache lock, so a
    /// report never lands after `disconnect` has cleared the cache.
    fn replace_status(&self, status: StatusSnapshot, connected_only: bool) -> bool {
        let mut cached = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if connected_only && self.state.load() != ConnectionState::Connected {
            return false;
        }
        *cached = Some(status);
        true
    }

    fn handle_notification(
        &self,
        data: &[u8],
        connected_only: bool,
    ) -> Result<Option<StatusSnapshot>, ProtocolError> {
        let parcel = Parcel::decode(data)?;
        debug!("Notification: {}", parcel);

        // Interpret everything first so a bad packet discards the whole frame
        let reports = parcel
            .status_reports()
            .collect::<Result<Vec<StatusSnapshot>, ProtocolError>>()?;

        for report in &reports {
            if !self.replace_status(*report, connected_only) {
                debug!("Dropping status report after disconnect");
                return Ok(None);
            }
            self.subscribers.dispatch();
        }

        Ok(reports.last().copied())
    }
}

/// Connection-scoped controller for a single unit
pub struct Session<T: Transport> {
    transport: Mutex<T>,
    builder: CommandBuilder,
    shared: Arc<Shared>,
}

impl<T: Transport> Session<T> {
    /// Create a disconnected session over `transport`
    pub fn new(transport: T) -> Self {
        Self::with_settings(transport, CommandSettings::default())
    }

    /// Create a session with custom command settings
    pub fn with_settings(transport: T, settings: CommandSettings) -> Self {
        Self {
            transport: Mutex::new(transport),
            builder: CommandBuilder::with_settings(settings),
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state.load()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Last status reported by the unit, if any since connecting
    pub fn status(&self) -> Option<StatusSnapshot> {
        self.shared.status()
    }

    /// Register a callback invoked after every status update
    ///
    /// Only a weak reference is kept; dropping the `Arc` unsubscribes.
    pub fn register_update_callback(&self, callback: &Arc<UpdateCallback>) -> SubscriptionId {
        self.shared.subscribers.register(callback)
    }

    pub fn unregister_update_callback(&self, id: SubscriptionId) -> bool {
        self.shared.subscribers.unregister(id)
    }

    /// Open the link, subscribe to notifications and request a status report
    ///
    /// A failed status request leaves the session connected.
    pub async fn connect(&self) -> Result<(), SessionError> {
        if let Err(state) = self
            .shared
            .state
            .transition(ConnectionState::Disconnected, ConnectionState::Connecting)
        {
            debug!("Connect ignored while {}", state);
            return Err(SessionError::AlreadyConnected);
        }

        {
            let mut transport = self.transport.lock().await;
            if let Err(e) = Self::open(&mut *transport, &self.shared).await {
                self.shared.state.store(ConnectionState::Disconnected);
                warn!("Connect failed: {}", e);
                return Err(SessionError::Connect(e));
            }
            self.shared.state.store(ConnectionState::Connected);
        }

        info!("Connected");
        self.request_status().await
    }

    async fn open(transport: &mut T, shared: &Arc<Shared>) -> Result<(), TransportError> {
        transport.connect().await?;

        let shared = Arc::clone(shared);
        let handler: NotificationHandler = Box::new(move |data: &[u8]| {
            let state = shared.state.load();
            if state != ConnectionState::Connected {
                debug!("Ignoring notification while {}", state);
                return;
            }
            if let Err(e) = shared.handle_notification(data, true) {
                warn!("Discarding notification ({} bytes): {}", data.len(), e);
            }
        });

        if let Err(e) = transport.subscribe(handler).await {
            let _ = transport.disconnect().await;
            return Err(e);
        }
        Ok(())
    }

    /// Close the link
    ///
    /// Always ends disconnected with the status cache cleared. Subscribers
    /// stay registered for the next connection.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        let mut transport = self.transport.lock().await;
        if self.state() == ConnectionState::Disconnected {
            return Ok(());
        }

        let result = transport.disconnect().await;
        self.shared.state.store(ConnectionState::Disconnected);
        self.shared.clear_status();
        info!("Disconnected");

        result.map_err(SessionError::Disconnect)
    }

    /// Feed a raw notification frame through the session
    ///
    /// Returns the last status report carried by the frame. On error nothing
    /// is updated and no subscriber runs. Unlike frames arriving from the
    /// transport, this is applied whatever the connection state.
    pub fn handle_notification(&self, data: &[u8]) -> Result<Option<StatusSnapshot>, ProtocolError> {
        self.shared.handle_notification(data, false)
    }

    /// Encode and write a parcel under the write lock
    pub async fn write_parcel(&self, parcel: &Parcel) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }

        let mut transport = self.transport.lock().await;
        // Disconnected while waiting for the lock
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }

        let frame = parcel.encode()?;
        debug!("Writing {} bytes: {}", frame.len(), parcel);

        transport.write(&frame).await.map_err(|e| {
            warn!("Write failed: {}", e);
            if e == TransportError::LinkLost {
                self.shared.state.store(ConnectionState::Disconnected);
                self.shared.clear_status();
            }
            SessionError::Write(e)
        })
    }

    /// Build and write any command
    pub async fn send(&self, command: &Command) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        let parcel = self.builder.build(command)?;
        self.write_parcel(&parcel).await
    }

    pub async fn request_status(&self) -> Result<(), SessionError> {
        self.send(&Command::RequestStatus).await
    }

    pub async fn set_power(&self, on: bool) -> Result<(), SessionError> {
        self.send(&Command::SetPower(on)).await
    }

    pub async fn set_mode(&self, mode: Mode) -> Result<(), SessionError> {
        self.send(&Command::SetMode(mode)).await
    }

    pub async fn set_fan_speed(&self, speed: FanSpeed) -> Result<(), SessionError> {
        self.send(&Command::SetFanSpeed(speed)).await
    }

    pub async fn set_temperature(&self, celsius: f32) -> Result<(), SessionError> {
        self.send(&Command::SetTemperature(celsius)).await
    }

    pub async fn set_energy_saving(&self, on: bool) -> Result<(), SessionError> {
        self.send(&Command::SetEnergySaving(on)).await
    }

    pub async fn set_outing(&self, on: bool) -> Result<(), SessionError> {
        self.send(&Command::SetOuting(on)).await
    }
}
