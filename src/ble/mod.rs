//! btleplug-backed transport
//!
//! Talks to the unit's link module through two GATT characteristics:
//! - Write: 4D200002-EFF3-4362-B090-A04CAB3F1DA0 (write with response)
//! - Notify: 4D200003-EFF3-4362-B090-A04CAB3F1DA0
//!
//! One complete parcel per write and per notification.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use btleplug::api::{
    BDAddr, Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::ble::{NOTIFY_CHARACTERISTIC, WRITE_CHARACTERISTIC};
use crate::transport::{NotificationHandler, Transport, TransportError};

const WRITE_UUID: Uuid = Uuid::from_u128(WRITE_CHARACTERISTIC);
const NOTIFY_UUID: Uuid = Uuid::from_u128(NOTIFY_CHARACTERISTIC);

/// Interval between peripheral list polls while scanning
const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How to pick the unit among advertising peripherals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    Address(BDAddr),
    Name(String),
}

impl FromStr for DeviceSelector {
    type Err = std::convert::Infallible;

    /// Anything that parses as a Bluetooth address is an address, the rest
    /// is matched against the advertised local name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match BDAddr::from_str(s) {
            Ok(address) => Self::Address(address),
            Err(_) => Self::Name(s.to_string()),
        })
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "{}", address),
            Self::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// BLE link to one unit
pub struct BleTransport {
    peripheral: Peripheral,
    write_char: Option<Characteristic>,
    notify_char: Option<Characteristic>,
    notification_task: Option<JoinHandle<()>>,
}

impl BleTransport {
    /// Scan the first adapter for a matching peripheral
    pub async fn find(
        selector: &DeviceSelector,
        scan_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let manager = Manager::new().await.map_err(map_error)?;
        let adapter = manager
            .adapters()
            .await
            .map_err(map_error)?
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Backend("no Bluetooth adapters found".into()))?;

        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(map_error)?;
        let found = Self::scan(&adapter, selector, scan_timeout).await;
        if let Err(e) = adapter.stop_scan().await {
            warn!("Failed to stop scan: {}", e);
        }

        let peripheral = found?;
        info!("Found {} at {}", selector, peripheral.address());

        Ok(Self {
            peripheral,
            write_char: None,
            notify_char: None,
            notification_task: None,
        })
    }

    async fn scan(
        adapter: &Adapter,
        selector: &DeviceSelector,
        scan_timeout: Duration,
    ) -> Result<Peripheral, TransportError> {
        let start = Instant::now();

        while start.elapsed() < scan_timeout {
            for peripheral in adapter.peripherals().await.map_err(map_error)? {
                if Self::matches(&peripheral, selector).await? {
                    return Ok(peripheral);
                }
            }
            tokio::time::sleep(SCAN_POLL_INTERVAL).await;
        }

        debug!("{} not seen within {:?}", selector, scan_timeout);
        Err(TransportError::DeviceNotFound)
    }

    async fn matches(
        peripheral: &Peripheral,
        selector: &DeviceSelector,
    ) -> Result<bool, TransportError> {
        match selector {
            DeviceSelector::Address(address) => Ok(peripheral.address() == *address),
            DeviceSelector::Name(name) => {
                let properties = peripheral.properties().await.map_err(map_error)?;
                Ok(properties
                    .and_then(|p| p.local_name)
                    .is_some_and(|local_name| local_name == *name))
            }
        }
    }

    fn find_characteristic(&self, uuid: Uuid) -> Result<Characteristic, TransportError> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
            .ok_or(TransportError::CharacteristicNotFound)
    }
}

impl Transport for BleTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        self.peripheral.connect().await.map_err(map_error)?;
        self.peripheral.discover_services().await.map_err(map_error)?;

        self.write_char = Some(self.find_characteristic(WRITE_UUID)?);
        self.notify_char = Some(self.find_characteristic(NOTIFY_UUID)?);

        info!("Connected to {}", self.peripheral.address());
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        if let Some(task) = self.notification_task.take() {
            task.abort();
        }

        if let Some(notify_char) = self.notify_char.take() {
            if let Err(e) = self.peripheral.unsubscribe(&notify_char).await {
                debug!("Unsubscribe failed: {}", e);
            }
        }
        self.write_char = None;

        self.peripheral.disconnect().await.map_err(map_error)?;
        info!("Disconnected from {}", self.peripheral.address());
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let write_char = self.write_char.as_ref().ok_or(TransportError::LinkLost)?;
        self.peripheral
            .write(write_char, data, WriteType::WithResponse)
            .await
            .map_err(map_error)
    }

    async fn subscribe(&mut self, handler: NotificationHandler) -> Result<(), TransportError> {
        let notify_char = self.notify_char.clone().ok_or(TransportError::LinkLost)?;

        let mut stream = self.peripheral.notifications().await.map_err(map_error)?;
        self.peripheral
            .subscribe(&notify_char)
            .await
            .map_err(map_error)?;

        if let Some(task) = self.notification_task.take() {
            task.abort();
        }
        self.notification_task = Some(tokio::spawn(async move {
            while let Some(notification) = stream.next().await {
                if notification.uuid == NOTIFY_UUID {
                    handler(&notification.value);
                }
            }
            debug!("Notification stream ended");
        }));

        Ok(())
    }
}

impl Drop for BleTransport {
    fn drop(&mut self) {
        if let Some(task) = self.notification_task.take() {
            task.abort();
        }
    }
}

fn map_error(error: btleplug::Error) -> TransportError {
    match error {
        btleplug::Error::NotConnected => TransportError::LinkLost,
        btleplug::Error::TimedOut(_) => TransportError::Timeout,
        btleplug::Error::DeviceNotFound => TransportError::DeviceNotFound,
        btleplug::Error::NoSuchCharacteristic => TransportError::CharacteristicNotFound,
        other => TransportError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_address() {
        let selector: DeviceSelector = "A4:C1:38:12:34:56".parse().unwrap();
        assert!(matches!(selector, DeviceSelector::Address(_)));
    }

    #[test]
    fn test_selector_from_name() {
        let selector: DeviceSelector = "Panasonic-AC".parse().unwrap();
        assert_eq!(selector, DeviceSelector::Name("Panasonic-AC".into()));
        assert_eq!(format!("{}", selector), "'Panasonic-AC'");
    }

    #[test]
    fn test_characteristic_uuids() {
        assert_eq!(
            WRITE_UUID.to_string(),
            "4d200002-eff3-4362-b090-a04cab3f1da0"
        );
        assert_eq!(
            NOTIFY_UUID.to_string(),
            "4d200003-eff3-4362-b090-a04cab3f1da0"
        );
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(map_error(btleplug::Error::NotConnected), TransportError::LinkLost);
        assert_eq!(
            map_error(btleplug::Error::TimedOut(Duration::from_secs(1))),
            TransportError::Timeout
        );
        assert_eq!(
            map_error(btleplug::Error::DeviceNotFound),
            TransportError::DeviceNotFound
        );
        assert!(matches!(
            map_error(btleplug::Error::RuntimeError("boom".into())),
            TransportError::Backend(_)
        ));
    }
}
