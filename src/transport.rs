use crate::constants::*;
use btleplug::api::{
    BDAddr, Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter,
    WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::{Stream, StreamExt};
use std::future::Future;
use std::str::FromStr;
use tokio::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Bluetooth error: {0}")]
    Ble(#[from] btleplug::Error),

    #[error("No Bluetooth adapter found")]
    NoAdapter,

    #[error("Invalid device address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Device {address} not found")]
    DeviceNotFound { address: String },

    #[error("Characteristic {uuid} not found on {address}")]
    CharacteristicNotFound { address: String, uuid: Uuid },

    #[error("Link closed")]
    Closed,
}

/// A connected motor: accepts command frames and returns the latest telemetry.
pub trait Link {
    fn send(&mut self, frame: &[u8]) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn read_latest(&mut self) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Establishes links to motors by device identifier.
pub trait Connector {
    type Link: Link;

    fn connect(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Self::Link, TransportError>> + Send;
}

/// Connects to KeiganMotors by MAC address on the first Bluetooth adapter.
pub struct BleConnector {
    adapter: Adapter,
    scan_timeout: Duration,
}

impl BleConnector {
    pub async fn new() -> Result<Self, TransportError> {
        Self::with_scan_timeout(Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECS)).await
    }

    pub async fn with_scan_timeout(scan_timeout: Duration) -> Result<Self, TransportError> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters.into_iter().next().ok_or(TransportError::NoAdapter)?;
        Ok(BleConnector {
            adapter,
            scan_timeout,
        })
    }

    async fn find_peripheral(&self, address: BDAddr) -> Result<Option<Peripheral>, TransportError> {
        // Already known to the adapter from an earlier scan
        for peripheral in self.adapter.peripherals().await? {
            if peripheral.address() == address {
                return Ok(Some(peripheral));
            }
        }

        let events = self.adapter.events().await?;
        self.adapter.start_scan(ScanFilter::default()).await?;
        info!("Scanning for KeiganMotor {}...", address);

        let found = scan_until(events, self.scan_timeout, |event| async move {
            match event {
                CentralEvent::DeviceDiscovered(id) => {
                    let peripheral = self.adapter.peripheral(&id).await?;
                    Ok((peripheral.address() == address).then_some(peripheral))
                }
                _ => Ok(None),
            }
        })
        .await;

        // Stop scanning on every path, then report the scan's own error first
        let stopped = self.adapter.stop_scan().await;
        let found = found?;
        stopped?;
        Ok(found)
    }
}

/// Feed scan events to `resolve` until it yields a match, the stream ends or
/// `window` elapses. The window bounds the whole scan, not the gap between
/// events.
async fn scan_until<S, T, F, Fut>(
    mut events: S,
    window: Duration,
    mut resolve: F,
) -> Result<Option<T>, TransportError>
where
    S: Stream + Unpin,
    F: FnMut(S::Item) -> Fut,
    Fut: Future<Output = Result<Option<T>, TransportError>>,
{
    let deadline = tokio::time::sleep(window);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            biased;
            _ = &mut deadline => return Ok(None),
            event = events.next() => match event {
                Some(event) => {
                    if let Some(found) = resolve(event).await? {
                        return Ok(Some(found));
                    }
                }
                None => return Ok(None),
            },
        }
    }
}

impl Connector for BleConnector {
    type Link = BleLink;

    async fn connect(&self, identifier: &str) -> Result<BleLink, TransportError> {
        let address = BDAddr::from_str(identifier).map_err(|e| TransportError::InvalidAddress {
            address: identifier.to_string(),
            reason: e.to_string(),
        })?;

        let device = self
            .find_peripheral(address)
            .await?
            .ok_or_else(|| TransportError::DeviceNotFound {
                address: identifier.to_string(),
            })?;

        device.connect().await?;
        device.discover_services().await?;

        let find = |uuid: Uuid| {
            device
                .characteristics()
                .into_iter()
                .find(|c| c.uuid == uuid && c.service_uuid == KM_SERVICE_UUID)
                .ok_or_else(|| TransportError::CharacteristicNotFound {
                    address: identifier.to_string(),
                    uuid,
                })
        };
        let tx = find(MOTOR_TX_UUID)?;
        let measurement = find(MOTOR_MEASUREMENT_UUID)?;

        debug!("Connected to {} (tx {}, measurement {})", address, tx.uuid, measurement.uuid);
        Ok(BleLink {
            device,
            tx,
            measurement,
        })
    }
}

pub struct BleLink {
    device: Peripheral,
    tx: Characteristic,
    measurement: Characteristic,
}

impl Link for BleLink {
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.device
            .write(&self.tx, frame, WriteType::WithResponse)
            .await?;
        Ok(())
    }

    async fn read_latest(&mut self) -> Result<Vec<u8>, TransportError> {
        Ok(self.device.read(&self.measurement).await?)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.device.is_connected().await? {
            self.device.disconnect().await?;
        } else {
            warn!("Peripheral {} already disconnected", self.device.address());
        }
        Ok(())
    }
}
