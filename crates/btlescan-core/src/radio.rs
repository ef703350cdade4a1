//! The radio scanning seam.
//!
//! [`BleRadio`] abstracts the physical scanning radio so the coordinator
//! can be exercised against [`MockRadio`](crate::mock::MockRadio) in tests.
//! [`BtleplugRadio`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _, Peripheral as _, PeripheralProperties, ScanFilter};
use btleplug::platform::{Adapter, Manager};
use tokio::time::sleep;
use tracing::{debug, info};
use uuid::Uuid;

use btlescan_types::{AddressType, AdvertisementRecord, gap};

use crate::error::{Error, Result};

/// Tail of the Bluetooth base UUID, `xxxxxxxx-0000-1000-8000-00805f9b34fb`.
const BASE_UUID_TAIL: u128 = 0x0000_1000_8000_00805f9b34fb;

/// A passive advertisement scanner.
///
/// One scan is a single blocking operation: listen for the given timeout,
/// then report every advertisement observed. Implementations must raise
/// [`Error::Management`] for adapter faults (reset, permission failure) so
/// the coordinator can count them; anything else propagates as-is.
#[async_trait]
pub trait BleRadio: Send + Sync {
    /// Listen for advertisements for `timeout`, without initiating any
    /// connections, and return the observed records.
    async fn passive_scan(&self, timeout: Duration) -> Result<Vec<AdvertisementRecord>>;
}

/// btleplug-backed radio.
///
/// The scan only listens and collects advertisement reports; no connection
/// requests are ever initiated, keeping power draw and radio visibility
/// minimal.
pub struct BtleplugRadio {
    adapter: Adapter,
}

impl BtleplugRadio {
    /// Acquire the first available Bluetooth adapter.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters.into_iter().next().ok_or(Error::NoAdapter)?;
        Ok(Self { adapter })
    }

    /// Wrap an already-acquired adapter.
    pub fn with_adapter(adapter: Adapter) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl BleRadio for BtleplugRadio {
    async fn passive_scan(&self, timeout: Duration) -> Result<Vec<AdvertisementRecord>> {
        info!("Starting passive BLE scan for {} seconds", timeout.as_secs());

        // Adapter faults at scan start/stop are the management failures the
        // error counter exists for.
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| Error::management(e.to_string()))?;

        sleep(timeout).await;

        self.adapter
            .stop_scan()
            .await
            .map_err(|e| Error::management(e.to_string()))?;

        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| Error::management(e.to_string()))?;

        let mut records = Vec::new();
        for peripheral in peripherals {
            match peripheral.properties().await {
                Ok(Some(properties)) => records.push(record_from_properties(&properties)),
                Ok(None) => {}
                Err(e) => {
                    debug!("Error reading peripheral properties: {}", e);
                }
            }
        }

        info!("Scan complete, {} advertisement(s) observed", records.len());
        Ok(records)
    }
}

/// Map stack-level peripheral properties back onto GAP AD fields.
///
/// An unreported address type is treated as `random`: an address we cannot
/// classify must not be trusted as stable.
pub fn record_from_properties(properties: &PeripheralProperties) -> AdvertisementRecord {
    let addr_type = match properties.address_type {
        Some(btleplug::api::AddressType::Public) => AddressType::Public,
        _ => AddressType::Random,
    };

    let mut record = AdvertisementRecord::new(properties.address.to_string(), addr_type);
    record.rssi = properties.rssi;

    if let Some(name) = &properties.local_name {
        record
            .fields
            .insert(gap::COMPLETE_LOCAL_NAME, name.as_bytes().to_vec());
    }

    if let Some(level) = properties.tx_power_level {
        let level = level.clamp(i8::MIN as i16, i8::MAX as i16) as i8;
        record.fields.insert(gap::TX_POWER, vec![level as u8]);
    }

    // The platform stack hands back one map of manufacturer data; re-attach
    // the company identifier octets the way they appear on the air. With
    // multiple vendors present, the lowest identifier wins deterministically.
    if let Some((&id, data)) = properties.manufacturer_data.iter().min_by_key(|(id, _)| **id) {
        let mut value = id.to_le_bytes().to_vec();
        value.extend_from_slice(data);
        record.fields.insert(gap::MANUFACTURER_SPECIFIC, value);
    }

    // Advertised service UUIDs, split by width, little-endian as on the air.
    let mut services16 = Vec::new();
    let mut services128 = Vec::new();
    for service in &properties.services {
        match uuid16(service) {
            Some(short) => services16.extend_from_slice(&short.to_le_bytes()),
            None => {
                let mut bytes = *service.as_bytes();
                bytes.reverse();
                services128.extend_from_slice(&bytes);
            }
        }
    }
    if !services16.is_empty() {
        record.fields.insert(gap::INCOMPLETE_SERVICES_16, services16);
    }
    if !services128.is_empty() {
        record
            .fields
            .insert(gap::INCOMPLETE_SERVICES_128, services128);
    }

    record
}

/// The 16-bit form of a UUID built on the Bluetooth base, if it is one.
fn uuid16(uuid: &Uuid) -> Option<u16> {
    let value = uuid.as_u128();
    let prefix = value >> 96;
    if value & ((1u128 << 96) - 1) == BASE_UUID_TAIL && prefix <= u16::MAX as u128 {
        Some(prefix as u16)
    } else {
        None
    }
}
