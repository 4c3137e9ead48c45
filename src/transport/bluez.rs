//! BlueZ backend for the BLE central capability

use super::{Advertisement, ApplianceCharacteristics, BleCentral, DisconnectSignal};
use anyhow::Result;
use async_trait::async_trait;
use bluer::gatt::remote::{Characteristic, CharacteristicWriteRequest};
use bluer::gatt::WriteOp;
use bluer::{Adapter, AdapterEvent, AdapterProperty, Device, DeviceEvent, DeviceProperty, Uuid};
use brewlink_shared::gatt::{CharacteristicPath, GattProfile};
use brewlink_shared::{timing, LinkError};
use futures::future;
use futures::stream::{BoxStream, StreamExt};
use std::time::Duration;
use tracing::{debug, info};

/// BLE central backed by the system's default BlueZ adapter
pub struct BluezCentral {
    adapter: Adapter,
}

impl BluezCentral {
    /// Open a session on the default adapter
    pub async fn new() -> Result<Self> {
        let session = bluer::Session::new().await?;
        let adapter = session.default_adapter().await?;
        info!("[BLE] Using adapter {}", adapter.name());
        Ok(Self { adapter })
    }
}

#[async_trait]
impl BleCentral for BluezCentral {
    type Peripheral = Device;
    type Characteristic = Characteristic;

    async fn power_on(&self) -> Result<(), LinkError> {
        // Subscribe before switching so the power event cannot be missed
        let events = self.adapter.events().await.map_err(adapter_error)?;
        tokio::pin!(events);

        self.adapter.set_powered(true).await.map_err(adapter_error)?;
        if self.adapter.is_powered().await.map_err(adapter_error)? {
            return Ok(());
        }

        while let Some(event) = events.next().await {
            if let AdapterEvent::PropertyChanged(AdapterProperty::Powered(true)) = event {
                return Ok(());
            }
        }

        Err(LinkError::Adapter(
            "adapter event stream ended before power-on".into(),
        ))
    }

    async fn start_scan(&self) -> Result<BoxStream<'static, Advertisement<Device>>, LinkError> {
        let events = self
            .adapter
            .discover_devices()
            .await
            .map_err(|e| LinkError::Scan(e.to_string()))?;

        let adapter = self.adapter.clone();
        let advertisements = events.filter_map(move |event| {
            let advertisement = match event {
                AdapterEvent::DeviceAdded(addr) => {
                    adapter.device(addr).ok().map(|peripheral| Advertisement {
                        address: addr.to_string(),
                        peripheral,
                    })
                }
                _ => None,
            };
            future::ready(advertisement)
        });

        Ok(advertisements.boxed())
    }

    async fn connect(&self, peripheral: &Device) -> Result<DisconnectSignal, LinkError> {
        let events = peripheral
            .events()
            .await
            .map_err(|e| LinkError::Connect(e.to_string()))?;
        peripheral
            .connect()
            .await
            .map_err(|e| LinkError::Connect(e.to_string()))?;

        let mut events = Box::pin(events);
        Ok(Box::pin(async move {
            // A closed event stream means the device object is gone
            while let Some(event) = events.next().await {
                if let DeviceEvent::PropertyChanged(DeviceProperty::Connected(false)) = event {
                    break;
                }
            }
        }))
    }

    async fn resolve(
        &self,
        peripheral: &Device,
        profile: &GattProfile,
    ) -> Result<ApplianceCharacteristics<Characteristic>, LinkError> {
        wait_services_resolved(peripheral).await?;

        let auth = find_characteristic(peripheral, &profile.auth).await?;
        let command = find_characteristic(peripheral, &profile.command).await?;
        Ok(ApplianceCharacteristics { auth, command })
    }

    async fn write(&self, characteristic: &Characteristic, data: &[u8]) -> Result<(), LinkError> {
        let mut request = CharacteristicWriteRequest::default();
        request.op_type = WriteOp::Command;
        characteristic
            .write_ext(data, &request)
            .await
            .map_err(|e| LinkError::Write(e.to_string()))
    }

    async fn disconnect(&self, peripheral: &Device) -> Result<(), LinkError> {
        peripheral
            .disconnect()
            .await
            .map_err(|e| LinkError::Disconnect(e.to_string()))
    }
}

fn adapter_error(e: bluer::Error) -> LinkError {
    LinkError::Adapter(e.to_string())
}

fn discovery_error(e: bluer::Error) -> LinkError {
    LinkError::Discovery(e.to_string())
}

fn parse_uuid(rendered: &str) -> Result<Uuid, LinkError> {
    Uuid::parse_str(rendered).map_err(|_| LinkError::InvalidUuid(rendered.to_string()))
}

/// BlueZ exposes GATT objects only after it has resolved services
async fn wait_services_resolved(device: &Device) -> Result<(), LinkError> {
    while !device
        .is_services_resolved()
        .await
        .map_err(discovery_error)?
    {
        tokio::time::sleep(Duration::from_millis(timing::SERVICES_POLL_MS)).await;
    }
    Ok(())
}

async fn find_characteristic(
    device: &Device,
    path: &CharacteristicPath,
) -> Result<Characteristic, LinkError> {
    let service_uuid = parse_uuid(&path.service)?;
    let characteristic_uuid = parse_uuid(&path.characteristic)?;

    for service in device.services().await.map_err(discovery_error)? {
        if service.uuid().await.map_err(discovery_error)? != service_uuid {
            continue;
        }

        for characteristic in service.characteristics().await.map_err(discovery_error)? {
            if characteristic.uuid().await.map_err(discovery_error)? == characteristic_uuid {
                debug!("[BLE] Resolved characteristic {}", path.characteristic);
                return Ok(characteristic);
            }
        }

        return Err(LinkError::CharacteristicNotFound {
            service: path.service.clone(),
            characteristic: path.characteristic.clone(),
        });
    }

    Err(LinkError::ServiceNotFound {
        service: path.service.clone(),
    })
}
