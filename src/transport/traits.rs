//! BLE central capability used by the appliance controller

use async_trait::async_trait;
use brewlink_shared::gatt::GattProfile;
use brewlink_shared::LinkError;
use futures::future::BoxFuture;
use futures::stream::BoxStream;

/// A peripheral reported by a scan
pub struct Advertisement<P> {
    /// Hardware address as the host renders it
    pub address: String,
    pub peripheral: P,
}

/// Resolves once an open link drops, whoever closed it
pub type DisconnectSignal = BoxFuture<'static, ()>;

/// Characteristics resolved on one connection
pub struct ApplianceCharacteristics<C> {
    pub auth: C,
    pub command: C,
}

/// Operations the controller needs from the host BLE stack
#[async_trait]
pub trait BleCentral: Send + Sync + 'static {
    /// Handle to a discovered peripheral
    type Peripheral: Send + Sync + 'static;
    /// Handle to a resolved characteristic
    type Characteristic: Send + Sync + 'static;

    /// Power the adapter on and wait until it reports powered
    async fn power_on(&self) -> Result<(), LinkError>;

    /// Start scanning; scanning stops when the stream is dropped
    async fn start_scan(
        &self,
    ) -> Result<BoxStream<'static, Advertisement<Self::Peripheral>>, LinkError>;

    /// Open the link. The disconnect observer is registered before the
    /// link comes up, so no drop can be missed.
    async fn connect(&self, peripheral: &Self::Peripheral) -> Result<DisconnectSignal, LinkError>;

    /// Resolve the auth and command characteristics named by the profile
    async fn resolve(
        &self,
        peripheral: &Self::Peripheral,
        profile: &GattProfile,
    ) -> Result<ApplianceCharacteristics<Self::Characteristic>, LinkError>;

    /// Write without response
    async fn write(&self, characteristic: &Self::Characteristic, data: &[u8])
        -> Result<(), LinkError>;

    async fn disconnect(&self, peripheral: &Self::Peripheral) -> Result<(), LinkError>;
}
