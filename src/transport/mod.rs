//! Host BLE access for the appliance controller

pub mod bluez;
pub mod traits;

pub use bluez::BluezCentral;
pub use traits::{Advertisement, ApplianceCharacteristics, BleCentral, DisconnectSignal};
