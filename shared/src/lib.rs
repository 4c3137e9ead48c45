//! Brewlink Shared Types
//!
//! This crate provides the device model, the authorization gate, the brew
//! command encoding and the appliance link state machine used by the bridge
//! daemon. Nothing in here performs I/O.

pub mod address;
pub mod auth;
pub mod codec;
pub mod device;
pub mod encoder;
pub mod error;
pub mod gate;
pub mod gatt;
pub mod intent;
pub mod state_machine;

pub use auth::AuthKey;
pub use device::{
    ChallengeKind, ChallengeResponse, CommandKind, CookParams, CookingMode, DeviceDescription,
    DeviceInfo, DevicePatch, DeviceRecord, DeviceRuntimeState, ExecutionRequest, FoodPreset,
    FoodSynonyms, NewDeviceState, PresetId,
};
pub use error::{ChallengeType, ControllerError, GateError, LinkError, StoreError};

/// Fixed parameters of the appliance protocol
pub mod appliance {
    /// Hardware address of the appliance this bridge drives
    pub const DEFAULT_ADDRESS: &str = "E9:C6:DD:63:48:D2";

    /// Factory authentication key, hex encoded
    pub const DEFAULT_AUTH_KEY_HEX: &str = "8f9fdd9fac836416";

    /// Length of the authentication key in bytes
    pub const AUTH_KEY_LEN: usize = 8;

    /// Temperature used when a request does not name one
    pub const DEFAULT_TEMPERATURE: &str = "muito quente";
}

/// Timing parameters for the link choreography
///
/// The settle delays give the appliance time to process a write. They are
/// not acknowledgements: the protocol never confirms either write.
pub mod timing {
    /// Delay between entering authentication and writing the brew command
    pub const AUTH_SETTLE_MS: u64 = 1000;

    /// Delay between the brew command write and closing the link
    pub const COMMAND_SETTLE_MS: u64 = 1000;

    /// Back-off before rescanning after a failed discovery
    pub const SCAN_RETRY_MS: u64 = 5000;

    /// Poll interval while waiting for the host to resolve GATT services
    pub const SERVICES_POLL_MS: u64 = 100;
}
