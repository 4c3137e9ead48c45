//! Error taxonomy for the gate, the appliance link and the device store
//!
//! Every error maps to a stable platform error code through `code()`. The
//! three challenge errors are kept distinct: the platform re-prompts the
//! user differently for each.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform code for every physical-layer failure
pub const DEVICE_UNREACHABLE: &str = "deviceUnreachable";

/// Platform code for failures the user may retry
pub const TRANSIENT_ERROR: &str = "transientError";

/// Challenge the platform must present to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeType {
    PinNeeded,
    AckNeeded,
    ChallengeFailedPinNeeded,
}

impl ChallengeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeType::PinNeeded => "pinNeeded",
            ChallengeType::AckNeeded => "ackNeeded",
            ChallengeType::ChallengeFailedPinNeeded => "challengeFailedPinNeeded",
        }
    }
}

/// Reasons the gate rejects an execution request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("device is offline")]
    DeviceOffline,

    /// Persisted device error, propagated verbatim
    #[error("device reported error: {0}")]
    DeviceError(String),

    #[error("PIN required")]
    PinNeeded,

    #[error("acknowledgement required")]
    AckNeeded,

    #[error("PIN did not match")]
    ChallengeFailedPinNeeded,

    #[error("action not available on this device")]
    ActionNotAvailable,
}

impl GateError {
    /// Platform error code
    pub fn code(&self) -> &str {
        match self {
            GateError::DeviceOffline => "deviceOffline",
            GateError::DeviceError(code) => code,
            GateError::PinNeeded => ChallengeType::PinNeeded.as_str(),
            GateError::AckNeeded => ChallengeType::AckNeeded.as_str(),
            GateError::ChallengeFailedPinNeeded => ChallengeType::ChallengeFailedPinNeeded.as_str(),
            GateError::ActionNotAvailable => "actionNotAvailable",
        }
    }

    /// Challenge to present, if this error asks the user for one
    pub fn challenge(&self) -> Option<ChallengeType> {
        match self {
            GateError::PinNeeded => Some(ChallengeType::PinNeeded),
            GateError::AckNeeded => Some(ChallengeType::AckNeeded),
            GateError::ChallengeFailedPinNeeded => Some(ChallengeType::ChallengeFailedPinNeeded),
            _ => None,
        }
    }
}

/// Failures reported by a BLE backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("Bluetooth adapter unavailable: {0}")]
    Adapter(String),

    #[error("Scan failed: {0}")]
    Scan(String),

    #[error("Connect failed: {0}")]
    Connect(String),

    #[error("Invalid UUID in GATT profile: {0}")]
    InvalidUuid(String),

    #[error("GATT discovery failed: {0}")]
    Discovery(String),

    #[error("Service {service} not found")]
    ServiceNotFound { service: String },

    #[error("Characteristic {characteristic} not found in service {service}")]
    CharacteristicNotFound {
        service: String,
        characteristic: String,
    },

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Disconnect failed: {0}")]
    Disconnect(String),
}

/// Failures of an `actuate` call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("appliance has not been discovered yet")]
    NotReady,

    #[error("another command is already in flight")]
    Busy,

    #[error("service discovery failed: {0}")]
    ServiceDiscoveryFailed(LinkError),

    #[error("appliance disconnected mid-sequence")]
    Disconnected,

    #[error(transparent)]
    Link(#[from] LinkError),
}

impl ControllerError {
    /// Platform error code
    pub fn code(&self) -> &'static str {
        match self {
            ControllerError::Busy => "deviceBusy",
            _ => DEVICE_UNREACHABLE,
        }
    }
}

/// Failures of the device store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The user never created an account, so there are no devices
    #[error("user {user} has no account")]
    UnknownUser { user: String },

    #[error("device {device} not found for user {user}")]
    NotFound { user: String, device: String },

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Platform error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownUser { .. } => "authFailure",
            StoreError::NotFound { .. } => "deviceNotFound",
            StoreError::Backend(_) => TRANSIENT_ERROR,
        }
    }
}
