//! Intent messages exchanged with the request-handling front end
//!
//! Outcomes mirror the voice platform's per-device command results, so the
//! front end can forward them without reinterpretation.

use serde::{Deserialize, Serialize};

use crate::device::{
    CookingMode, DeviceInfo, DevicePatch, DeviceRecord, DeviceRuntimeState, ExecutionRequest,
    FoodPreset,
};
use crate::error::{ChallengeType, GateError};

/// Error code the platform uses for every challenge
pub const CHALLENGE_NEEDED: &str = "challengeNeeded";

/// Platform type every synced device is announced as
pub const DEVICE_TYPE: &str = "action.devices.types.COFFEE_MAKER";

/// Platform traits every synced device supports
pub const DEVICE_TRAITS: [&str; 1] = ["action.devices.traits.Cook"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "camelCase")]
pub enum IntentRequest {
    #[serde(rename_all = "camelCase")]
    Execute {
        request_id: String,
        user_id: String,
        device_id: String,
        execution: ExecutionRequest,
    },
    #[serde(rename_all = "camelCase")]
    Query {
        request_id: String,
        user_id: String,
        device_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        request_id: String,
        user_id: String,
        device_id: String,
        patch: DevicePatch,
    },
    #[serde(rename_all = "camelCase")]
    Sync { request_id: String, user_id: String },
    #[serde(rename_all = "camelCase")]
    Disconnect { request_id: String, user_id: String },
}

impl IntentRequest {
    pub fn request_id(&self) -> &str {
        match self {
            IntentRequest::Execute { request_id, .. }
            | IntentRequest::Query { request_id, .. }
            | IntentRequest::Update { request_id, .. }
            | IntentRequest::Sync { request_id, .. }
            | IntentRequest::Disconnect { request_id, .. } => request_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeNeeded {
    #[serde(rename = "type")]
    pub kind: ChallengeType,
}

/// Result for one set of devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub ids: Vec<String>,
    pub status: CommandStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<DeviceRuntimeState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_needed: Option<ChallengeNeeded>,
}

impl CommandOutcome {
    pub fn success(ids: Vec<String>, states: Option<DeviceRuntimeState>) -> Self {
        Self {
            ids,
            status: CommandStatus::Success,
            states,
            error_code: None,
            challenge_needed: None,
        }
    }

    pub fn error(ids: Vec<String>, code: impl Into<String>) -> Self {
        Self {
            ids,
            status: CommandStatus::Error,
            states: None,
            error_code: Some(code.into()),
            challenge_needed: None,
        }
    }

    /// Map a gate rejection, turning challenge errors into `challengeNeeded`
    pub fn rejected(ids: Vec<String>, error: &GateError) -> Self {
        match error.challenge() {
            Some(kind) => Self {
                challenge_needed: Some(ChallengeNeeded { kind }),
                ..Self::error(ids, CHALLENGE_NEEDED)
            },
            None => Self::error(ids, error.code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedName {
    pub name: String,
    pub default_names: Vec<String>,
    pub nicknames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookAttributes {
    pub food_presets: Vec<FoodPreset>,
    pub supported_cooking_modes: Vec<CookingMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherDeviceId {
    pub device_id: String,
}

/// One device as announced to the platform on sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedDevice {
    pub id: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub traits: Vec<String>,
    pub name: SyncedName,
    pub device_info: DeviceInfo,
    pub will_report_state: bool,
    pub attributes: CookAttributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_device_ids: Vec<OtherDeviceId>,
}

impl SyncedDevice {
    pub fn describe(id: &str, record: &DeviceRecord) -> Self {
        let description = &record.description;
        Self {
            id: id.to_string(),
            device_type: DEVICE_TYPE.to_string(),
            traits: DEVICE_TRAITS.iter().map(|t| t.to_string()).collect(),
            name: SyncedName {
                name: description.name.clone(),
                default_names: description.default_names.clone(),
                nicknames: description.nicknames.clone(),
            },
            device_info: description.device_info.clone(),
            will_report_state: true,
            attributes: CookAttributes {
                food_presets: description.food_presets.clone(),
                supported_cooking_modes: vec![CookingMode::Brew],
            },
            other_device_ids: description
                .local_device_id
                .iter()
                .map(|device_id| OtherDeviceId {
                    device_id: device_id.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub agent_user_id: String,
    pub devices: Vec<SyncedDevice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub request_id: String,
    pub commands: Vec<CommandOutcome>,
    /// Present only in answer to a sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncPayload>,
}
