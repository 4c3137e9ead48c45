//! Device records and execution requests
//!
//! Field names on the wire follow the voice platform's Cook trait
//! (`currentCookingMode`, `currentFoodPreset`, ...), so a runtime state can
//! be reported back verbatim.

use serde::{Deserialize, Serialize};

/// Name of a food preset, e.g. `"espresso"`
pub type PresetId = String;

/// Platform name of the only supported command
pub const COOK_COMMAND: &str = "action.devices.commands.Cook";

/// Secondary confirmation required before a device executes a command.
///
/// A device carries at most one challenge kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pin", rename_all = "lowercase")]
pub enum ChallengeKind {
    /// Execute unconditionally
    #[default]
    None,
    /// User must acknowledge the action
    Ack,
    /// User must supply the expected PIN
    Pin(String),
}

impl ChallengeKind {
    /// Interpret a stored `tfa` value: empty clears the challenge, `"ack"`
    /// requires acknowledgement, anything else is the expected PIN.
    pub fn from_tfa(tfa: &str) -> Self {
        match tfa {
            "" => ChallengeKind::None,
            "ack" => ChallengeKind::Ack,
            pin => ChallengeKind::Pin(pin.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CookingMode {
    #[default]
    None,
    Brew,
}

/// Runtime state persisted for a device and reported to the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRuntimeState {
    pub online: bool,
    #[serde(rename = "errorCode", default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(rename = "currentCookingMode", default)]
    pub cooking_mode: CookingMode,
    #[serde(rename = "currentFoodPreset", default, with = "preset_name")]
    pub food_preset: Option<PresetId>,
    #[serde(rename = "currentFoodQuantity", default)]
    pub food_quantity: u32,
}

/// State computed by the gate for a successful execution
pub type NewDeviceState = DeviceRuntimeState;

impl Default for DeviceRuntimeState {
    fn default() -> Self {
        Self {
            online: true,
            error_code: None,
            cooking_mode: CookingMode::None,
            food_preset: None,
            food_quantity: 0,
        }
    }
}

/// Hardware details shown by the platform
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
}

/// Spoken names for a preset in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodSynonyms {
    pub synonym: Vec<String>,
    pub lang: String,
}

/// A preset the platform may offer, in the Cook trait's attribute shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodPreset {
    pub food_preset_name: PresetId,
    #[serde(default)]
    pub supported_units: Vec<String>,
    #[serde(default)]
    pub food_synonyms: Vec<FoodSynonyms>,
}

/// How a device is presented to the platform on sync
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default_names: Vec<String>,
    #[serde(default)]
    pub nicknames: Vec<String>,
    #[serde(default)]
    pub device_info: DeviceInfo,
    #[serde(default)]
    pub food_presets: Vec<FoodPreset>,
    /// Id used for local execution, when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_device_id: Option<String>,
}

/// A device as held by the store: authorization state plus runtime state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub challenge: ChallengeKind,
    #[serde(default)]
    pub state: DeviceRuntimeState,
    #[serde(default)]
    pub description: DeviceDescription,
}

/// Partial update of a device record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatch {
    #[serde(default)]
    pub online: Option<bool>,
    /// Missing or empty clears the persisted error
    #[serde(default)]
    pub error_code: Option<String>,
    /// Missing leaves the challenge untouched, see [`ChallengeKind::from_tfa`]
    #[serde(default)]
    pub tfa: Option<String>,
    /// Replaces the runtime state wholesale
    #[serde(default)]
    pub states: Option<DeviceRuntimeState>,
    #[serde(default)]
    pub name: Option<String>,
    /// Replaces every nickname with this one
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub food_presets: Option<Vec<FoodPreset>>,
    /// Missing leaves it untouched, `null` disables local execution
    #[serde(
        default,
        deserialize_with = "explicit_null::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub local_device_id: Option<Option<String>>,
}

impl DevicePatch {
    /// Whether the platform must re-sync the user's devices after this patch
    pub fn needs_resync(&self) -> bool {
        self.local_device_id.is_some()
    }
}

impl DeviceRecord {
    /// Apply a patch in place
    pub fn apply(&mut self, patch: &DevicePatch) {
        if let Some(states) = &patch.states {
            self.state = states.clone();
        }
        if let Some(online) = patch.online {
            self.state.online = online;
        }
        self.state.error_code = patch
            .error_code
            .as_ref()
            .filter(|code| !code.is_empty())
            .cloned();
        if let Some(tfa) = &patch.tfa {
            self.challenge = ChallengeKind::from_tfa(tfa);
        }

        let description = &mut self.description;
        if let Some(name) = patch.name.as_ref().filter(|name| !name.is_empty()) {
            description.name = name.clone();
        }
        if let Some(nickname) = patch.nickname.as_ref().filter(|name| !name.is_empty()) {
            description.nicknames = vec![nickname.clone()];
        }
        if let Some(presets) = &patch.food_presets {
            description.food_presets = presets.clone();
        }
        if let Some(local_device_id) = &patch.local_device_id {
            description.local_device_id = local_device_id.clone();
        }
    }

    /// Reset runtime state without dropping the record
    pub fn reset(&mut self) {
        self.state = DeviceRuntimeState::default();
    }
}

/// Command named by an execution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommandKind {
    /// Start or stop brewing
    Cook,
    /// Anything the appliance cannot do
    Unsupported(String),
}

impl From<String> for CommandKind {
    fn from(name: String) -> Self {
        if name == COOK_COMMAND {
            CommandKind::Cook
        } else {
            CommandKind::Unsupported(name)
        }
    }
}

impl From<CommandKind> for String {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::Cook => COOK_COMMAND.to_string(),
            CommandKind::Unsupported(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookParams {
    #[serde(default)]
    pub start: bool,
    #[serde(default, deserialize_with = "preset_name::deserialize")]
    pub food_preset: Option<PresetId>,
}

/// User's answer to a challenge
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChallengeResponse {
    #[serde(default)]
    pub ack: bool,
    #[serde(default)]
    pub pin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub command: CommandKind,
    #[serde(default)]
    pub params: CookParams,
    #[serde(rename = "challenge", default, skip_serializing_if = "Option::is_none")]
    pub challenge_response: Option<ChallengeResponse>,
}

impl ExecutionRequest {
    /// Build a cook request
    pub fn cook(start: bool, food_preset: Option<&str>) -> Self {
        Self {
            command: CommandKind::Cook,
            params: CookParams {
                start,
                food_preset: food_preset.map(str::to_string),
            },
            challenge_response: None,
        }
    }

    /// Attach a challenge response
    pub fn with_challenge(mut self, response: ChallengeResponse) -> Self {
        self.challenge_response = Some(response);
        self
    }

    /// Attach a PIN challenge response
    pub fn with_pin(self, pin: &str) -> Self {
        self.with_challenge(ChallengeResponse {
            ack: false,
            pin: Some(pin.to_string()),
        })
    }
}

/// Tells a field sent as `null` apart from a missing one
mod explicit_null {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::deserialize(deserializer).map(Some)
    }
}

/// `None` travels as the platform's `"NONE"` preset
mod preset_name {
    use serde::{Deserialize, Deserializer, Serializer};

    const NONE: &str = "NONE";

    pub fn serialize<S>(preset: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(preset.as_deref().unwrap_or(NONE))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name: Option<String> = Option::deserialize(deserializer)?;
        Ok(name.filter(|n| n != NONE))
    }
}
