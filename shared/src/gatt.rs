//! GATT identifiers of the appliance
//!
//! The appliance exposes two services: one holding the authentication
//! characteristic and one holding the command characteristic. Host BLE
//! stacks render UUIDs differently (BlueZ hyphenated, CoreBluetooth compact
//! hex), so the profile is rendered once for the host at startup.

use uuid::Uuid;

pub const AUTH_SERVICE_UUID: Uuid = Uuid::from_u128(0x06aa1910_f22a_11e3_9daa_0002a5d5c51b);
pub const AUTH_CHARACTERISTIC_UUID: Uuid = Uuid::from_u128(0x06aa3a41_f22a_11e3_9daa_0002a5d5c51b);
pub const COMMAND_SERVICE_UUID: Uuid = Uuid::from_u128(0x06aa1920_f22a_11e3_9daa_0002a5d5c51b);
pub const COMMAND_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x06aa3a42_f22a_11e3_9daa_0002a5d5c51b);

/// Textual UUID form used by the host's BLE stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidStyle {
    /// `06aa1910-f22a-11e3-9daa-0002a5d5c51b`
    Hyphenated,
    /// `06aa1910f22a11e39daa0002a5d5c51b`
    Compact,
}

impl UuidStyle {
    /// Style for the platform this binary was built for
    pub fn for_host() -> Self {
        if cfg!(target_os = "macos") {
            UuidStyle::Compact
        } else {
            UuidStyle::Hyphenated
        }
    }

    pub fn render(self, uuid: &Uuid) -> String {
        match self {
            UuidStyle::Hyphenated => uuid.hyphenated().to_string(),
            UuidStyle::Compact => uuid.simple().to_string(),
        }
    }
}

/// A characteristic addressed by its service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicPath {
    pub service: String,
    pub characteristic: String,
}

impl CharacteristicPath {
    fn render(style: UuidStyle, service: &Uuid, characteristic: &Uuid) -> Self {
        Self {
            service: style.render(service),
            characteristic: style.render(characteristic),
        }
    }

    /// Compare against identifiers reported by the host
    pub fn matches(&self, service: &str, characteristic: &str) -> bool {
        self.service.eq_ignore_ascii_case(service)
            && self.characteristic.eq_ignore_ascii_case(characteristic)
    }
}

/// Identifiers the controller resolves on every connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattProfile {
    pub style: UuidStyle,
    pub auth: CharacteristicPath,
    pub command: CharacteristicPath,
}

impl GattProfile {
    pub fn new(style: UuidStyle) -> Self {
        Self {
            style,
            auth: CharacteristicPath::render(style, &AUTH_SERVICE_UUID, &AUTH_CHARACTERISTIC_UUID),
            command: CharacteristicPath::render(
                style,
                &COMMAND_SERVICE_UUID,
                &COMMAND_CHARACTERISTIC_UUID,
            ),
        }
    }

    pub fn for_host() -> Self {
        Self::new(UuidStyle::for_host())
    }
}

impl Default for GattProfile {
    fn default() -> Self {
        Self::for_host()
    }
}
