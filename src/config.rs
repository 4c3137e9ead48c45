//! Bridge configuration from the environment

use crate::controller::ControllerConfig;
use anyhow::{anyhow, Context, Result};
use brewlink_shared::encoder::Temperature;
use brewlink_shared::AuthKey;
use std::time::Duration;

pub const ADDRESS_VAR: &str = "BREWLINK_APPLIANCE_ADDRESS";
pub const MACHINE_KEY_VAR: &str = "BREWLINK_MACHINE_KEY";
pub const TEMPERATURE_VAR: &str = "BREWLINK_TEMPERATURE";
pub const AUTH_SETTLE_VAR: &str = "BREWLINK_AUTH_SETTLE_MS";
pub const COMMAND_SETTLE_VAR: &str = "BREWLINK_COMMAND_SETTLE_MS";
pub const LISTEN_VAR: &str = "BREWLINK_LISTEN";
pub const USER_VAR: &str = "BREWLINK_USER";
pub const DEVICE_VAR: &str = "BREWLINK_DEVICE";
pub const DEBUG_BREW_VAR: &str = "BREWLINK_DEBUG_BREW_SECS";

/// Configuration for the bridge daemon
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub controller: ControllerConfig,
    /// Address of the local intent listener
    pub listen_addr: String,
    /// Record seeded into the store at startup
    pub user_id: String,
    pub device_id: String,
    /// Brew once this long after startup
    pub debug_brew_after: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            listen_addr: "127.0.0.1:8090".into(),
            user_id: "local".into(),
            device_id: "coffee-machine".into(),
            debug_brew_after: None,
        }
    }
}

impl BridgeConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from defaults plus whatever `lookup` provides
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(address) = var(ADDRESS_VAR) {
            config.controller.appliance_address = address;
        }
        if let Some(hex) = var(MACHINE_KEY_VAR) {
            config.controller.auth_key = AuthKey::from_hex(hex.trim())
                .with_context(|| format!("{} is not a valid machine key", MACHINE_KEY_VAR))?;
        }
        if let Some(name) = var(TEMPERATURE_VAR) {
            config.controller.default_temperature = Temperature::from_name(&name)
                .ok_or_else(|| anyhow!("{}: unknown temperature {:?}", TEMPERATURE_VAR, name))?;
        }
        if let Some(ms) = var(AUTH_SETTLE_VAR) {
            config.controller.auth_settle_delay = parse_millis(AUTH_SETTLE_VAR, &ms)?;
        }
        if let Some(ms) = var(COMMAND_SETTLE_VAR) {
            config.controller.command_settle_delay = parse_millis(COMMAND_SETTLE_VAR, &ms)?;
        }
        if let Some(addr) = var(LISTEN_VAR) {
            config.listen_addr = addr;
        }
        if let Some(user) = var(USER_VAR) {
            config.user_id = user;
        }
        if let Some(device) = var(DEVICE_VAR) {
            config.device_id = device;
        }
        if let Some(secs) = var(DEBUG_BREW_VAR) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds", DEBUG_BREW_VAR))?;
            config.debug_brew_after = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn parse_millis(name: &str, value: &str) -> Result<Duration> {
    let ms: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a number of milliseconds", name))?;
    Ok(Duration::from_millis(ms))
}
