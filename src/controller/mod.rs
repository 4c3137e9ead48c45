//! Appliance controller
//!
//! Owns the single link to the coffee machine and drives it through the
//! authenticate-then-command choreography, one command at a time.

mod appliance;
#[cfg(test)]
pub mod testing;

pub use appliance::{ApplianceController, ControllerConfig};

use async_trait::async_trait;
use brewlink_shared::ControllerError;

/// Physical actuation as seen by the intent handlers
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Brew the given preset; unknown or missing presets use the default volume
    async fn actuate(&self, food_preset: Option<&str>) -> Result<(), ControllerError>;
}
