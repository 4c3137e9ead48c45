//! Intent execution for the bridge
//!
//! This module handles:
//! - Dispatching platform intents to the matching handler
//! - Running execute requests through the authorization gate
//! - Driving the appliance for brew commands
//! - Persisting and reporting the resulting device state

mod executor;
pub mod handlers;

pub use executor::IntentExecutor;
