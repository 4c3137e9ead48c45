//! Intent handlers

mod disconnect;
mod execute;
mod query;
mod sync;
mod update;

pub use disconnect::handle_disconnect;
pub use execute::handle_execute;
pub use query::handle_query;
pub use sync::handle_sync;
pub use update::handle_update;

use crate::controller::Actuator;
use crate::storage::{DeviceStore, StateReporter};
use std::sync::Arc;

/// Collaborators shared by every handler
#[derive(Clone)]
pub struct HandlerContext {
    pub store: Arc<dyn DeviceStore>,
    pub reporter: Arc<dyn StateReporter>,
    pub actuator: Arc<dyn Actuator>,
}
