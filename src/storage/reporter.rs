//! Report channel for device state changes

use anyhow::Result;
use async_trait::async_trait;
use brewlink_shared::DeviceRuntimeState;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Pushes device state changes back to the voice platform
#[async_trait]
pub trait StateReporter: Send + Sync {
    async fn report_state(
        &self,
        user_id: &str,
        device_id: &str,
        state: &DeviceRuntimeState,
    ) -> Result<()>;

    /// Ask the platform to re-sync the user's device list
    async fn request_sync(&self, user_id: &str) -> Result<()>;
}

/// Reporter that writes each state report to the log
#[derive(Debug, Default)]
pub struct LogReporter {
    request_id: AtomicU64,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next report request id
    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl StateReporter for LogReporter {
    async fn report_state(
        &self,
        user_id: &str,
        device_id: &str,
        state: &DeviceRuntimeState,
    ) -> Result<()> {
        let report = serde_json::json!({
            "requestId": self.next_request_id().to_string(),
            "agentUserId": user_id,
            "payload": { "devices": { "states": { device_id: state } } },
        });
        info!("[INTENT] Report state {}", report);
        Ok(())
    }

    async fn request_sync(&self, user_id: &str) -> Result<()> {
        info!("[INTENT] Request sync for {}", user_id);
        Ok(())
    }
}
