//! Sync intent handler

use super::HandlerContext;
use brewlink_shared::intent::{SyncPayload, SyncedDevice};
use brewlink_shared::StoreError;
use tracing::info;

/// Mark the account linked and describe every device it owns
pub async fn handle_sync(ctx: &HandlerContext, user_id: &str) -> Result<SyncPayload, StoreError> {
    ctx.store.set_linked(user_id, true).await?;

    let devices: Vec<SyncedDevice> = ctx
        .store
        .devices(user_id)
        .await?
        .iter()
        .map(|(id, record)| SyncedDevice::describe(id, record))
        .collect();
    info!("[EXEC] Synced {} device(s) for {}", devices.len(), user_id);

    Ok(SyncPayload {
        agent_user_id: user_id.to_string(),
        devices,
    })
}
