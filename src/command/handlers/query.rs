//! Query intent handler

use super::HandlerContext;
use brewlink_shared::intent::CommandOutcome;
use tracing::warn;

/// Report the stored runtime state; an unreadable record reads as offline
pub async fn handle_query(ctx: &HandlerContext, user_id: &str, device_id: &str) -> CommandOutcome {
    let ids = vec![device_id.to_string()];

    match ctx.store.fetch(user_id, device_id).await {
        Ok(record) => CommandOutcome::success(ids, Some(record.state)),
        Err(e) => {
            warn!("[EXEC] Query failed: {}", e);
            CommandOutcome::error(ids, "deviceOffline")
        }
    }
}
