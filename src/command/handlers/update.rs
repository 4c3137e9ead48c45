//! Update intent handler

use super::HandlerContext;
use brewlink_shared::intent::CommandOutcome;
use brewlink_shared::error::TRANSIENT_ERROR;
use brewlink_shared::DevicePatch;
use tracing::{debug, info, warn};

/// Apply an out-of-band patch and report the resulting state.
///
/// A changed local device id also asks the platform to re-sync.
pub async fn handle_update(
    ctx: &HandlerContext,
    user_id: &str,
    device_id: &str,
    patch: &DevicePatch,
) -> CommandOutcome {
    let ids = vec![device_id.to_string()];

    let record = match ctx.store.update(user_id, device_id, patch).await {
        Ok(record) => record,
        Err(e) => {
            warn!("[EXEC] Update failed: {}", e);
            return CommandOutcome::error(ids, e.code());
        }
    };
    info!("[EXEC] Updated {}", device_id);

    if patch.needs_resync() {
        if let Err(e) = request_sync(ctx, user_id).await {
            warn!("[EXEC] Request sync failed: {:#}", e);
            return CommandOutcome::error(ids, TRANSIENT_ERROR);
        }
    }

    if let Err(e) = ctx.reporter.report_state(user_id, device_id, &record.state).await {
        warn!("[EXEC] Report state failed: {:#}", e);
        return CommandOutcome::error(ids, TRANSIENT_ERROR);
    }

    CommandOutcome::success(ids, Some(record.state))
}

/// Only linked accounts can be re-synced
async fn request_sync(ctx: &HandlerContext, user_id: &str) -> anyhow::Result<()> {
    if !ctx.store.is_linked(user_id).await? {
        debug!("[EXEC] {} is not linked, skipping sync request", user_id);
        return Ok(());
    }
    ctx.reporter.request_sync(user_id).await
}
