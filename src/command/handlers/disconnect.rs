//! Disconnect intent handler

use super::HandlerContext;
use brewlink_shared::StoreError;
use tracing::info;

/// Unlink the account and reset every device of the user; records are kept
pub async fn handle_disconnect(ctx: &HandlerContext, user_id: &str) -> Result<usize, StoreError> {
    ctx.store.set_linked(user_id, false).await?;
    let reset = ctx.store.reset_user(user_id).await?;
    info!("[EXEC] User {} disconnected, {} device(s) reset", user_id, reset);
    Ok(reset)
}
