//! Execute intent handler

use super::HandlerContext;
use brewlink_shared::error::TRANSIENT_ERROR;
use brewlink_shared::gate;
use brewlink_shared::intent::CommandOutcome;
use brewlink_shared::{CookingMode, ExecutionRequest};
use tracing::{info, warn};

/// Gate the request, brew if it starts a brew, then persist and report.
///
/// The new state is only persisted once the appliance accepted the command.
/// A failed report turns the outcome into an error even though the new
/// state is already stored.
pub async fn handle_execute(
    ctx: &HandlerContext,
    user_id: &str,
    device_id: &str,
    execution: &ExecutionRequest,
) -> CommandOutcome {
    let ids = vec![device_id.to_string()];

    let record = match ctx.store.fetch(user_id, device_id).await {
        Ok(record) => record,
        Err(e) => {
            warn!("[EXEC] Fetch failed: {}", e);
            return CommandOutcome::error(ids, e.code());
        }
    };

    let new_state = match gate::evaluate(&record, execution) {
        Ok(state) => state,
        Err(e) => {
            info!("[GATE] Rejected {}: {}", device_id, e);
            return CommandOutcome::rejected(ids, &e);
        }
    };

    if new_state.cooking_mode == CookingMode::Brew {
        if let Err(e) = ctx.actuator.actuate(new_state.food_preset.as_deref()).await {
            warn!("[EXEC] Actuation failed: {}", e);
            return CommandOutcome::error(ids, e.code());
        }
    }

    if let Err(e) = ctx.store.persist(user_id, device_id, &new_state).await {
        warn!("[EXEC] Persist failed: {}", e);
        return CommandOutcome::error(ids, e.code());
    }

    // The brew already happened; the platform still learns it failed
    if let Err(e) = ctx.reporter.report_state(user_id, device_id, &new_state).await {
        warn!("[EXEC] Report state failed: {:#}", e);
        return CommandOutcome::error(ids, TRANSIENT_ERROR);
    }

    CommandOutcome::success(ids, Some(new_state))
}
