//! Intent executor - dispatches platform intents to their handlers

use super::handlers::{self, HandlerContext};
use crate::controller::Actuator;
use crate::storage::{DeviceStore, StateReporter};
use brewlink_shared::intent::{CommandOutcome, IntentRequest, IntentResponse};
use std::sync::Arc;
use tracing::info;

/// Executes intents forwarded by the request-handling front end
#[derive(Clone)]
pub struct IntentExecutor {
    ctx: HandlerContext,
}

impl IntentExecutor {
    pub fn new(
        store: Arc<dyn DeviceStore>,
        reporter: Arc<dyn StateReporter>,
        actuator: Arc<dyn Actuator>,
    ) -> Self {
        Self {
            ctx: HandlerContext {
                store,
                reporter,
                actuator,
            },
        }
    }

    /// Handle one intent and build its response
    pub async fn handle(&self, request: IntentRequest) -> IntentResponse {
        let request_id = request.request_id().to_string();
        let mut sync = None;

        let commands = match &request {
            IntentRequest::Execute {
                user_id,
                device_id,
                execution,
                ..
            } => {
                info!(
                    "[EXEC] Execute: request_id={} device={}",
                    request_id, device_id
                );
                vec![handlers::handle_execute(&self.ctx, user_id, device_id, execution).await]
            }
            IntentRequest::Query {
                user_id, device_id, ..
            } => {
                info!("[EXEC] Query: request_id={} device={}", request_id, device_id);
                vec![handlers::handle_query(&self.ctx, user_id, device_id).await]
            }
            IntentRequest::Update {
                user_id,
                device_id,
                patch,
                ..
            } => {
                info!("[EXEC] Update: request_id={} device={}", request_id, device_id);
                vec![handlers::handle_update(&self.ctx, user_id, device_id, patch).await]
            }
            IntentRequest::Sync { user_id, .. } => {
                info!("[EXEC] Sync: request_id={}", request_id);
                match handlers::handle_sync(&self.ctx, user_id).await {
                    Ok(payload) => {
                        sync = Some(payload);
                        Vec::new()
                    }
                    Err(e) => vec![CommandOutcome::error(Vec::new(), e.code())],
                }
            }
            IntentRequest::Disconnect { user_id, .. } => {
                info!("[EXEC] Disconnect: request_id={}", request_id);
                match handlers::handle_disconnect(&self.ctx, user_id).await {
                    Ok(_) => Vec::new(),
                    Err(e) => vec![CommandOutcome::error(Vec::new(), e.code())],
                }
            }
        };

        IntentResponse {
            request_id,
            commands,
            sync,
        }
    }
}
