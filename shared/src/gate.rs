//! Authorization Gate
//!
//! Decides whether an execution request may proceed against the device's
//! persisted authorization state and computes the resulting runtime state.
//!
//! Checks run in a fixed order and the first failure wins:
//! offline, persisted error, missing PIN, missing acknowledgement, wrong PIN.
//! The gate has no side effects; persisting the returned state is the
//! caller's job.

use crate::device::{
    ChallengeKind, ChallengeResponse, CommandKind, CookParams, CookingMode, DeviceRecord,
    DeviceRuntimeState, ExecutionRequest, NewDeviceState,
};
use crate::error::GateError;

/// Evaluate a request against a fetched device record
pub fn evaluate(
    record: &DeviceRecord,
    request: &ExecutionRequest,
) -> Result<NewDeviceState, GateError> {
    let state = &record.state;

    if !state.online {
        return Err(GateError::DeviceOffline);
    }

    if let Some(code) = state.error_code.as_deref().filter(|c| !c.is_empty()) {
        return Err(GateError::DeviceError(code.to_string()));
    }

    check_challenge(&record.challenge, request.challenge_response.as_ref())?;

    match &request.command {
        CommandKind::Cook => Ok(apply_cook(state, &request.params)),
        CommandKind::Unsupported(_) => Err(GateError::ActionNotAvailable),
    }
}

fn check_challenge(
    kind: &ChallengeKind,
    response: Option<&ChallengeResponse>,
) -> Result<(), GateError> {
    match (kind, response) {
        (ChallengeKind::None, _) => Ok(()),
        (ChallengeKind::Pin(_), None) => Err(GateError::PinNeeded),
        (ChallengeKind::Ack, None) => Err(GateError::AckNeeded),
        // A response without a PIN does not satisfy a PIN challenge
        (ChallengeKind::Pin(expected), Some(response)) => {
            if response.pin.as_deref() == Some(expected.as_str()) {
                Ok(())
            } else {
                Err(GateError::ChallengeFailedPinNeeded)
            }
        }
        (ChallengeKind::Ack, Some(_)) => Ok(()),
    }
}

fn apply_cook(current: &DeviceRuntimeState, params: &CookParams) -> NewDeviceState {
    if params.start {
        DeviceRuntimeState {
            online: true,
            error_code: None,
            cooking_mode: CookingMode::Brew,
            food_preset: params.food_preset.clone(),
            food_quantity: 1,
        }
    } else {
        DeviceRuntimeState {
            online: true,
            error_code: None,
            cooking_mode: CookingMode::None,
            food_preset: None,
            food_quantity: current.food_quantity,
        }
    }
}
