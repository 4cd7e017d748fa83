//! Command orchestration from prompt input to the backend command queue.

use client_core::{ActionOutcome, ActionTicket, FetchError, StageController};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::describe_fetch_failure;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), String> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued prompt->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err("Command queue is full; please retry".to_string()),
        Err(TrySendError::Disconnected(_)) => {
            Err("Backend worker disconnected (possible startup failure); restart the help desk"
                .to_string())
        }
    }
}

/// Hands a finished request back to the controller. Returns `false` when the
/// outcome belonged to an abandoned action.
pub fn settle_action(
    controller: &mut StageController,
    ticket: ActionTicket,
    result: Result<ActionOutcome, FetchError>,
) -> bool {
    match result {
        Ok(outcome) => controller.complete_action(ticket, outcome),
        Err(err) => controller.fail_action(ticket, describe_fetch_failure(&err)),
    }
}
