//! Backend-to-prompt events and failure wording.

use client_core::{ActionOutcome, ActionTicket, FetchError, StudyPlanFile, ValidationError};

pub enum UiEvent {
    Error(String),
    ActionFinished {
        ticket: ActionTicket,
        result: Result<ActionOutcome, FetchError>,
    },
    StudyPlanLoaded(Result<StudyPlanFile, ValidationError>),
    ApiBaseChanged(String),
}

/// Message stored as the wizard's `last_error` for a failed request.
pub fn describe_fetch_failure(err: &FetchError) -> String {
    match err {
        FetchError::Transport(_) => format!(
            "{err}. The backend looks unreachable; check the API base (`api <url>`) or switch to mock data (`mock on`)."
        ),
        FetchError::Status { status, .. } if *status >= 500 => {
            format!("{err}. The backend had a problem, retry in a moment.")
        }
        _ => err.to_string(),
    }
}
