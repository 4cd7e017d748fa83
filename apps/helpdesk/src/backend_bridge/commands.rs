//! Backend commands queued from the prompt to the backend worker.

use std::path::PathBuf;

use client_core::{ActionTicket, FetchRequest};

pub enum BackendCommand {
    Fetch {
        ticket: ActionTicket,
        request: FetchRequest,
    },
    LoadStudyPlan {
        path: PathBuf,
    },
    SetApiBase {
        api_base: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fetch { ticket, .. } => ticket.kind().as_str(),
            Self::LoadStudyPlan { .. } => "load_study_plan",
            Self::SetApiBase { .. } => "set_api_base",
        }
    }
}
