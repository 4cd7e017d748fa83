use shared::{domain::UniversityId, error::ApiError};
use thiserror::Error;

/// A precondition that failed before any request was attempted. These never
/// touch the wizard state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("another request is still in progress")]
    Busy,
    #[error("home institution is required")]
    MissingHomeInstitution,
    #[error("a bando must be found before generating the shortlist")]
    BandoNotFound,
    #[error("department is required")]
    MissingDepartment,
    #[error("study plan PDF is required")]
    MissingStudyPlan,
    #[error("study plan must be a PDF document (got {mime_type})")]
    UnsupportedFileType { mime_type: String },
    #[error("study plan PDF is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("cannot read study plan '{path}': {reason}")]
    UnreadableFile { path: String, reason: String },
    #[error("destination {0} is not in the current shortlist")]
    UnknownDestination(UniversityId),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid API base '{0}'")]
    InvalidApiBase(String),
    #[error("network error: {0}")]
    Transport(String),
    #[error("request failed with status {status}{}", detail_suffix(.detail))]
    Status {
        status: u16,
        detail: Option<ApiError>,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

fn detail_suffix(detail: &Option<ApiError>) -> String {
    match detail {
        Some(detail) => format!(": {}", detail.message),
        None => String::new(),
    }
}
