//! Stage controller for the three-step exchange wizard.
//!
//! [`StageController`] owns the single [`WizardState`] of a session. Every
//! mutation goes through its methods, which keep the stage watermark, the
//! loading flag and the downstream results consistent with each other.
//! Requests are begun here, executed elsewhere (see [`crate::ResultFetcher`])
//! and their outcome is handed back through [`StageController::complete_action`]
//! or [`StageController::fail_action`].

use shared::{
    domain::{Mode, Period, Stage, UniversityId, UploadProfile},
    protocol::{
        BandoRequest, BandoResult, Destination, ExamsReport, ExamsRequest, Shortlist,
        ShortlistRequest,
    },
};
use tracing::{debug, info, warn};

use crate::{error::ValidationError, study_plan::StudyPlanFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Bando,
    Shortlist,
    Exams(UniversityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Bando,
    Shortlist,
    Exams,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bando => "bando",
            Self::Shortlist => "shortlist",
            Self::Exams => "exams",
        }
    }
}

/// Handle for the one action in flight. Outcomes carrying a ticket that is
/// no longer current (the action was abandoned by a reset) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTicket {
    id: u64,
    kind: ActionKind,
    mode: Mode,
}

impl ActionTicket {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Data source chosen when the action began.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Snapshot of the inputs an action needs, taken when it begins.
#[derive(Debug, Clone)]
pub enum FetchRequest {
    Bando(BandoRequest),
    Shortlist {
        request: ShortlistRequest,
        study_plan: Option<StudyPlanFile>,
    },
    Exams {
        destination: UniversityId,
        request: ExamsRequest,
    },
}

impl FetchRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Bando(_) => ActionKind::Bando,
            Self::Shortlist { .. } => ActionKind::Shortlist,
            Self::Exams { .. } => ActionKind::Exams,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Bando(BandoResult),
    Shortlist(Shortlist),
    Exams(ExamsReport),
}

impl ActionOutcome {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Bando(_) => ActionKind::Bando,
            Self::Shortlist(_) => ActionKind::Shortlist,
            Self::Exams(_) => ActionKind::Exams,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub stage: Stage,
    pub mode: Mode,
    pub is_loading: bool,
    pub last_error: Option<String>,

    pub home_institution: String,
    pub department: String,
    pub period: Period,
    pub study_plan_text: String,
    pub study_plan_file: Option<StudyPlanFile>,

    pub bando_result: Option<BandoResult>,
    pub shortlist_result: Option<Shortlist>,
    selected: Option<usize>,
    pub exams_result: Option<ExamsReport>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            stage: Stage::Bando,
            mode: Mode::Live,
            is_loading: false,
            last_error: None,
            home_institution: String::new(),
            department: String::new(),
            period: Period::Fall,
            study_plan_text: String::new(),
            study_plan_file: None,
            bando_result: None,
            shortlist_result: None,
            selected: None,
            exams_result: None,
        }
    }
}

impl WizardState {
    /// Destination whose exams are shown. Always an entry of the current
    /// shortlist.
    pub fn selected_destination(&self) -> Option<&Destination> {
        let index = self.selected?;
        self.shortlist_result.as_ref()?.items.get(index)
    }

    /// Informational message for successful but negative outcomes. Distinct
    /// from `last_error`, which only reports failures.
    pub fn notice(&self) -> Option<String> {
        if self.is_loading || self.last_error.is_some() {
            return None;
        }
        if let Some(exams) = &self.exams_result {
            if exams.compatible_exams.is_empty() {
                return Some(
                    "No compatible exams found for the selected period.".to_string(),
                );
            }
        }
        if let Some(shortlist) = &self.shortlist_result {
            if shortlist.items.is_empty() {
                return Some(
                    "No destination satisfies the constraints of the call.".to_string(),
                );
            }
        }
        match &self.bando_result {
            Some(BandoResult::NotFound { message }) => {
                let mut notice = "No call found in the indexed documents.".to_string();
                if let Some(message) = message.as_deref().filter(|m| !m.trim().is_empty()) {
                    notice.push(' ');
                    notice.push_str(message);
                }
                Some(notice)
            }
            _ => None,
        }
    }

    fn clear_from(&mut self, stage: Stage) {
        if stage <= Stage::Bando {
            self.bando_result = None;
        }
        if stage <= Stage::Mete {
            self.shortlist_result = None;
        }
        self.selected = None;
        self.exams_result = None;
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingAction {
    ticket: ActionTicket,
    destination: Option<usize>,
}

#[derive(Debug)]
pub struct StageController {
    state: WizardState,
    profile: UploadProfile,
    pending: Option<PendingAction>,
    next_ticket: u64,
}

impl StageController {
    pub fn new(profile: UploadProfile) -> Self {
        Self {
            state: WizardState::default(),
            profile,
            pending: None,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.state.mode = mode;
    }

    pub fn set_home_institution(&mut self, value: impl Into<String>) {
        self.state.home_institution = value.into();
    }

    pub fn set_department(&mut self, value: impl Into<String>) {
        self.state.department = value.into();
    }

    pub fn set_period(&mut self, period: Period) {
        self.state.period = period;
    }

    pub fn set_study_plan_text(&mut self, value: impl Into<String>) {
        self.state.study_plan_text = value.into();
    }

    /// Attaches the study plan document. A rejected file leaves the state
    /// untouched, including any previously attached document.
    pub fn attach_study_plan(&mut self, file: StudyPlanFile) -> Result<(), ValidationError> {
        if let Err(err) = file.validate() {
            warn!(filename = file.filename(), %err, "rejected study plan");
            return Err(err);
        }
        debug!(
            filename = file.filename(),
            size = file.size_bytes(),
            "attached study plan"
        );
        self.state.study_plan_file = Some(file);
        Ok(())
    }

    pub fn detach_study_plan(&mut self) {
        self.state.study_plan_file = None;
    }

    pub fn check_bando(&self) -> Result<(), ValidationError> {
        if self.state.is_loading {
            return Err(ValidationError::Busy);
        }
        if self.state.home_institution.trim().is_empty() {
            return Err(ValidationError::MissingHomeInstitution);
        }
        Ok(())
    }

    pub fn check_shortlist(&self) -> Result<(), ValidationError> {
        if self.state.is_loading {
            return Err(ValidationError::Busy);
        }
        if !self
            .state
            .bando_result
            .as_ref()
            .is_some_and(BandoResult::is_found)
        {
            return Err(ValidationError::BandoNotFound);
        }
        if self.state.department.trim().is_empty() {
            return Err(ValidationError::MissingDepartment);
        }
        if self.profile.requires_file() && self.state.study_plan_file.is_none() {
            return Err(ValidationError::MissingStudyPlan);
        }
        Ok(())
    }

    pub fn check_exams(&self, candidate: &UniversityId) -> Result<usize, ValidationError> {
        if self.state.is_loading {
            return Err(ValidationError::Busy);
        }
        self.state
            .shortlist_result
            .as_ref()
            .and_then(|shortlist| shortlist.position(candidate))
            .ok_or_else(|| ValidationError::UnknownDestination(candidate.clone()))
    }

    pub fn can_request_bando(&self) -> bool {
        self.check_bando().is_ok()
    }

    pub fn can_request_shortlist(&self) -> bool {
        self.check_shortlist().is_ok()
    }

    pub fn can_request_exams(&self, candidate: &UniversityId) -> bool {
        self.check_exams(candidate).is_ok()
    }

    /// Validates the preconditions of `action`, marks the controller as
    /// loading and returns the request to execute. On error nothing changes.
    pub fn begin_action(
        &mut self,
        action: Action,
    ) -> Result<(ActionTicket, FetchRequest), ValidationError> {
        let (request, destination) = match action {
            Action::Bando => {
                self.check_bando()?;
                let request = FetchRequest::Bando(BandoRequest {
                    university_from: self.state.home_institution.trim().to_string(),
                });
                (request, None)
            }
            Action::Shortlist => {
                self.check_shortlist()?;
                let study_plan_text = Some(self.state.study_plan_text.trim())
                    .filter(|text| !text.is_empty())
                    .map(str::to_string);
                let study_plan = if self.profile.requires_file() {
                    self.state.study_plan_file.clone()
                } else {
                    None
                };
                let request = FetchRequest::Shortlist {
                    request: ShortlistRequest {
                        university_from: self.state.home_institution.trim().to_string(),
                        department: self.state.department.trim().to_string(),
                        period: self.state.period,
                        study_plan_text,
                    },
                    study_plan,
                };
                (request, None)
            }
            Action::Exams(candidate) => {
                let index = self.check_exams(&candidate)?;
                let request = FetchRequest::Exams {
                    destination: candidate,
                    request: ExamsRequest {
                        study_plan_text: self.state.study_plan_text.trim().to_string(),
                        period: self.state.period,
                    },
                };
                (request, Some(index))
            }
        };

        let ticket = ActionTicket {
            id: self.next_ticket,
            kind: request.kind(),
            mode: self.state.mode,
        };
        self.next_ticket += 1;
        self.pending = Some(PendingAction {
            ticket,
            destination,
        });
        self.state.is_loading = true;
        self.state.last_error = None;
        info!(
            action = ticket.kind.as_str(),
            mode = ticket.mode.as_str(),
            "action started"
        );
        Ok((ticket, request))
    }

    /// Applies a successful outcome. Returns `false` when the ticket is stale
    /// and the outcome was dropped.
    pub fn complete_action(&mut self, ticket: ActionTicket, outcome: ActionOutcome) -> bool {
        let Some(pending) = self.take_pending(ticket) else {
            return false;
        };
        if outcome.kind() != ticket.kind {
            warn!(
                expected = ticket.kind.as_str(),
                got = outcome.kind().as_str(),
                "outcome does not match the pending action"
            );
            self.state.is_loading = false;
            self.state.last_error = Some("unexpected response for the pending request".into());
            return true;
        }

        self.state.is_loading = false;
        self.state.last_error = None;
        match outcome {
            ActionOutcome::Bando(result) => {
                let found = result.is_found();
                self.state.clear_from(Stage::Mete);
                self.state.bando_result = Some(result);
                self.state.stage = if found { Stage::Mete } else { Stage::Bando };
            }
            ActionOutcome::Shortlist(shortlist) => {
                self.state.clear_from(Stage::Mete);
                self.state.shortlist_result = Some(shortlist);
                self.state.stage = Stage::Mete;
            }
            ActionOutcome::Exams(report) => {
                self.state.selected = pending.destination;
                self.state.exams_result = Some(report);
                self.state.stage = Stage::Esami;
            }
        }
        info!(
            action = ticket.kind.as_str(),
            stage = self.state.stage.label(),
            "action completed"
        );
        true
    }

    /// Records a failed action. Stage and earlier results stay as they were.
    pub fn fail_action(&mut self, ticket: ActionTicket, message: impl Into<String>) -> bool {
        if self.take_pending(ticket).is_none() {
            return false;
        }
        let message = message.into();
        warn!(action = ticket.kind.as_str(), error = %message, "action failed");
        self.state.is_loading = false;
        self.state.last_error = Some(message);
        true
    }

    /// Drops the results of `stage` and every later stage, together with the
    /// selection. The stage moves back to `stage` but never forward. An action
    /// still in flight is abandoned and its outcome will be ignored.
    pub fn reset_to_stage(&mut self, stage: Stage) {
        if let Some(pending) = self.pending.take() {
            debug!(
                action = pending.ticket.kind.as_str(),
                "abandoning in-flight action on reset"
            );
        }
        self.state.is_loading = false;
        self.state.last_error = None;
        self.state.clear_from(stage);
        self.state.stage = self.state.stage.min(stage);
    }

    fn take_pending(&mut self, ticket: ActionTicket) -> Option<PendingAction> {
        match self.pending {
            Some(pending) if pending.ticket == ticket => self.pending.take(),
            _ => {
                debug!(
                    action = ticket.kind.as_str(),
                    "ignoring outcome for a stale action"
                );
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
