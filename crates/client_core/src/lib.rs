use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{Mode, UniversityId},
    protocol::{
        BandoRequest, BandoResult, ExamsReport, ExamsRequest, Shortlist, ShortlistRequest,
    },
};
use tracing::{debug, warn};

pub mod config;
pub mod error;
mod live;
mod mock;
pub mod session_store;
pub mod study_plan;
pub mod wizard;

pub use error::{FetchError, ValidationError};
pub use live::{LiveDataSource, UnavailableLiveSource};
pub use mock::{mock_bando, mock_exams, mock_shortlist, MockDataSource};
pub use session_store::{SessionStore, HOME_INSTITUTION_KEY};
pub use study_plan::StudyPlanFile;
pub use wizard::{
    Action, ActionKind, ActionOutcome, ActionTicket, FetchRequest, StageController, WizardState,
};

/// Where the wizard gets its data from. Mock and live implementations return
/// the same shapes so the stage controller cannot tell them apart.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn mode(&self) -> Mode;

    async fn lookup_bando(&self, request: &BandoRequest) -> Result<BandoResult, FetchError>;

    /// `study_plan` is present only when the upload profile requires the
    /// document; it switches the live encoding to multipart.
    async fn generate_shortlist(
        &self,
        request: &ShortlistRequest,
        study_plan: Option<&StudyPlanFile>,
    ) -> Result<Shortlist, FetchError>;

    async fn lookup_exams(
        &self,
        destination: &UniversityId,
        request: &ExamsRequest,
    ) -> Result<ExamsReport, FetchError>;
}

/// Executes begun actions against the data source matching the ticket's
/// mode. No retries: a failed action is only re-run by the user.
#[derive(Clone)]
pub struct ResultFetcher {
    live: Arc<dyn DataSource>,
    mock: Arc<dyn DataSource>,
}

impl ResultFetcher {
    pub fn new(live: Arc<dyn DataSource>, mock: Arc<dyn DataSource>) -> Self {
        Self { live, mock }
    }

    /// Builds both sources. An unusable API base does not prevent mock mode:
    /// live requests fail with [`FetchError::InvalidApiBase`] until the base
    /// is replaced through [`ResultFetcher::set_live`].
    pub fn from_settings(settings: &config::Settings) -> Self {
        let live: Arc<dyn DataSource> =
            match LiveDataSource::new(&settings.api_base, settings.request_timeout()) {
                Ok(live) => Arc::new(live),
                Err(err) => {
                    warn!(%err, "live backend disabled until the API base is fixed");
                    Arc::new(UnavailableLiveSource::new(&settings.api_base))
                }
            };
        Self::new(live, Arc::new(MockDataSource::new()))
    }

    /// Swaps the live backend, e.g. after the user changed the API base.
    pub fn set_live(&mut self, live: Arc<dyn DataSource>) {
        self.live = live;
    }

    pub fn source(&self, mode: Mode) -> &Arc<dyn DataSource> {
        match mode {
            Mode::Live => &self.live,
            Mode::Mock => &self.mock,
        }
    }

    pub async fn fetch(
        &self,
        ticket: ActionTicket,
        request: FetchRequest,
    ) -> Result<ActionOutcome, FetchError> {
        let source = self.source(ticket.mode());
        debug!(
            action = ticket.kind().as_str(),
            source = source.mode().as_str(),
            "dispatching action"
        );
        match request {
            FetchRequest::Bando(request) => source
                .lookup_bando(&request)
                .await
                .map(ActionOutcome::Bando),
            FetchRequest::Shortlist {
                request,
                study_plan,
            } => source
                .generate_shortlist(&request, study_plan.as_ref())
                .await
                .map(ActionOutcome::Shortlist),
            FetchRequest::Exams {
                destination,
                request,
            } => source
                .lookup_exams(&destination, &request)
                .await
                .map(ActionOutcome::Exams),
        }
    }

    /// Runs one action end to end on `controller`. A validation error means
    /// nothing was started; fetch failures end up in `last_error`.
    pub async fn run(
        &self,
        controller: &mut StageController,
        action: Action,
    ) -> Result<(), ValidationError> {
        let (ticket, request) = controller.begin_action(action)?;
        match self.fetch(ticket, request).await {
            Ok(outcome) => {
                controller.complete_action(ticket, outcome);
            }
            Err(err) => {
                controller.fail_action(ticket, err.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
