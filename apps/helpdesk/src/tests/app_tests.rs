use std::sync::Arc;

use async_trait::async_trait;
use client_core::{DataSource, FetchError, MockDataSource, ResultFetcher, StudyPlanFile};
use crossbeam_channel::bounded;
use shared::{
    domain::UploadProfile,
    protocol::{
        BandoRequest, BandoResult, ExamsReport, ExamsRequest, Shortlist, ShortlistRequest,
    },
};

use super::*;
use crate::backend_bridge::runtime::spawn_backend_thread;

const API_BASE: &str = "http://127.0.0.1:8000/";

/// Mock backend that has no call indexed for any institution.
struct NoCallSource;

#[async_trait]
impl DataSource for NoCallSource {
    fn mode(&self) -> Mode {
        Mode::Mock
    }

    async fn lookup_bando(&self, _request: &BandoRequest) -> Result<BandoResult, FetchError> {
        Ok(BandoResult::NotFound { message: None })
    }

    async fn generate_shortlist(
        &self,
        _request: &ShortlistRequest,
        _study_plan: Option<&StudyPlanFile>,
    ) -> Result<Shortlist, FetchError> {
        Ok(Shortlist::default())
    }

    async fn lookup_exams(
        &self,
        destination: &UniversityId,
        _request: &ExamsRequest,
    ) -> Result<ExamsReport, FetchError> {
        Err(FetchError::Malformed(format!("no exams for {destination}")))
    }
}

fn app_with_source(
    profile: UploadProfile,
    session: SessionStore,
    config_path: Option<PathBuf>,
    mock: Arc<dyn DataSource>,
) -> HelpDeskApp {
    let fetcher = ResultFetcher::new(Arc::new(MockDataSource::instant()), mock);
    let (cmd_tx, cmd_rx) = bounded(4);
    let (ui_tx, ui_rx) = bounded(4);
    spawn_backend_thread(fetcher, None, cmd_rx, ui_tx);

    let mut controller = StageController::new(profile);
    controller.set_mode(Mode::Mock);
    HelpDeskApp::new(
        controller,
        session,
        API_BASE.to_string(),
        config_path,
        cmd_tx,
        ui_rx,
    )
}

fn app_with(
    profile: UploadProfile,
    session: SessionStore,
    config_path: Option<PathBuf>,
) -> HelpDeskApp {
    app_with_source(
        profile,
        session,
        config_path,
        Arc::new(MockDataSource::instant()),
    )
}

fn run_script(app: &mut HelpDeskApp, script: &str) -> String {
    let mut out = Vec::new();
    app.run(script.as_bytes(), &mut out).expect("run script");
    String::from_utf8(out).expect("utf8 output")
}

#[test]
fn text_only_walkthrough_reaches_exams() {
    let mut app = app_with(UploadProfile::TextOnly, SessionStore::in_memory(), None);
    let output = run_script(
        &mut app,
        "home Università di Pisa\nbando\ndept AI\nshortlist\nexams 2\nquit\n",
    );

    let state = app.controller.state();
    assert_eq!(state.stage, Stage::Esami);
    assert_eq!(
        state
            .selected_destination()
            .map(|item| item.id_university.as_str()),
        Some("TUM")
    );
    assert!(output.contains("Call found"));
    assert!(output.contains("Shortlist (2 destinations)"));
    assert!(output.contains("Exams at TUM (Munich), Fall semester"));
    assert_eq!(app.session.get(HOME_INSTITUTION_KEY), "Università di Pisa");
}

#[test]
fn bando_without_home_institution_is_rejected_locally() {
    let mut app = app_with(UploadProfile::PdfRequired, SessionStore::in_memory(), None);
    let output = run_script(&mut app, "bando\n");

    assert!(output.contains("Enter your home institution first"));
    assert!(app.controller.state().bando_result.is_none());
    assert!(!app.controller.state().is_loading);
}

#[test]
fn attaching_a_pdf_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf = dir.path().join("piano.pdf");
    std::fs::write(&pdf, b"%PDF-1.7").expect("write pdf");
    let notes = dir.path().join("piano.txt");
    std::fs::write(&notes, b"notes").expect("write txt");

    let mut app = app_with(UploadProfile::PdfRequired, SessionStore::in_memory(), None);
    let output = run_script(
        &mut app,
        &format!("attach {}\nattach {}\n", pdf.display(), notes.display()),
    );

    assert!(output.contains("Attached piano.pdf."));
    assert!(output.contains("Study plan not attached"));
    let attached = app
        .controller
        .state()
        .study_plan_file
        .as_ref()
        .expect("pdf stays attached");
    assert_eq!(attached.filename(), "piano.pdf");
}

#[test]
fn pdf_profile_shortlist_needs_the_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf = dir.path().join("piano.pdf");
    std::fs::write(&pdf, b"%PDF-1.7").expect("write pdf");

    let mut app = app_with(UploadProfile::PdfRequired, SessionStore::in_memory(), None);
    let output = run_script(&mut app, "home Pisa\nbando\ndept AI\nshortlist\n");
    assert!(output.contains("Attach your study plan PDF first"));
    assert!(app.controller.state().shortlist_result.is_none());

    run_script(&mut app, &format!("attach {}\nshortlist\n", pdf.display()));
    assert!(app.controller.state().shortlist_result.is_some());
}

#[test]
fn remembered_home_institution_is_restored_and_forgotten_on_start_over() {
    let session = SessionStore::in_memory();
    session.set(HOME_INSTITUTION_KEY, "Politecnico di Milano");

    let mut app = app_with(UploadProfile::TextOnly, session, None);
    assert_eq!(
        app.controller.state().home_institution,
        "Politecnico di Milano"
    );

    run_script(&mut app, "bando\nstart-over\n");
    assert_eq!(app.controller.state().stage, Stage::Bando);
    assert!(app.controller.state().bando_result.is_none());
    assert_eq!(app.controller.state().home_institution, "");
    assert_eq!(app.session.get(HOME_INSTITUTION_KEY), "");
}

#[test]
fn reset_goes_back_without_losing_inputs() {
    let mut app = app_with(UploadProfile::TextOnly, SessionStore::in_memory(), None);
    run_script(
        &mut app,
        "home Pisa\nbando\ndept AI\nshortlist\nexams 1\nreset 2\n",
    );

    let state = app.controller.state();
    assert_eq!(state.stage, Stage::Mete);
    assert!(state.shortlist_result.is_none());
    assert!(state.exams_result.is_none());
    assert!(state.bando_result.is_some());
    assert_eq!(state.department, "AI");
}

#[test]
fn exams_for_unknown_position_is_reported() {
    let mut app = app_with(UploadProfile::TextOnly, SessionStore::in_memory(), None);
    let output = run_script(&mut app, "exams 3\n");
    assert!(output.contains("No such destination in the shortlist."));
}

#[test]
fn api_base_can_be_changed_and_saved() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("helpdesk.toml");
    let mut app = app_with(
        UploadProfile::TextOnly,
        SessionStore::in_memory(),
        Some(config_path.clone()),
    );

    let output = run_script(&mut app, "api http://10.1.2.3:9000\napi ::nope\napi save\n");
    assert!(output.contains("Live requests now go to http://10.1.2.3:9000/"));
    assert!(output.contains("invalid API base"));
    assert_eq!(app.api_base, "http://10.1.2.3:9000/");

    let saved = std::fs::read_to_string(&config_path).expect("saved config");
    assert!(saved.contains("http://10.1.2.3:9000/"));
}

#[test]
fn unknown_commands_do_not_stop_the_prompt() {
    let mut app = app_with(UploadProfile::TextOnly, SessionStore::in_memory(), None);
    let output = run_script(&mut app, "fly\nmock off\nstatus\n");
    assert!(output.contains("unknown command `fly`"));
    assert!(output.contains("Using live data."));
    assert!(output.contains("Source: live (http://127.0.0.1:8000/)"));
}

#[test]
fn home_institution_is_stored_trimmed() {
    let mut app = app_with(UploadProfile::TextOnly, SessionStore::in_memory(), None);
    let mut out = Vec::new();
    app.execute(Command::Home("  Università di Pisa \t".into()), &mut out)
        .expect("home");

    assert_eq!(app.controller.state().home_institution, "Università di Pisa");
    assert_eq!(app.session.get(HOME_INSTITUTION_KEY), "Università di Pisa");
}

#[test]
fn not_found_lookup_still_remembers_home_institution() {
    let session = SessionStore::in_memory();
    let mut app = app_with_source(
        UploadProfile::TextOnly,
        session,
        None,
        Arc::new(NoCallSource),
    );
    run_script(&mut app, "home Università di Pisa\nbando\n");
    app.session.clear(HOME_INSTITUTION_KEY);
    app.controller.set_home_institution(" Università di Pisa ");

    let output = run_script(&mut app, "bando\n");
    assert!(output.contains("No call found"));
    assert_eq!(app.controller.state().stage, Stage::Bando);
    assert_eq!(app.session.get(HOME_INSTITUTION_KEY), "Università di Pisa");
}
