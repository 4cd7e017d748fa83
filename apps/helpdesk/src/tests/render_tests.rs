use client_core::{mock_bando, mock_exams, mock_shortlist, Action, ActionOutcome, StageController};
use shared::{
    domain::{Mode, UniversityId, UploadProfile},
    protocol::Destination,
};

use super::*;

fn controller_at_exams() -> StageController {
    let mut controller = StageController::new(UploadProfile::TextOnly);
    controller.set_mode(Mode::Mock);
    controller.set_home_institution("Università di Pisa");
    controller.set_department("AI");

    let (ticket, _) = controller.begin_action(Action::Bando).expect("bando");
    controller.complete_action(ticket, ActionOutcome::Bando(mock_bando()));
    let (ticket, _) = controller.begin_action(Action::Shortlist).expect("shortlist");
    controller.complete_action(ticket, ActionOutcome::Shortlist(mock_shortlist()));
    let (ticket, _) = controller
        .begin_action(Action::Exams(UniversityId::new("TUM")))
        .expect("exams");
    controller.complete_action(ticket, ActionOutcome::Exams(mock_exams()));
    controller
}

#[test]
fn stepper_marks_completed_and_current_stages() {
    let controller = StageController::new(UploadProfile::PdfRequired);
    assert_eq!(
        stepper(controller.state()),
        "[>] 1. Bando   [ ] 2. Mete   [ ] 3. Esami"
    );

    let controller = controller_at_exams();
    assert_eq!(
        stepper(controller.state()),
        "[x] 1. Bando   [x] 2. Mete   [>] 3. Esami"
    );
}

#[test]
fn bando_lists_citations_with_pages() {
    let text = bando(&mock_bando());
    assert!(text.contains("Call found"));
    assert!(text.contains("pisa_bando_2025.pdf p.3, pisa_bando_2025.pdf p.7"));
}

#[test]
fn shortlist_falls_back_to_a_search_link() {
    let list = Shortlist {
        items: vec![Destination {
            id_university: UniversityId::new("TUM"),
            id_city: "Munich".into(),
            description: String::new(),
            citations: Vec::new(),
            site_url: None,
        }],
    };
    let text = shortlist(&list);
    assert!(text.contains("1. TUM (Munich)"));
    assert!(text.contains("https://www.google.com/search?q=Erasmus+TUM+Munich"));
}

#[test]
fn exams_view_names_the_selected_destination() {
    let controller = controller_at_exams();
    let state = controller.state();
    let report = state.exams_result.as_ref().expect("exams");
    let text = exams(state, report);
    assert!(text.starts_with("Exams at TUM (Munich), Fall semester"));
    assert!(text.contains("Wireless Communications (6 ECTS, Fall/Spring, EN)"));
    assert!(text.contains("* Big Data and Data Mining"));
}

#[test]
fn status_shows_errors_and_notices() {
    let mut controller = StageController::new(UploadProfile::PdfRequired);
    controller.set_home_institution("Nowhere");
    let (ticket, _) = controller.begin_action(Action::Bando).expect("bando");
    controller.complete_action(
        ticket,
        ActionOutcome::Bando(BandoResult::NotFound { message: None }),
    );
    let text = status(controller.state(), "http://127.0.0.1:8000/");
    assert!(text.contains("Source: live (http://127.0.0.1:8000/)"));
    assert!(text.contains("No call found"));
    assert!(text.contains("Note: No call found in the indexed documents."));

    let (ticket, _) = controller.begin_action(Action::Bando).expect("bando");
    controller.fail_action(ticket, "network error: refused");
    let text = status(controller.state(), "http://127.0.0.1:8000/");
    assert!(text.contains("Error: network error: refused"));
    assert!(!text.contains("Note:"));
}

#[test]
fn rejections_point_to_the_missing_input() {
    assert_eq!(
        rejection(&ValidationError::MissingStudyPlan),
        "Attach your study plan PDF first (`attach <path>`)."
    );
    assert!(rejection(&ValidationError::Busy).starts_with("Cannot do that"));
}
