//! Plain-text views of the wizard state.

use std::fmt::Write;

use client_core::{ValidationError, WizardState};
use shared::{
    domain::{Mode, Stage},
    protocol::{BandoResult, Citation, ExamsReport, Shortlist},
};

pub fn stepper(state: &WizardState) -> String {
    Stage::ALL
        .iter()
        .map(|stage| {
            let marker = if *stage < state.stage {
                "x"
            } else if *stage == state.stage {
                ">"
            } else {
                " "
            };
            format!("[{marker}] {}. {}", stage.number(), stage.label())
        })
        .collect::<Vec<_>>()
        .join("   ")
}

fn citations(list: &[Citation]) -> String {
    list.iter()
        .map(Citation::label)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn bando(result: &BandoResult) -> String {
    let mut out = String::new();
    match result {
        BandoResult::Found { summary, citations: cites } => {
            let _ = writeln!(out, "Call found");
            if !summary.eligibility.is_empty() {
                let _ = writeln!(out, "  Eligibility: {}", summary.eligibility);
            }
            if !summary.departments.is_empty() {
                let _ = writeln!(out, "  Departments: {}", summary.departments.join(", "));
            }
            if !summary.periods.is_empty() {
                let _ = writeln!(out, "  Periods: {}", summary.periods.join(", "));
            }
            if !summary.notes.is_empty() {
                let _ = writeln!(out, "  Notes: {}", summary.notes);
            }
            if !cites.is_empty() {
                let _ = writeln!(out, "  Sources: {}", citations(cites));
            }
        }
        BandoResult::NotFound { .. } => {
            let _ = writeln!(out, "No call found");
        }
    }
    out
}

pub fn shortlist(shortlist: &Shortlist) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Shortlist ({} destinations)", shortlist.items.len());
    for (position, item) in shortlist.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} ({})",
            position + 1,
            item.id_university,
            item.id_city
        );
        if !item.description.is_empty() {
            let _ = writeln!(out, "     {}", item.description);
        }
        if !item.citations.is_empty() {
            let _ = writeln!(out, "     Sources: {}", citations(&item.citations));
        }
        if let Some(link) = item.erasmus_link() {
            let _ = writeln!(out, "     Erasmus site: {link}");
        }
    }
    out
}

pub fn exams(state: &WizardState, report: &ExamsReport) -> String {
    let mut out = String::new();
    match state.selected_destination() {
        Some(destination) => {
            let _ = writeln!(
                out,
                "Exams at {} ({}), {} semester",
                destination.id_university, destination.id_city, state.period
            );
        }
        None => {
            let _ = writeln!(out, "Exams ({} semester)", state.period);
        }
    }
    if !report.download_pdf.is_empty() {
        let _ = writeln!(out, "  Full course catalogue: {}", report.download_pdf);
    }
    let _ = writeln!(out, "  Offered courses:");
    for exam in &report.incoming_exams_full {
        let _ = writeln!(
            out,
            "    - {} ({} ECTS, {}, {})",
            exam.name, exam.ects, exam.semester, exam.lang
        );
    }
    if report.compatible_exams.is_empty() {
        let _ = writeln!(out, "  No course matched your study plan.");
    } else {
        let _ = writeln!(out, "  Compatible with your study plan:");
        for exam in &report.compatible_exams {
            let _ = writeln!(out, "    * {}: {}", exam.name, exam.reason);
            if !exam.citations.is_empty() {
                let _ = writeln!(out, "      Sources: {}", citations(&exam.citations));
            }
        }
    }
    out
}

/// Full view: stepper, inputs, the results reached so far, then notices.
pub fn status(state: &WizardState, api_base: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", stepper(state));
    let source = match state.mode {
        Mode::Mock => "mock data".to_string(),
        Mode::Live => format!("live ({api_base})"),
    };
    let _ = writeln!(out, "Source: {source}");
    let _ = writeln!(
        out,
        "Home: {}   Department: {}   Period: {}",
        or_dash(&state.home_institution),
        or_dash(&state.department),
        state.period
    );
    let plan = match &state.study_plan_file {
        Some(file) => format!("{} ({} bytes)", file.filename(), file.size_bytes()),
        None => "-".to_string(),
    };
    let _ = writeln!(out, "Study plan: {plan}   Notes: {}", or_dash(&state.study_plan_text));

    if let Some(result) = &state.bando_result {
        out.push_str(&bando(result));
    }
    if let Some(list) = &state.shortlist_result {
        out.push_str(&shortlist(list));
    }
    if let Some(report) = &state.exams_result {
        out.push_str(&exams(state, report));
    }
    if state.is_loading {
        let _ = writeln!(out, "Loading...");
    }
    if let Some(notice) = state.notice() {
        let _ = writeln!(out, "Note: {notice}");
    }
    if let Some(err) = &state.last_error {
        let _ = writeln!(out, "Error: {err}");
    }
    out
}

/// Wording for a precondition that kept an action from starting.
pub fn rejection(err: &ValidationError) -> String {
    match err {
        ValidationError::MissingHomeInstitution => {
            "Enter your home institution first (`home <name>`).".to_string()
        }
        ValidationError::MissingDepartment => "Enter a department first (`dept <name>`).".to_string(),
        ValidationError::MissingStudyPlan => {
            "Attach your study plan PDF first (`attach <path>`).".to_string()
        }
        other => format!("Cannot do that: {other}."),
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
#[path = "../tests/render_tests.rs"]
mod tests;
