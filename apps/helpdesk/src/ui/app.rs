//! Interactive prompt driving one wizard session.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::Result;
use client_core::{
    config, Action, SessionStore, StageController, ValidationError, HOME_INSTITUTION_KEY,
};
use crossbeam_channel::{Receiver, Sender};
use shared::domain::{Mode, Stage, UniversityId};

use crate::backend_bridge::commands::BackendCommand;
use crate::cli::{self, Command, ExamsTarget};
use crate::controller::{
    events::UiEvent,
    orchestration::{dispatch_backend_command, settle_action},
};
use crate::ui::render;

pub struct HelpDeskApp {
    controller: StageController,
    session: SessionStore,
    api_base: String,
    config_path: Option<PathBuf>,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
}

/// What the prompt should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl HelpDeskApp {
    pub fn new(
        controller: StageController,
        session: SessionStore,
        api_base: String,
        config_path: Option<PathBuf>,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        let mut app = Self {
            controller,
            session,
            api_base,
            config_path,
            cmd_tx,
            ui_rx,
        };
        let remembered = app.session.get(HOME_INSTITUTION_KEY);
        if !remembered.is_empty() {
            tracing::debug!(home = %remembered, "restored home institution from session");
            app.controller.set_home_institution(remembered);
        }
        app
    }

    /// Reads commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> Result<()> {
        writeln!(out, "Erasmus help desk. Type `help` for commands.")?;
        writeln!(out, "{}", render::status(self.controller.state(), &self.api_base))?;
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            let flow = match cli::parse_command(&line) {
                Ok(Some(command)) => self.execute(command, &mut out)?,
                Ok(None) => Flow::Continue,
                Err(err) => {
                    writeln!(out, "{err}")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                return Ok(());
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        Ok(())
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Home(name) => {
                let name = name.trim().to_string();
                self.session.set(HOME_INSTITUTION_KEY, &name);
                self.controller.set_home_institution(name);
            }
            Command::Department(name) => self.controller.set_department(name),
            Command::Period(period) => self.controller.set_period(period),
            Command::Plan(text) => self.controller.set_study_plan_text(text),
            Command::Attach(path) => {
                self.attach(path, out)?;
                return Ok(Flow::Continue);
            }
            Command::Detach => self.controller.detach_study_plan(),
            Command::Mock(on) => {
                self.controller.set_mode(Mode::from_flag(on));
                writeln!(out, "Using {} data.", self.controller.state().mode.as_str())?;
                return Ok(Flow::Continue);
            }
            Command::Api(url) => {
                self.change_api_base(url, out)?;
                return Ok(Flow::Continue);
            }
            Command::ApiSave => {
                self.save_api_base(out)?;
                return Ok(Flow::Continue);
            }
            Command::Bando => {
                if self.run_action(Action::Bando, out)? {
                    let home = self.controller.state().home_institution.trim().to_string();
                    self.session.set(HOME_INSTITUTION_KEY, &home);
                }
                writeln!(out, "{}", self.current_view())?;
                return Ok(Flow::Continue);
            }
            Command::Shortlist => {
                self.run_action(Action::Shortlist, out)?;
                writeln!(out, "{}", self.current_view())?;
                return Ok(Flow::Continue);
            }
            Command::Exams(target) => {
                match self.resolve_destination(target) {
                    Some(id) => {
                        self.run_action(Action::Exams(id), out)?;
                        writeln!(out, "{}", self.current_view())?;
                    }
                    None => writeln!(out, "No such destination in the shortlist.")?,
                }
                return Ok(Flow::Continue);
            }
            Command::Reset(stage) => {
                self.controller.reset_to_stage(stage);
                writeln!(out, "{}", self.current_view())?;
                return Ok(Flow::Continue);
            }
            Command::StartOver => {
                self.controller.reset_to_stage(Stage::Bando);
                self.controller.set_home_institution("");
                self.controller.detach_study_plan();
                self.session.clear(HOME_INSTITUTION_KEY);
                writeln!(out, "{}", self.current_view())?;
                return Ok(Flow::Continue);
            }
            Command::Status => {
                writeln!(out, "{}", self.current_view())?;
                return Ok(Flow::Continue);
            }
            Command::Help => {
                writeln!(out, "{}", cli::HELP)?;
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        writeln!(out, "ok")?;
        Ok(Flow::Continue)
    }

    fn current_view(&self) -> String {
        render::status(self.controller.state(), &self.api_base)
    }

    fn resolve_destination(&self, target: ExamsTarget) -> Option<UniversityId> {
        let shortlist = self.controller.state().shortlist_result.as_ref()?;
        match target {
            ExamsTarget::Position(position) => shortlist
                .items
                .get(position.checked_sub(1)?)
                .map(|item| item.id_university.clone()),
            ExamsTarget::Id(id) => Some(id),
        }
    }

    /// Begins `action`, hands it to the backend and blocks until it settles.
    /// Returns `true` when the backend answered successfully.
    fn run_action(&mut self, action: Action, out: &mut impl Write) -> Result<bool> {
        let (ticket, request) = match self.controller.begin_action(action) {
            Ok(begun) => begun,
            Err(err) => {
                writeln!(out, "{}", render::rejection(&err))?;
                return Ok(false);
            }
        };
        writeln!(out, "Loading {}...", ticket.kind().as_str())?;
        if let Err(status) =
            dispatch_backend_command(&self.cmd_tx, BackendCommand::Fetch { ticket, request })
        {
            self.controller.fail_action(ticket, status);
            return Ok(false);
        }

        while let Some(event) = self.next_event() {
            match event {
                UiEvent::ActionFinished { ticket: done, result } => {
                    let succeeded = result.is_ok();
                    let settled = settle_action(&mut self.controller, done, result);
                    if done == ticket {
                        return Ok(settled && succeeded);
                    }
                }
                other => self.apply_side_event(other, out)?,
            }
        }
        self.controller
            .fail_action(ticket, "backend worker stopped before answering");
        Ok(false)
    }

    fn attach(&mut self, path: PathBuf, out: &mut impl Write) -> Result<()> {
        if let Err(status) =
            dispatch_backend_command(&self.cmd_tx, BackendCommand::LoadStudyPlan { path })
        {
            writeln!(out, "{status}")?;
            return Ok(());
        }
        while let Some(event) = self.next_event() {
            match event {
                UiEvent::StudyPlanLoaded(loaded) => {
                    let attached = loaded.and_then(|file| {
                        let name = file.filename().to_string();
                        self.controller.attach_study_plan(file).map(|()| name)
                    });
                    match attached {
                        Ok(name) => writeln!(out, "Attached {name}.")?,
                        Err(err) => writeln!(out, "{}", rejected_file(&err))?,
                    }
                    return Ok(());
                }
                other => self.apply_side_event(other, out)?,
            }
        }
        writeln!(out, "Backend worker stopped before reading the file.")?;
        Ok(())
    }

    fn change_api_base(&mut self, url: String, out: &mut impl Write) -> Result<()> {
        if let Err(status) =
            dispatch_backend_command(&self.cmd_tx, BackendCommand::SetApiBase { api_base: url })
        {
            writeln!(out, "{status}")?;
            return Ok(());
        }
        while let Some(event) = self.next_event() {
            match event {
                UiEvent::ApiBaseChanged(api_base) => {
                    writeln!(out, "Live requests now go to {api_base}")?;
                    self.api_base = api_base;
                    return Ok(());
                }
                UiEvent::Error(message) => {
                    writeln!(out, "{message}")?;
                    return Ok(());
                }
                other => self.apply_side_event(other, out)?,
            }
        }
        Ok(())
    }

    fn save_api_base(&self, out: &mut impl Write) -> Result<()> {
        let Some(path) = self.config_path.as_deref() else {
            writeln!(out, "No configuration directory available; nothing saved.")?;
            return Ok(());
        };
        match config::save_api_base(path, &self.api_base) {
            Ok(()) => writeln!(out, "Saved API base to {}", path.display())?,
            Err(err) => writeln!(out, "Could not save the API base: {err:#}")?,
        }
        Ok(())
    }

    fn next_event(&self) -> Option<UiEvent> {
        self.ui_rx.recv().ok()
    }

    fn apply_side_event(&mut self, event: UiEvent, out: &mut impl Write) -> Result<()> {
        match event {
            UiEvent::Error(message) => writeln!(out, "{message}")?,
            UiEvent::ActionFinished { ticket, result } => {
                settle_action(&mut self.controller, ticket, result);
            }
            UiEvent::StudyPlanLoaded(_) => {
                tracing::debug!("dropping unrequested study plan load");
            }
            UiEvent::ApiBaseChanged(api_base) => self.api_base = api_base,
        }
        Ok(())
    }
}

fn rejected_file(err: &ValidationError) -> String {
    format!("Study plan not attached: {err}.")
}

#[cfg(test)]
#[path = "../tests/app_tests.rs"]
mod tests;
