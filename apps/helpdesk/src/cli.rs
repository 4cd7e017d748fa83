//! Prompt command grammar.

use std::path::PathBuf;

use shared::domain::{Period, Stage, UniversityId};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  home <name>          set the home institution (remembered for this session scope)
  dept <name>          set the department
  period fall|spring   set the exchange period
  plan <text>          set the study plan notes (empty to clear)
  attach <path>        attach the study plan PDF
  detach               drop the attached study plan
  mock on|off          switch between mock and live data
  api <url>            point live requests to another backend
  api save             remember the current backend for next time
  bando                look up the call for the home institution
  shortlist            generate the destination shortlist
  exams <n|id>         show compatible exams for a shortlisted destination
  reset [1|2|3]        go back to a stage and drop its results (default 1)
  start-over           reset everything and forget the home institution
  status               print the current wizard state
  help                 show this help
  quit                 leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamsTarget {
    /// 1-based position in the shortlist as rendered.
    Position(usize),
    Id(UniversityId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Home(String),
    Department(String),
    Period(Period),
    Plan(String),
    Attach(PathBuf),
    Detach,
    Mock(bool),
    Api(String),
    ApiSave,
    Bando,
    Shortlist,
    Exams(ExamsTarget),
    Reset(Stage),
    StartOver,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parses one prompt line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "home" => Command::Home(rest.to_string()),
        "dept" | "department" => Command::Department(rest.to_string()),
        "period" => Command::Period(
            Period::parse(rest).ok_or(CommandError::Usage("period fall|spring"))?,
        ),
        "plan" => Command::Plan(rest.to_string()),
        "attach" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("attach <path>"));
            }
            Command::Attach(PathBuf::from(rest))
        }
        "detach" => Command::Detach,
        "mock" => match rest.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => Command::Mock(true),
            "off" | "false" | "0" => Command::Mock(false),
            _ => return Err(CommandError::Usage("mock on|off")),
        },
        "api" => match rest {
            "" => return Err(CommandError::Usage("api <url> | api save")),
            "save" => Command::ApiSave,
            url => Command::Api(url.to_string()),
        },
        "bando" => Command::Bando,
        "shortlist" => Command::Shortlist,
        "exams" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("exams <n|id>"));
            }
            match rest.parse::<usize>() {
                Ok(0) => return Err(CommandError::Usage("exams <n|id>, positions start at 1")),
                Ok(position) => Command::Exams(ExamsTarget::Position(position)),
                Err(_) => Command::Exams(ExamsTarget::Id(UniversityId::new(rest))),
            }
        }
        "reset" => {
            if rest.is_empty() {
                Command::Reset(Stage::Bando)
            } else {
                let stage = rest
                    .parse::<u8>()
                    .ok()
                    .and_then(Stage::from_number)
                    .ok_or(CommandError::Usage("reset [1|2|3]"))?;
                Command::Reset(stage)
            }
        }
        "start-over" | "restart" => Command::StartOver,
        "status" | "show" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
