mod backend_bridge;
mod cli;
mod controller;
mod ui;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{config, ResultFetcher, SessionStore, StageController};
use crossbeam_channel::bounded;
use shared::domain::{Mode, UploadProfile};
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime::spawn_backend_thread};
use crate::controller::events::UiEvent;
use crate::ui::app::HelpDeskApp;

#[derive(Parser, Debug)]
#[command(name = "helpdesk", about = "Erasmus exchange help desk")]
struct Args {
    /// Backend base URL; wins over the environment and the saved preference.
    #[arg(long)]
    api_base: Option<String>,
    /// Start with canned data instead of the live backend.
    #[arg(long)]
    mock: bool,
    /// `pdf_required` or `text_only`.
    #[arg(long)]
    profile: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    session_scope: Option<String>,
    #[arg(long)]
    session_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let config_path = args.config.clone().or_else(config::default_config_path);
    let mut settings = config::load_settings(config_path.as_deref());
    settings.apply_api_override(args.api_base.as_deref());
    if args.mock {
        settings.mock = true;
    }
    if let Some(raw) = args.profile.as_deref() {
        settings.upload_profile = UploadProfile::parse(raw)
            .with_context(|| format!("unknown upload profile `{raw}`"))?;
    }
    if let Some(scope) = args.session_scope {
        settings.session_scope = Some(scope);
    }
    if let Some(dir) = args.session_dir {
        settings.session_dir = Some(dir);
    }

    let session = match (
        settings.resolved_session_dir(),
        settings.resolved_session_scope(),
    ) {
        (Some(dir), Some(scope)) => SessionStore::open(&dir, &scope),
        _ => {
            tracing::warn!("no session directory or scope available, session values are kept in memory");
            SessionStore::in_memory()
        }
    };
    let fetcher = ResultFetcher::from_settings(&settings);

    let mut controller = StageController::new(settings.upload_profile);
    controller.set_mode(Mode::from_flag(settings.mock));
    tracing::info!(
        api_base = %settings.api_base,
        mode = controller.state().mode.as_str(),
        profile = ?settings.upload_profile,
        "starting help desk"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    let worker = spawn_backend_thread(fetcher, settings.request_timeout(), cmd_rx, ui_tx);

    let mut app = HelpDeskApp::new(
        controller,
        session,
        settings.api_base.clone(),
        config_path,
        cmd_tx,
        ui_rx,
    );
    let stdin = io::stdin();
    let result = app.run(stdin.lock(), io::stdout());
    drop(app);
    if worker.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    result
}
