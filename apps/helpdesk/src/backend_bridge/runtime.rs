//! Worker thread that owns the async runtime and executes queued commands.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use client_core::{LiveDataSource, ResultFetcher, StudyPlanFile};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Starts the backend worker. It runs until every command sender is dropped.
pub fn spawn_backend_thread(
    fetcher: ResultFetcher,
    request_timeout: Option<Duration>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.send(UiEvent::Error(format!(
                    "backend worker startup failure: {err}"
                )));
                return;
            }
        };

        runtime.block_on(async move {
            let mut fetcher = fetcher;
            tracing::debug!("backend worker ready");
            while let Ok(cmd) = cmd_rx.recv() {
                let event = match cmd {
                    BackendCommand::Fetch { ticket, request } => UiEvent::ActionFinished {
                        ticket,
                        result: fetcher.fetch(ticket, request).await,
                    },
                    BackendCommand::LoadStudyPlan { path } => {
                        UiEvent::StudyPlanLoaded(StudyPlanFile::from_path(&path).await)
                    }
                    BackendCommand::SetApiBase { api_base } => {
                        match LiveDataSource::new(&api_base, request_timeout) {
                            Ok(live) => {
                                let api_base = live.api_base().to_string();
                                fetcher.set_live(Arc::new(live));
                                UiEvent::ApiBaseChanged(api_base)
                            }
                            Err(err) => UiEvent::Error(err.to_string()),
                        }
                    }
                };
                if ui_tx.send(event).is_err() {
                    break;
                }
            }
            tracing::debug!("backend worker stopped");
        });
    })
}
