//! Routes parsed line commands to the analyzer session.

use std::sync::Arc;

use client_core::{AnalyzerSession, SessionSnapshot, SubmitOutcome};
use shared::domain::DisplayState;
use tracing::debug;

use crate::{
    commands::{Command, HELP},
    files::load_selected_file,
};

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Continue(Option<String>),
    Quit,
}

pub async fn dispatch(session: &Arc<AnalyzerSession>, command: Command) -> Reply {
    debug!(command = command.name(), "dispatching command");
    match command {
        Command::SelectFile(path) => match load_selected_file(&path).await {
            Ok(file) => {
                session.select_file(Some(file)).await;
                Reply::Continue(None)
            }
            Err(error) => Reply::Continue(Some(format!("{error:#}"))),
        },
        Command::ClearFile => {
            session.select_file(None).await;
            Reply::Continue(None)
        }
        Command::SetK(k) => {
            session.set_k(k).await;
            Reply::Continue(None)
        }
        Command::SetBWeight(b_weight) => {
            session.set_b_weight(b_weight).await;
            Reply::Continue(None)
        }
        Command::Submit => {
            if session.is_submitting() {
                return Reply::Continue(Some("analysis already running".to_string()));
            }
            let session = session.clone();
            tokio::spawn(async move {
                match session.submit().await {
                    SubmitOutcome::MissingFile => debug!("submit ignored without a file"),
                    SubmitOutcome::Busy => debug!("submit ignored while busy"),
                    SubmitOutcome::Displayed(_) | SubmitOutcome::Failed(_) => {}
                }
            });
            Reply::Continue(None)
        }
        Command::Status => Reply::Continue(Some(describe_snapshot(&session.snapshot().await))),
        Command::Help => Reply::Continue(Some(HELP.to_string())),
        Command::Quit => Reply::Quit,
    }
}

pub fn describe_snapshot(snapshot: &SessionSnapshot) -> String {
    let file = snapshot.filename.as_deref().unwrap_or("<none>");
    let display = match &snapshot.display {
        DisplayState::Idle => "idle".to_string(),
        DisplayState::Prompt(message) => format!("prompt: {message}"),
        DisplayState::Loading => "loading".to_string(),
        DisplayState::PreviewImage(handle) => format!("preview {}", handle.as_str()),
        DisplayState::ResultImage { score, .. } => match score {
            Some(score) => format!("result (score {score:.1})"),
            None => "result".to_string(),
        },
        DisplayState::Error(message) => message.clone(),
    };
    format!(
        "file: {file}\nk: {} ({})\nb_weight: {} ({})\ndisplay: {display}\nsubmit: {}",
        snapshot.sliders.k,
        snapshot.k_label,
        snapshot.sliders.b_weight,
        snapshot.b_weight_label,
        if snapshot.submit_enabled {
            "enabled"
        } else {
            "disabled"
        },
    )
}
