use crate::agent::AgentDriver;
use crate::event::AppEvent;
use crate::scheme::SchemeModel;
use crate::session::{SessionState, SessionStatus, ToolResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::time::{self, Duration};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    session_id: String,
}

/// Per-session status payload from the backend. `results` and `schemes`
/// replace their previous values wholesale, never merge.
#[derive(Debug, Deserialize)]
struct PollResponse {
    status: SessionStatus,
    #[serde(default)]
    results: BTreeMap<String, ToolResult>,
    #[serde(default)]
    final_answer: Option<String>,
    #[serde(default)]
    schemes: Option<Vec<SchemeModel>>,
}

impl PollResponse {
    fn into_state(self, session_id: &str) -> SessionState {
        SessionState {
            session_id: Some(session_id.to_string()),
            status: self.status,
            results: self.results,
            final_answer: self.final_answer,
            schemes: self.schemes,
        }
    }
}

/// Driver backed by the remote agent API: one `POST /query` submission, then
/// a fixed-interval poll of `GET /session/{id}` until a terminal status.
pub struct RemoteDriver {
    base_url: String,
    http: reqwest::Client,
    tx: Sender<AppEvent>,
    runtime_handle: Handle,
    polling_active: Arc<AtomicBool>,
}

impl RemoteDriver {
    pub fn new(base_url: String, tx: Sender<AppEvent>, runtime_handle: Handle) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            tx,
            runtime_handle,
            polling_active: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl AgentDriver for RemoteDriver {
    fn submit(&self, query: String) {
        let http = self.http.clone();
        let base_url = self.base_url.clone();
        let tx = self.tx.clone();
        let polling_active = Arc::clone(&self.polling_active);

        self.runtime_handle.spawn(async move {
            // Fail fast on submission: no retry, the UI keeps its pre-submit
            // state and only sees the error line.
            let session_id = match submit_query(&http, &base_url, &query).await {
                Ok(session_id) => session_id,
                Err(err) => {
                    warn!(error = %err, "query submission failed");
                    let _ = tx.send(AppEvent::DriverError(format!(
                        "query submission failed: {err}"
                    )));
                    return;
                }
            };

            debug!(session_id = %session_id, "query accepted, polling");
            polling_active.store(true, Ordering::SeqCst);
            poll_loop(&http, &base_url, &session_id, &polling_active, |state| {
                let _ = tx.send(AppEvent::SessionUpdate(state));
            })
            .await;
        });
    }

    fn shutdown(&self) {
        self.polling_active.store(false, Ordering::SeqCst);
    }
}

async fn submit_query(
    http: &reqwest::Client,
    base_url: &str,
    query: &str,
) -> Result<String, RemoteError> {
    let response = http
        .post(format!("{base_url}/query"))
        .json(&serde_json::json!({ "query": query }))
        .send()
        .await?
        .error_for_status()?
        .json::<SubmitResponse>()
        .await?;
    Ok(response.session_id)
}

async fn fetch_session(
    http: &reqwest::Client,
    base_url: &str,
    session_id: &str,
) -> Result<PollResponse, RemoteError> {
    let response = http
        .get(format!("{base_url}/session/{session_id}"))
        .send()
        .await?
        .error_for_status()?
        .json::<PollResponse>()
        .await?;
    Ok(response)
}

/// Polls until the session reaches a terminal status, a poll fails, or the
/// active flag is cleared. The flag is checked before each poll is issued,
/// never mid-flight, so one in-flight poll may still land after shutdown;
/// its wholesale overwrite of the snapshot is harmless.
pub(crate) async fn poll_loop(
    http: &reqwest::Client,
    base_url: &str,
    session_id: &str,
    active: &AtomicBool,
    emit: impl Fn(SessionState),
) {
    let mut ticker = time::interval(POLL_INTERVAL);
    // Keeps the last received snapshot so a poll failure can flip the status
    // to error without rolling back already-displayed results.
    let mut last = SessionState::begin(session_id.to_string());

    loop {
        ticker.tick().await;
        if !active.load(Ordering::SeqCst) {
            break;
        }

        match fetch_session(http, base_url, session_id).await {
            Ok(payload) => {
                let state = payload.into_state(session_id);
                let terminal = state.status.is_terminal();
                last = state.clone();
                emit(state);
                if terminal {
                    break;
                }
            }
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "poll failed, stopping");
                last.status = SessionStatus::Error;
                emit(last);
                break;
            }
        }
    }

    active.store(false, Ordering::SeqCst);
}
