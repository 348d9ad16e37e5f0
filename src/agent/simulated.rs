use crate::agent::script::{self, ConversationContext, ResponseSet};
use crate::agent::AgentDriver;
use crate::event::AppEvent;
use crate::session::{self, SessionState, SessionStatus, ToolResult};
use rand::Rng;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::debug;

const FINAL_ANSWER_PAUSE: Duration = Duration::from_millis(1500);
const MIN_STEP_DELAY_MS: u64 = 1000;
const MAX_STEP_DELAY_MS: u64 = 3000;

/// In-process scripted driver. Walks a canned tool list with randomized
/// delays so the incremental-update path gets exercised without a backend.
pub struct SimulatedDriver {
    tx: Sender<AppEvent>,
    runtime_handle: Handle,
    // Conversation memory is scoped to this driver instance, so independent
    // drivers in the same process cannot cross-talk.
    context: Arc<Mutex<ConversationContext>>,
}

impl SimulatedDriver {
    pub fn new(tx: Sender<AppEvent>, runtime_handle: Handle) -> Self {
        Self {
            tx,
            runtime_handle,
            context: Arc::new(Mutex::new(ConversationContext::default())),
        }
    }
}

impl AgentDriver for SimulatedDriver {
    fn submit(&self, query: String) {
        let tx = self.tx.clone();
        let context = Arc::clone(&self.context);

        self.runtime_handle.spawn(async move {
            let response = {
                let mut guard = context.lock().await;
                let (response, next) = script::advance(&query, &guard);
                *guard = next;
                response
            };

            let state = run_script(response, |snapshot| {
                // A send failure means the UI is gone; the script just runs
                // out in the background, which stale sessions do anyway.
                let _ = tx.send(AppEvent::SessionUpdate(snapshot.clone()));
            })
            .await;

            debug!(
                session_id = state.session_id.as_deref().unwrap_or("-"),
                steps = state.results.len(),
                "simulated session completed"
            );
        });
    }

    fn shutdown(&self) {}
}

/// Plays one response set to completion, emitting a snapshot at every state
/// change. Steps run strictly sequentially: step `i + 1` does not begin
/// until step `i`'s finished snapshot has been emitted.
pub(crate) async fn run_script(
    response: ResponseSet,
    emit: impl Fn(&SessionState),
) -> SessionState {
    let mut state = SessionState::begin(uuid::Uuid::new_v4().to_string());
    emit(&state);

    for (index, step) in response.steps.iter().enumerate() {
        let key = session::step_key(index);

        state.results.insert(key.clone(), ToolResult::running(step.tool));
        emit(&state);

        sleep(step_delay()).await;

        state
            .results
            .insert(key, ToolResult::finished(step.tool, step.result));
        emit(&state);
    }

    sleep(FINAL_ANSWER_PAUSE).await;

    state.status = SessionStatus::Completed;
    state.final_answer = Some(response.final_answer.to_string());
    emit(&state);
    state
}

fn step_delay() -> Duration {
    let millis = rand::thread_rng().gen_range(MIN_STEP_DELAY_MS..=MAX_STEP_DELAY_MS);
    Duration::from_millis(millis)
}
