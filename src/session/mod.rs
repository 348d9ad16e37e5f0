use crate::scheme::SchemeModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload shown in a tool card while the step is still executing.
pub const EXECUTING_SENTINEL: &str = "Executing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    #[serde(alias = "initializing")]
    Running,
    Completed,
    Error,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Error)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionStatus::Idle => "IDLE",
            SessionStatus::Running => "RUNNING",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolStatus {
    Running,
    // Remote payloads may omit the status once a tool has returned.
    #[default]
    Finished,
    Error,
}

impl ToolStatus {
    pub fn label(self) -> &'static str {
        match self {
            ToolStatus::Running => "RUNNING",
            ToolStatus::Finished => "FINISHED",
            ToolStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: String,
    #[serde(default)]
    pub status: ToolStatus,
    #[serde(default)]
    pub result: String,
}

impl ToolResult {
    pub fn running(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            status: ToolStatus::Running,
            result: EXECUTING_SENTINEL.to_string(),
        }
    }

    pub fn finished(tool: &str, result: &str) -> Self {
        Self {
            tool: tool.to_string(),
            status: ToolStatus::Finished,
            result: result.to_string(),
        }
    }
}

/// The single active session bound to the UI. Replaced wholesale on every
/// driver update; a new query or a reset discards the previous value
/// entirely, no history is retained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub session_id: Option<String>,
    pub status: SessionStatus,
    pub results: BTreeMap<String, ToolResult>,
    pub final_answer: Option<String>,
    pub schemes: Option<Vec<SchemeModel>>,
}

impl SessionState {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Initial snapshot of a freshly started session.
    pub fn begin(session_id: String) -> Self {
        Self {
            session_id: Some(session_id),
            status: SessionStatus::Running,
            ..Self::default()
        }
    }

    /// Submit guard: empty/whitespace queries and overlapping sessions are
    /// rejected before any state changes.
    pub fn can_submit(&self, query: &str) -> bool {
        !query.trim().is_empty() && self.status != SessionStatus::Running
    }
}

/// Key for tool step `index`. Zero-padded so a lexical sort of the results
/// map always equals execution order, which the tool-card list relies on.
pub fn step_key(index: usize) -> String {
    format!("tool_{index:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_state_has_no_session_id_and_empty_shape() {
        let state = SessionState::idle();
        assert_eq!(state.session_id, None);
        assert_eq!(state.status, SessionStatus::Idle);
        assert!(state.results.is_empty());
        assert_eq!(state.final_answer, None);
        assert_eq!(state.schemes, None);
    }

    #[test]
    fn begin_produces_running_snapshot() {
        let state = SessionState::begin("abc123".to_string());
        assert_eq!(state.session_id.as_deref(), Some("abc123"));
        assert_eq!(state.status, SessionStatus::Running);
        assert!(state.results.is_empty());
        assert_eq!(state.final_answer, None);
    }

    #[test]
    fn submit_guard_rejects_blank_queries() {
        let state = SessionState::idle();
        assert!(!state.can_submit(""));
        assert!(!state.can_submit("   \t\n"));
        assert!(state.can_submit("show me a house"));
    }

    #[test]
    fn submit_guard_rejects_overlapping_sessions() {
        let mut state = SessionState::begin("abc".to_string());
        assert!(!state.can_submit("another query"));

        state.status = SessionStatus::Completed;
        assert!(state.can_submit("another query"));
        state.status = SessionStatus::Error;
        assert!(state.can_submit("another query"));
    }

    #[test]
    fn step_keys_sort_lexically_in_execution_order() {
        let keys: Vec<String> = (0..12).map(step_key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn results_map_iterates_in_key_order() {
        let mut state = SessionState::begin("abc".to_string());
        for index in [3usize, 0, 2, 1] {
            state
                .results
                .insert(step_key(index), ToolResult::running("tool"));
        }

        let keys: Vec<&String> = state.results.keys().collect();
        assert_eq!(keys, vec!["tool_00", "tool_01", "tool_02", "tool_03"]);
    }

    #[test]
    fn session_status_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Completed).expect("status serializes"),
            "\"completed\""
        );
        let status: SessionStatus =
            serde_json::from_str("\"initializing\"").expect("initializing is accepted");
        assert_eq!(status, SessionStatus::Running);
    }

    #[test]
    fn tool_result_defaults_status_to_finished() {
        let result: ToolResult =
            serde_json::from_str(r#"{"tool": "search_documents", "result": "done"}"#)
                .expect("status-less tool result should parse");
        assert_eq!(result.status, ToolStatus::Finished);
    }
}
