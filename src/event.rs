use crate::session::SessionState;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A fresh session snapshot from whichever driver is active.
    SessionUpdate(SessionState),
    /// A driver-level failure outside any session snapshot, e.g. a failed
    /// query submission. The UI logs it and stays in its pre-submit state.
    DriverError(String),
}
