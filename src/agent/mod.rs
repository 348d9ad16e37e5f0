use crate::config::{AppConfig, DriverKind};
use crate::event::AppEvent;
use std::sync::mpsc::Sender;
use tokio::runtime::Handle;

pub mod remote;
pub mod script;
pub mod simulated;

/// One query-to-completion agent backend. Both realizations stream
/// [`AppEvent::SessionUpdate`] snapshots over the app channel; the UI never
/// cares which one is behind the trait.
pub trait AgentDriver: Send + Sync {
    /// Starts a new session for `query`. Non-blocking; updates arrive on the
    /// app channel.
    fn submit(&self, query: String);

    /// Stops any background polling. Safe to call at any time, including
    /// when nothing is running.
    fn shutdown(&self);
}

/// Driver selection is an explicit configuration choice, never a fallback
/// taken inside an error handler.
pub fn build_driver(
    config: &AppConfig,
    tx: Sender<AppEvent>,
    runtime_handle: Handle,
) -> Box<dyn AgentDriver> {
    match config.driver {
        DriverKind::Simulated => Box::new(simulated::SimulatedDriver::new(tx, runtime_handle)),
        DriverKind::Remote => Box::new(remote::RemoteDriver::new(
            config.api_url.clone(),
            tx,
            runtime_handle,
        )),
    }
}
