use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Simulated,
    Remote,
}

impl DriverKind {
    pub fn label(self) -> &'static str {
        match self {
            DriverKind::Simulated => "Simulated Agent",
            DriverKind::Remote => "Remote Agent",
        }
    }
}

/// Startup configuration. Which driver runs is decided here, once, from the
/// environment; it is never switched at runtime or picked inside an error
/// handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub driver: DriverKind,
    pub api_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let driver = match get("SCHEMER_DRIVER").as_deref().map(str::trim) {
            None | Some("") | Some("simulated") | Some("mock") => DriverKind::Simulated,
            Some("remote") => DriverKind::Remote,
            Some(other) => {
                warn!(value = other, "unknown SCHEMER_DRIVER value, using simulated");
                DriverKind::Simulated
            }
        };

        let api_url = get("SCHEMER_API_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self { driver, api_url }
    }
}
