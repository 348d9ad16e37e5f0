mod agent;
mod app;
mod config;
mod event;
mod scheme;
mod session;
mod theme;

use app::SchemerApp;
use config::AppConfig;
use eframe::egui;
use std::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("schemer=info")),
        )
        .init();

    let config = AppConfig::from_env();
    info!(driver = config.driver.label(), api_url = %config.api_url, "starting");

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("schemer-runtime")
        .build()?;

    let driver = agent::build_driver(&config, tx, runtime.handle().clone());
    let app = SchemerApp::new(rx, driver, config.driver);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Schemer",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
