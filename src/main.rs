//! Deskmate - Always-on Personal Desk Assistant
//!
//! Main entry point for the terminal host shell.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Deskmate v{}", env!("CARGO_PKG_VERSION"));

    let config = match deskmate::storage::load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("config unreadable ({e}), using defaults");
            deskmate::AssistantConfig::default()
        }
    };

    app::DeskmateApp::new(config)?.run()
}
