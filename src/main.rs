use std::fs::File;
use std::sync::Mutex;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use weiscreener::config::{config_path, load_config, AppConfig};
use weiscreener::data::DexClient;
use weiscreener::screener::ChartSettings;

const LOG_FILE: &str = "weiscreener.log";

/// Logs go to a file; the terminal belongs to the UI.
fn init_tracing(default_level: &str) -> color_eyre::Result<()> {
    let file = File::create(LOG_FILE)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let path = config_path();
    let (config, config_error) = match load_config(&path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    init_tracing(&config.log_level)?;
    if let Some(err) = config_error {
        warn!("ignoring config, using defaults: {}", err);
    }
    info!(config = %path.display(), base_url = %config.api_base_url, "starting");

    let client = DexClient::from_config(&config)?;
    let settings = ChartSettings::from(&config);

    let mut terminal = ratatui::init();
    let result = weiscreener::app::run(&mut terminal, &client, &settings).await;
    ratatui::restore();
    result
}
