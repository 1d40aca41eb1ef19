use anyhow::{Context, Result};
use farm_arena::config::{apply_env_overrides, load_config, MonitorConfig, UiConfig};
use farm_arena::headless::{outcome_status, run_headless};
use farm_arena::stream::{HttpTransport, StreamController};
use farm_arena::tui::run_terminal;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

const DEFAULT_LOG_FILTER: &str = "farm_arena=info";

/// The terminal dashboard owns the screen, so its logs go to a file
fn init_tracing(ui: &UiConfig) -> Result<()> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
    };

    if ui.headless {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&ui.log_file)
            .with_context(|| format!("Failed to open log file {}", ui.log_file))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let mut config = match std::env::var("FARM_ARENA_CONFIG") {
        Ok(path) => load_config(&path).context("Failed to load configuration")?,
        Err(_) => MonitorConfig::default(),
    };
    apply_env_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.ui)?;

    info!(
        server = %config.server.base_url,
        pacing_ms = config.pacing.delay_ms,
        headless = config.ui.headless,
        "Farm arena monitor starting..."
    );

    let transport = Arc::new(HttpTransport::new(&config.server)?);
    let controller = StreamController::new(transport, config.pacing.delay());
    let frames = controller.subscribe();

    let (command_tx, command_rx) = mpsc::channel(16);
    let controller_handle = tokio::spawn(controller.run(command_rx));

    let outcome = if config.ui.headless {
        run_headless(command_tx, frames).await?
    } else {
        run_terminal(command_tx, frames, Duration::from_millis(config.ui.redraw_ms)).await?;
        None
    };

    controller_handle
        .await
        .context("Stream controller task failed")?;
    info!("Farm arena monitor stopped");

    outcome_status(outcome.as_ref())
}
