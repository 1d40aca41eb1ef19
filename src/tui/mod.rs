// Terminal dashboard: draws published frames, forwards key presses

mod render;

pub use render::{command_for_key, draw};

use crate::stream::{ControlCommand, Frame as StreamFrame};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Run the dashboard until the operator quits.
///
/// Takes over the terminal for the duration and restores it on the way out,
/// also when the loop fails.
pub async fn run_terminal(
    commands: mpsc::Sender<ControlCommand>,
    mut frames: watch::Receiver<StreamFrame>,
    redraw: Duration,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;

    info!("Terminal dashboard started");
    let result = event_loop(&mut terminal, &commands, &mut frames, redraw).await;

    if let Err(e) = disable_raw_mode() {
        warn!(error = %e, "Failed to disable raw mode");
    }
    if let Err(e) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
        warn!(error = %e, "Failed to leave alternate screen");
    }
    if let Err(e) = terminal.show_cursor() {
        warn!(error = %e, "Failed to restore cursor");
    }

    info!("Terminal dashboard closed");
    result
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    commands: &mpsc::Sender<ControlCommand>,
    frames: &mut watch::Receiver<StreamFrame>,
    redraw: Duration,
) -> Result<()> {
    let mut ticker = tokio::time::interval(redraw);

    loop {
        ticker.tick().await;

        let frame = frames.borrow_and_update().clone();
        terminal
            .draw(|f| draw(f, &frame))
            .context("Failed to draw dashboard")?;

        while event::poll(Duration::ZERO).context("Failed to poll terminal events")? {
            let Event::Key(key) = event::read().context("Failed to read terminal event")? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match command_for_key(key.code, frame.controls) {
                Some(ControlCommand::Shutdown) => {
                    // Controller may already be gone
                    let _ = commands.send(ControlCommand::Shutdown).await;
                    return Ok(());
                }
                Some(command) => commands
                    .send(command)
                    .await
                    .context("Stream controller is no longer running")?,
                None => {}
            }
        }
    }
}
