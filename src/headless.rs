use crate::event::{AgentId, Day};
use crate::series::SeriesStore;
use crate::stream::{ControlCommand, Frame, RunOutcome, RunState};
use anyhow::{anyhow, Context, Result};
use std::cmp::Ordering;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Final money per agent, richest first
pub fn standings(store: &SeriesStore) -> Vec<(AgentId, f64)> {
    let mut standings: Vec<(AgentId, f64)> = store
        .timelines()
        .filter_map(|(agent, timeline)| timeline.latest_money().map(|money| (agent, money)))
        .collect();
    standings.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    standings
}

/// Process result for a finished run: an errored run is a failure
pub fn outcome_status(outcome: Option<&RunOutcome>) -> Result<()> {
    match outcome {
        Some(RunOutcome::Errored { reason }) => Err(anyhow!("Competition run failed: {}", reason)),
        _ => Ok(()),
    }
}

/// Start one run, log every applied day and wait for it to end.
pub async fn run_headless(
    commands: mpsc::Sender<ControlCommand>,
    mut frames: watch::Receiver<Frame>,
) -> Result<Option<RunOutcome>> {
    commands
        .send(ControlCommand::Start)
        .await
        .context("Stream controller is not running")?;

    let mut last_applied = 0;
    loop {
        frames
            .changed()
            .await
            .context("Stream controller stopped before the run ended")?;
        let frame = frames.borrow_and_update().clone();

        if frame.messages_applied > last_applied {
            log_progress(&frame, last_applied as usize);
            last_applied = frame.messages_applied;
        }

        // Nil run id: the start has not been picked up yet
        if !frame.run_id.is_nil() && frame.state == RunState::Idle && frame.last_outcome.is_some() {
            log_summary(&frame);
            let _ = commands.send(ControlCommand::Shutdown).await;
            return Ok(frame.last_outcome);
        }
    }
}

/// Log every day applied since `from`, reading the history in the frame so
/// days coalesced by the watch channel are not lost
fn log_progress(frame: &Frame, from: usize) {
    for (offset, day) in applied_days(frame, from).iter().enumerate() {
        let index = from + offset;
        for agent in AgentId::ALL {
            let timeline = frame.store.timeline(agent);
            info!(
                run_id = %frame.run_id,
                agent = %agent,
                day = %day,
                money = ?timeline.money().get(index),
                energy = ?timeline.energy().get(index),
                "Tick"
            );
        }
    }
}

/// Chart days of the messages applied after the first `from`
fn applied_days(frame: &Frame, from: usize) -> &[Day] {
    frame.dashboard.money_chart().labels().get(from..).unwrap_or(&[])
}

fn log_summary(frame: &Frame) {
    match &frame.last_outcome {
        Some(RunOutcome::Errored { reason }) => {
            warn!(run_id = %frame.run_id, reason = %reason, "Run ended with an error")
        }
        _ => info!(run_id = %frame.run_id, messages = frame.messages_applied, "Run ended"),
    }

    for (rank, (agent, money)) in standings(&frame.store).into_iter().enumerate() {
        let timeline = frame.store.timeline(agent);
        info!(
            rank = rank + 1,
            agent = agent.label(),
            money,
            energy = ?timeline.latest_energy(),
            actions = timeline.actions().len(),
            "Standing"
        );
    }
}
