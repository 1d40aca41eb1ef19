use super::transport::{EventStream, Transport};
use super::{ControlCommand, ControlSurface, RunOutcome, RunState};
use crate::event::{parse_message, AgentId, TickMessage};
use crate::projection::Dashboard;
use crate::series::SeriesStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Immutable view of the controller, published after every completed step
#[derive(Clone, Debug)]
pub struct Frame {
    pub run_id: Uuid,
    pub state: RunState,
    pub controls: ControlSurface,
    pub store: SeriesStore,
    pub dashboard: Dashboard,
    pub messages_applied: u64,
    pub last_outcome: Option<RunOutcome>,
    /// Operator-facing message, e.g. a failed stop request
    pub notice: Option<String>,
    pub published_at: DateTime<Utc>,
}

enum Link {
    Closed,
    Opening(BoxFuture<'static, Result<EventStream>>),
    Open(EventStream),
}

enum LinkEvent {
    Opened(EventStream),
    Message(String),
    Failed(anyhow::Error),
    Ended,
}

impl Link {
    fn is_active(&self) -> bool {
        !matches!(self, Link::Closed)
    }

    /// Wait for the next thing the connection has to say.
    ///
    /// Safe to cancel: an unfinished connect stays in `Opening` and is
    /// resumed on the next call.
    async fn next_event(&mut self) -> LinkEvent {
        match self {
            Link::Closed => std::future::pending().await,
            Link::Opening(connect) => match connect.await {
                Ok(stream) => LinkEvent::Opened(stream),
                Err(e) => LinkEvent::Failed(e),
            },
            Link::Open(stream) => match stream.next().await {
                Some(Ok(data)) => LinkEvent::Message(data),
                Some(Err(e)) => LinkEvent::Failed(e),
                None => LinkEvent::Ended,
            },
        }
    }
}

/// Safe to cancel: the request stays in `stopping` and is resumed
async fn stop_answer(stopping: &mut Option<BoxFuture<'static, Result<()>>>) -> Result<()> {
    match stopping {
        Some(request) => request.await,
        None => std::future::pending().await,
    }
}

/// Owns the connection, the series store and the projections.
///
/// Messages are handled strictly one at a time: parse, pacing delay, then
/// grids, stats, store, charts and action timeline. Commands are only looked
/// at between messages.
pub struct StreamController {
    transport: Arc<dyn Transport>,
    pacing: Duration,
    store: SeriesStore,
    dashboard: Dashboard,
    state: RunState,
    controls: ControlSurface,
    link: Link,
    /// Stop request in flight, answered inside the run loop
    stopping: Option<BoxFuture<'static, Result<()>>>,
    run_id: Uuid,
    messages_applied: u64,
    last_outcome: Option<RunOutcome>,
    notice: Option<String>,
    frames: watch::Sender<Frame>,
}

impl StreamController {
    pub fn new(transport: Arc<dyn Transport>, pacing: Duration) -> Self {
        let store = SeriesStore::new();
        let dashboard = Dashboard::new();
        let (frames, _) = watch::channel(Frame {
            run_id: Uuid::nil(),
            state: RunState::Idle,
            controls: ControlSurface::idle(),
            store: store.clone(),
            dashboard: dashboard.clone(),
            messages_applied: 0,
            last_outcome: None,
            notice: None,
            published_at: Utc::now(),
        });

        Self {
            transport,
            pacing,
            store,
            dashboard,
            state: RunState::Idle,
            controls: ControlSurface::idle(),
            link: Link::Closed,
            stopping: None,
            run_id: Uuid::nil(),
            messages_applied: 0,
            last_outcome: None,
            notice: None,
            frames,
        }
    }

    /// Receive a frame after every state change
    pub fn subscribe(&self) -> watch::Receiver<Frame> {
        self.frames.subscribe()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn controls(&self) -> ControlSurface {
        self.controls
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn messages_applied(&self) -> u64 {
        self.messages_applied
    }

    pub fn last_outcome(&self) -> Option<&RunOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Begin a new run. Ignored unless idle.
    ///
    /// The store and projections are cleared here and nowhere else. The
    /// connection is opened by the following [`StreamController::step`]s.
    pub fn start(&mut self) -> bool {
        if self.state != RunState::Idle || !self.controls.start_enabled {
            debug!(state = %self.state, "Start ignored");
            return false;
        }

        self.run_id = Uuid::now_v7();
        self.transition(RunState::Connecting);
        self.store.reset();
        self.dashboard.reset();
        self.messages_applied = 0;
        self.last_outcome = None;
        self.notice = None;
        self.controls = ControlSurface::running();

        let transport = Arc::clone(&self.transport);
        self.link = Link::Opening(Box::pin(async move { transport.open().await }));

        info!(run_id = %self.run_id, "Competition run started");
        self.publish();
        true
    }

    /// Send the stop request without waiting for the answer.
    ///
    /// Ignored unless connecting or streaming, and while an earlier request
    /// is still in flight. The answer is handled by [`StreamController::run`].
    pub fn begin_stop(&mut self) -> bool {
        if !self.state.is_active() || !self.controls.stop_enabled {
            debug!(state = %self.state, "Stop ignored");
            return false;
        }
        if self.stopping.is_some() {
            debug!(run_id = %self.run_id, "Stop already in flight");
            return false;
        }

        let transport = Arc::clone(&self.transport);
        self.stopping = Some(Box::pin(async move { transport.request_stop().await }));
        info!(run_id = %self.run_id, "Stop requested");
        true
    }

    /// Ask the server to stop and wait for the answer.
    ///
    /// On acknowledgment the connection is closed and the run ends. On failure
    /// the stream keeps going and the stop control stays enabled.
    pub async fn stop(&mut self) -> bool {
        if !self.begin_stop() {
            return false;
        }
        let result = match self.stopping.take() {
            Some(request) => request.await,
            None => return false,
        };
        self.stop_answered(result)
    }

    fn stop_answered(&mut self, result: Result<()>) -> bool {
        match result {
            Ok(()) => {
                info!(run_id = %self.run_id, "Competition stopped by operator");
                self.finish(RunOutcome::Stopped);
                true
            }
            Err(e) => {
                error!(run_id = %self.run_id, error = %e, "Failed to stop competition");
                self.notice = Some(format!("Failed to stop competition: {:#}", e));
                self.publish();
                false
            }
        }
    }

    /// Handle one command; returns false on shutdown
    pub fn handle_command(&mut self, command: ControlCommand) -> bool {
        match command {
            ControlCommand::Start => {
                self.start();
            }
            ControlCommand::Stop => {
                self.begin_stop();
            }
            ControlCommand::Shutdown => return false,
        }
        true
    }

    /// Process the next connection event to completion.
    ///
    /// Returns false when there is no connection to wait on.
    pub async fn step(&mut self) -> bool {
        if !self.link.is_active() {
            return false;
        }
        let event = self.link.next_event().await;
        self.handle_link_event(event).await;
        true
    }

    /// Drive the controller until shutdown or the command channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<ControlCommand>) -> Self {
        info!("Stream controller running");

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let keep_running = match command {
                        Some(command) => self.handle_command(command),
                        None => false,
                    };
                    if !keep_running {
                        break;
                    }
                }
                event = self.link.next_event(), if self.link.is_active() => {
                    self.handle_link_event(event).await;
                }
                result = stop_answer(&mut self.stopping), if self.stopping.is_some() => {
                    self.stopping = None;
                    self.stop_answered(result);
                }
            }
        }

        if self.state.is_active() {
            info!(run_id = %self.run_id, "Dropping competition stream on shutdown");
            self.link = Link::Closed;
        }
        info!("Stream controller stopped");
        self
    }

    async fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Opened(stream) => {
                self.link = Link::Open(stream);
                self.transition(RunState::Streaming);
                self.publish();
            }
            LinkEvent::Message(data) => self.on_message(&data).await,
            LinkEvent::Failed(e) => {
                error!(run_id = %self.run_id, error = %e, "Competition stream failed");
                self.finish(RunOutcome::Errored {
                    reason: format!("{:#}", e),
                });
            }
            LinkEvent::Ended => {
                info!(run_id = %self.run_id, "Server closed the competition stream");
                self.finish(RunOutcome::Stopped);
            }
        }
    }

    async fn on_message(&mut self, data: &str) {
        let message = match parse_message(data) {
            Ok(message) => message,
            Err(e) => {
                warn!(run_id = %self.run_id, error = %e, "Malformed competition payload");
                self.finish(RunOutcome::Errored {
                    reason: format!("Malformed payload: {}", e),
                });
                return;
            }
        };

        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }

        self.apply(&message);
        self.messages_applied += 1;

        debug!(
            run_id = %self.run_id,
            day = %message.chart_day(),
            applied = self.messages_applied,
            "Message applied"
        );
        self.publish();
    }

    fn apply(&mut self, message: &TickMessage) {
        for agent in AgentId::ALL {
            self.dashboard.render_grid(agent, message.snapshot(agent));
        }
        for agent in AgentId::ALL {
            self.dashboard.update_stats(agent, message.snapshot(agent));
        }

        self.store.apply_message(message);

        let day = message.chart_day();
        self.dashboard.update_charts(day, &self.store);
        for agent in AgentId::ALL {
            self.dashboard
                .update_actions(day, agent, &message.snapshot(agent).decision);
        }
    }

    /// Close the connection and return to idle through `Stopped`/`Errored`
    fn finish(&mut self, outcome: RunOutcome) {
        self.link = Link::Closed;
        self.stopping = None;
        self.controls = ControlSurface::idle();

        match &outcome {
            RunOutcome::Stopped => self.transition(RunState::Stopped),
            RunOutcome::Errored { reason } => {
                self.notice = Some(reason.clone());
                self.transition(RunState::Errored);
            }
        }
        self.last_outcome = Some(outcome);
        self.transition(RunState::Idle);

        info!(
            run_id = %self.run_id,
            messages = self.messages_applied,
            "Competition run ended"
        );
        self.publish();
    }

    fn transition(&mut self, to: RunState) {
        debug!(run_id = %self.run_id, from = %self.state, to = %to, "Run state transition");
        self.state = to;
    }

    fn publish(&self) {
        self.frames.send_replace(Frame {
            run_id: self.run_id,
            state: self.state,
            controls: self.controls,
            store: self.store.clone(),
            dashboard: self.dashboard.clone(),
            messages_applied: self.messages_applied,
            last_outcome: self.last_outcome.clone(),
            notice: self.notice.clone(),
            published_at: Utc::now(),
        });
    }
}
