use crate::action::{classify, Classified};
use crate::event::{AgentId, TickMessage, TickSnapshot};
use crate::series::timeline::{ActionEvent, AgentTimeline};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Series store holds every agent's timeline for the current run
#[derive(Clone, Debug)]
pub struct SeriesStore {
    timelines: BTreeMap<AgentId, AgentTimeline>,
}

impl SeriesStore {
    /// Create a store with an empty timeline per agent
    pub fn new() -> Self {
        Self {
            timelines: AgentId::ALL
                .into_iter()
                .map(|agent| (agent, AgentTimeline::default()))
                .collect(),
        }
    }

    /// Fold one agent's snapshot into its timeline.
    ///
    /// Money and energy are always appended. The decision is recorded as an
    /// action unless it classifies as finished. Returns the classification so
    /// callers don't split the decision a second time.
    pub fn apply_tick(&mut self, agent: AgentId, snapshot: &TickSnapshot) -> Classified {
        let classified = classify(&snapshot.decision);
        let timeline = self.timelines.entry(agent).or_default();

        if let Some(previous) = timeline.last_day() {
            if snapshot.day < previous {
                warn!(
                    agent = %agent,
                    previous = %previous,
                    day = %snapshot.day,
                    "Tick day went backwards, applying in arrival order"
                );
            }
        }

        timeline.push_gauges(snapshot.day, snapshot.money, snapshot.energy);

        if !classified.category.is_finished() {
            timeline.push_action(ActionEvent {
                day: snapshot.day,
                category: classified.category,
                raw_decision: snapshot.decision.clone(),
            });
        }

        debug!(
            agent = %agent,
            day = %snapshot.day,
            category = %classified.category,
            ticks = timeline.ticks_processed(),
            "Tick applied"
        );

        classified
    }

    /// Fold both snapshots of a message, in agent order
    pub fn apply_message(&mut self, message: &TickMessage) {
        for agent in AgentId::ALL {
            self.apply_tick(agent, message.snapshot(agent));
        }
    }

    pub fn timeline(&self, agent: AgentId) -> &AgentTimeline {
        // Every agent is inserted in new() and reset()
        &self.timelines[&agent]
    }

    pub fn timelines(&self) -> impl Iterator<Item = (AgentId, &AgentTimeline)> {
        self.timelines.iter().map(|(agent, timeline)| (*agent, timeline))
    }

    /// Drop all history; called once per competition start
    pub fn reset(&mut self) {
        for timeline in self.timelines.values_mut() {
            *timeline = AgentTimeline::default();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.values().all(|t| t.ticks_processed() == 0)
    }
}

impl Default for SeriesStore {
    fn default() -> Self {
        Self::new()
    }
}
