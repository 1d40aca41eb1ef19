// Visual projections of the series store: farm grids, stats, line charts
// and the action timeline. Each owns its own state.

mod grid;
mod lines;
mod scatter;
mod stats;

pub use grid::{FarmGrid, GridCell, GRID_CAPACITY, GRID_COLUMNS};
pub use lines::{day_axis, LineChart, LineSeries};
pub use scatter::{ActionScatter, ScatterPoint, ScatterTooltip, UNKNOWN_LANE};
pub use stats::FarmStats;

use crate::action::classify;
use crate::event::{AgentId, Day, TickSnapshot};
use crate::series::SeriesStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Everything the front-end draws for one run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    grids: BTreeMap<AgentId, FarmGrid>,
    stats: BTreeMap<AgentId, FarmStats>,
    money: LineChart,
    energy: LineChart,
    actions: ActionScatter,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            grids: AgentId::ALL.into_iter().map(|a| (a, FarmGrid::new())).collect(),
            stats: AgentId::ALL.into_iter().map(|a| (a, FarmStats::default())).collect(),
            money: LineChart::new("Money"),
            energy: LineChart::new("Energy"),
            actions: ActionScatter::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Redraw an agent's grid from its crops and latest decision
    pub fn render_grid(&mut self, agent: AgentId, snapshot: &TickSnapshot) {
        let last_action = classify(&snapshot.decision).category;
        self.grids
            .entry(agent)
            .or_default()
            .render(&snapshot.crops, last_action);
    }

    pub fn update_stats(&mut self, agent: AgentId, snapshot: &TickSnapshot) {
        self.stats.entry(agent).or_default().update(snapshot);
    }

    /// Append the store's latest money and energy to both charts
    pub fn update_charts(&mut self, day: Day, store: &SeriesStore) {
        let gpt35 = store.timeline(AgentId::Gpt35);
        let gpt4 = store.timeline(AgentId::Gpt4);

        match (gpt35.latest_money(), gpt4.latest_money()) {
            (Some(a), Some(b)) => self.money.append_point(day, a, b),
            _ => warn!(day = %day, "No money values to chart"),
        }
        match (gpt35.latest_energy(), gpt4.latest_energy()) {
            (Some(a), Some(b)) => self.energy.append_point(day, a, b),
            _ => warn!(day = %day, "No energy values to chart"),
        }
    }

    pub fn update_actions(&mut self, day: Day, agent: AgentId, raw_decision: &str) {
        self.actions.append_action(day, agent, raw_decision);
    }

    pub fn grid(&self, agent: AgentId) -> Option<&FarmGrid> {
        self.grids.get(&agent)
    }

    pub fn stats(&self, agent: AgentId) -> Option<&FarmStats> {
        self.stats.get(&agent)
    }

    pub fn money_chart(&self) -> &LineChart {
        &self.money
    }

    pub fn energy_chart(&self) -> &LineChart {
        &self.energy
    }

    pub fn action_scatter(&self) -> &ActionScatter {
        &self.actions
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}
