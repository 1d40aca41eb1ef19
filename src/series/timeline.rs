use crate::action::ActionCategory;
use crate::event::Day;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One classified, non-finished decision of an agent
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionEvent {
    pub day: Day,
    pub category: ActionCategory,
    pub raw_decision: String,
}

/// Append-only history of one agent over one run.
///
/// `money` and `energy` always have the same length: the number of ticks
/// folded in so far.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AgentTimeline {
    money: Vec<f64>,
    energy: Vec<f64>,
    actions: Vec<ActionEvent>,
    last_day: Option<Day>,
    last_updated: Option<DateTime<Utc>>,
}

impl AgentTimeline {
    pub fn money(&self) -> &[f64] {
        &self.money
    }

    pub fn energy(&self) -> &[f64] {
        &self.energy
    }

    pub fn actions(&self) -> &[ActionEvent] {
        &self.actions
    }

    pub fn ticks_processed(&self) -> usize {
        self.money.len()
    }

    pub fn latest_money(&self) -> Option<f64> {
        self.money.last().copied()
    }

    pub fn latest_energy(&self) -> Option<f64> {
        self.energy.last().copied()
    }

    pub fn last_action(&self) -> Option<&ActionEvent> {
        self.actions.last()
    }

    pub fn last_day(&self) -> Option<Day> {
        self.last_day
    }

    /// Wall-clock time the last tick was folded in
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub(super) fn push_gauges(&mut self, day: Day, money: f64, energy: f64) {
        self.money.push(money);
        self.energy.push(energy);
        self.last_day = Some(day);
        self.last_updated = Some(Utc::now());
    }

    pub(super) fn push_action(&mut self, event: ActionEvent) {
        self.actions.push(event);
    }
}
