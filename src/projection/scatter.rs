use crate::action::{classify, ActionCategory};
use crate::event::{AgentId, Day};
use serde::Serialize;
use std::collections::BTreeMap;

/// Lane for actions outside the category table.
pub const UNKNOWN_LANE: &str = "?";

/// One plotted decision
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub id: String,
    pub day: Day,
    pub category: ActionCategory,
    /// Abbreviation shown on the y-axis
    pub lane: &'static str,
    pub glyph: &'static str,
    pub raw_decision: String,
}

/// Hover text for a point
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScatterTooltip {
    pub title: String,
    pub label: String,
}

/// Timeline of categorical actions, one series per agent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionScatter {
    lanes: Vec<&'static str>,
    series: BTreeMap<AgentId, Vec<ScatterPoint>>,
}

impl ActionScatter {
    pub fn new() -> Self {
        let mut lanes: Vec<&'static str> = ActionCategory::ABBREVIATED
            .iter()
            .filter_map(|category| category.abbreviation())
            .collect();
        lanes.push(UNKNOWN_LANE);

        Self {
            lanes,
            series: AgentId::ALL.into_iter().map(|a| (a, Vec::new())).collect(),
        }
    }

    /// Plot an agent's decision at `day`.
    ///
    /// Finished decisions are skipped; everything else is appended in arrival
    /// order, duplicates of the same day included. Returns whether a point was
    /// added.
    pub fn append_action(&mut self, day: Day, agent: AgentId, raw_decision: &str) -> bool {
        let classified = classify(raw_decision);
        if classified.category.is_finished() {
            return false;
        }

        let point = ScatterPoint {
            id: format!("{}-{}", agent.key(), day),
            day,
            category: classified.category,
            lane: classified.category.abbreviation().unwrap_or(UNKNOWN_LANE),
            glyph: classified.glyph,
            raw_decision: raw_decision.to_string(),
        };
        self.series.entry(agent).or_default().push(point);
        true
    }

    /// Y-axis labels, bottom to top
    pub fn lanes(&self) -> &[&'static str] {
        &self.lanes
    }

    pub fn lane_index(&self, lane: &str) -> Option<usize> {
        self.lanes.iter().position(|l| *l == lane)
    }

    pub fn points(&self, agent: AgentId) -> &[ScatterPoint] {
        self.series.get(&agent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tooltip: `"PL - Plant"` over `"Day 1: T1 Plant Corn"`.
    ///
    /// The category name is recovered from the lane abbreviation.
    pub fn tooltip(point: &ScatterPoint) -> ScatterTooltip {
        let name = ActionCategory::from_abbreviation(point.lane)
            .map(|category| category.name())
            .unwrap_or(ActionCategory::Unknown.name());

        ScatterTooltip {
            title: format!("{} - {}", point.lane, name),
            label: format!("Day {}: {}", point.day, point.raw_decision),
        }
    }
}

impl Default for ActionScatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_plots_point_on_lane() {
        let mut scatter = ActionScatter::new();
        assert!(scatter.append_action(Day::Number(1), AgentId::Gpt35, "T1 Plant Corn"));

        let point = &scatter.points(AgentId::Gpt35)[0];
        assert_eq!(point.id, "gpt35-1");
        assert_eq!(point.day, Day::Number(1));
        assert_eq!(point.lane, "PL");
        assert_eq!(point.glyph, "🌱");
        assert_eq!(scatter.lane_index("PL"), Some(0));
    }

    #[test]
    fn test_finished_is_not_plotted() {
        let mut scatter = ActionScatter::new();
        assert!(!scatter.append_action(Day::Final, AgentId::Gpt4, "Competition finished"));
        assert!(scatter.is_empty());
    }

    #[test]
    fn test_unknown_lands_on_unknown_lane() {
        let mut scatter = ActionScatter::new();
        scatter.append_action(Day::Number(2), AgentId::Gpt4, "3 Wait");

        let point = &scatter.points(AgentId::Gpt4)[0];
        assert_eq!(point.lane, UNKNOWN_LANE);
        assert_eq!(point.glyph, crate::action::FALLBACK_GLYPH);
        assert_eq!(ActionScatter::tooltip(point).title, "? - unknown");
    }

    #[test]
    fn test_tooltip_inverts_abbreviation() {
        let mut scatter = ActionScatter::new();
        scatter.append_action(Day::Number(4), AgentId::Gpt35, "5 Buy Corn 3");

        let tooltip = ActionScatter::tooltip(&scatter.points(AgentId::Gpt35)[0]);
        assert_eq!(tooltip.title, "BY - Buy");
        assert_eq!(tooltip.label, "Day 4: 5 Buy Corn 3");
    }

    #[test]
    fn test_same_day_points_are_not_merged() {
        let mut scatter = ActionScatter::new();
        scatter.append_action(Day::Number(3), AgentId::Gpt35, "1 Harvest");
        scatter.append_action(Day::Number(3), AgentId::Gpt4, "1 Harvest");
        scatter.append_action(Day::Number(3), AgentId::Gpt4, "2 Sell Corn 1");

        assert_eq!(scatter.points(AgentId::Gpt35).len(), 1);
        let gpt4: Vec<_> = scatter.points(AgentId::Gpt4).iter().map(|p| p.lane).collect();
        assert_eq!(gpt4, vec!["HV", "SL"]);
        assert_eq!(scatter.len(), 3);
    }

    #[test]
    fn test_lanes_are_fixed() {
        let scatter = ActionScatter::new();
        assert_eq!(scatter.lanes(), &["PL", "HV", "MT", "SL", "BY", "SB", "?"]);
    }
}
