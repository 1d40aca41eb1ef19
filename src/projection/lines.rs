use crate::event::{AgentId, Day};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineSeries {
    pub agent: AgentId,
    pub label: String,
    pub values: Vec<f64>,
}

/// Line chart over days with one series per agent.
///
/// Grows by exactly one label and one value per series per call; nothing is
/// ever removed or resampled.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineChart {
    title: String,
    labels: Vec<Day>,
    series: Vec<LineSeries>,
}

impl LineChart {
    /// `metric` names the plotted gauge, e.g. "Money"
    pub fn new(metric: &str) -> Self {
        Self {
            title: format!("{} Over Time", metric),
            labels: Vec::new(),
            series: AgentId::ALL
                .into_iter()
                .map(|agent| LineSeries {
                    agent,
                    label: format!("{} {}", agent.label(), metric),
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn append_point(&mut self, day: Day, gpt35: f64, gpt4: f64) {
        self.labels.push(day);
        for series in &mut self.series {
            series.values.push(match series.agent {
                AgentId::Gpt35 => gpt35,
                AgentId::Gpt4 => gpt4,
            });
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn labels(&self) -> &[Day] {
        &self.labels
    }

    pub fn series(&self) -> &[LineSeries] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Plot coordinates of one series. The final day sits one step after the
    /// last numbered day.
    pub fn points(&self, agent: AgentId) -> Vec<(f64, f64)> {
        let Some(series) = self.series.iter().find(|s| s.agent == agent) else {
            return Vec::new();
        };
        day_axis(&self.labels)
            .into_iter()
            .zip(series.values.iter().copied())
            .collect()
    }

    /// Smallest and largest plotted value across both series
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(None, |bounds, v| match bounds {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Maps days onto a numeric x-axis.
pub fn day_axis(days: &[Day]) -> Vec<f64> {
    let mut last = 0.0;
    days.iter()
        .map(|day| {
            let x = match day {
                Day::Number(n) => *n as f64,
                Day::Final => last + 1.0,
            };
            last = x;
            x
        })
        .collect()
}
