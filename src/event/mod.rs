use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

mod validation;
#[cfg(test)]
mod tests;

pub use validation::{parse_message, PayloadError};

/// Label the server uses as the day of its closing message.
const FINAL_DAY_LABEL: &str = "Final";

/// One of the two competing farms.
///
/// The wire key doubles as the identifier (`gpt35` / `gpt4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AgentId {
    Gpt35,
    Gpt4,
}

impl AgentId {
    pub const ALL: [AgentId; 2] = [AgentId::Gpt35, AgentId::Gpt4];

    /// Key of this agent's snapshot in a stream message
    pub fn key(&self) -> &'static str {
        match self {
            AgentId::Gpt35 => "gpt35",
            AgentId::Gpt4 => "gpt4",
        }
    }

    /// Human-readable name for legends and panel titles
    pub fn label(&self) -> &'static str {
        match self {
            AgentId::Gpt35 => "GPT-3.5",
            AgentId::Gpt4 => "GPT-4",
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Logical tick index of a snapshot.
///
/// Numbered days come first; the closing message carries `"Final"`, which
/// orders after every numbered day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "DayRepr", into = "DayRepr")]
pub enum Day {
    Number(i64),
    Final,
}

impl Day {
    pub fn number(&self) -> Option<i64> {
        match self {
            Day::Number(n) => Some(*n),
            Day::Final => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Day::Final)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Day::Number(n) => write!(f, "{}", n),
            Day::Final => f.write_str(FINAL_DAY_LABEL),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DayRepr {
    Number(i64),
    Label(String),
}

impl TryFrom<DayRepr> for Day {
    type Error = String;

    fn try_from(repr: DayRepr) -> Result<Self, Self::Error> {
        match repr {
            DayRepr::Number(n) => Ok(Day::Number(n)),
            DayRepr::Label(label) if label == FINAL_DAY_LABEL => Ok(Day::Final),
            DayRepr::Label(label) => Err(format!("invalid day '{}'", label)),
        }
    }
}

impl From<Day> for DayRepr {
    fn from(day: Day) -> Self {
        match day {
            Day::Number(n) => DayRepr::Number(n),
            Day::Final => DayRepr::Label(FINAL_DAY_LABEL.to_string()),
        }
    }
}

/// One planted plot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropEntry {
    #[serde(rename = "type")]
    pub crop_type: String,
    pub planted_at: i64,
}

/// State of one farm after one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub day: Day,
    pub money: f64,
    pub energy: f64,
    /// Plots in planting order
    pub crops: Vec<CropEntry>,
    /// Raw decision, e.g. "3 Plant Corn"
    pub decision: String,
    /// Only present on the closing message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvested_crops: Option<BTreeMap<String, i64>>,
}

/// A single stream message: one snapshot per agent for the same tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickMessage {
    pub gpt35: TickSnapshot,
    pub gpt4: TickSnapshot,
}

impl TickMessage {
    pub fn snapshot(&self, agent: AgentId) -> &TickSnapshot {
        match agent {
            AgentId::Gpt35 => &self.gpt35,
            AgentId::Gpt4 => &self.gpt4,
        }
    }

    /// Day the charts and the action timeline are keyed by.
    pub fn chart_day(&self) -> Day {
        self.gpt4.day
    }
}
