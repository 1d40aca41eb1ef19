use serde::Serialize;
use std::fmt;


/// Glyph shown when a token has no entry in the glyph table.
pub const FALLBACK_GLYPH: &str = "❓";

/// Decision token the server sends once a competition is over.
const FINISHED_TOKEN: &str = "finished";

/// Fixed glyph table shared by the farm grid and the action timeline.
const GLYPHS: [(&str, &str); 6] = [
    ("Maintenance", "🛠️"),
    ("Harvest", "🧺"),
    ("Plant", "🌱"),
    ("Corn", "🌽"),
    ("Wheat", "🌾"),
    ("Tomato", "🍅"),
];

/// Closed classification of what a decision does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ActionCategory {
    Plant,
    Harvest,
    Maintenance,
    Sell,
    Buy,
    Sabotage,
    /// Sentinel for the closing "Competition finished" decision
    Finished,
    /// Any action token outside the table
    Unknown,
}

impl ActionCategory {
    /// Categories that own an abbreviation, in axis order.
    pub const ABBREVIATED: [ActionCategory; 6] = [
        ActionCategory::Plant,
        ActionCategory::Harvest,
        ActionCategory::Maintenance,
        ActionCategory::Sell,
        ActionCategory::Buy,
        ActionCategory::Sabotage,
    ];

    /// Look up an action token exactly as the server spells it.
    pub fn from_token(token: &str) -> Self {
        match token {
            "Plant" => ActionCategory::Plant,
            "Harvest" => ActionCategory::Harvest,
            "Maintenance" => ActionCategory::Maintenance,
            "Sell" => ActionCategory::Sell,
            "Buy" => ActionCategory::Buy,
            "Sabotage" => ActionCategory::Sabotage,
            FINISHED_TOKEN => ActionCategory::Finished,
            _ => ActionCategory::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionCategory::Plant => "Plant",
            ActionCategory::Harvest => "Harvest",
            ActionCategory::Maintenance => "Maintenance",
            ActionCategory::Sell => "Sell",
            ActionCategory::Buy => "Buy",
            ActionCategory::Sabotage => "Sabotage",
            ActionCategory::Finished => "finished",
            ActionCategory::Unknown => "unknown",
        }
    }

    /// Two-letter code used on the action timeline's y-axis.
    pub fn abbreviation(&self) -> Option<&'static str> {
        match self {
            ActionCategory::Plant => Some("PL"),
            ActionCategory::Harvest => Some("HV"),
            ActionCategory::Maintenance => Some("MT"),
            ActionCategory::Sell => Some("SL"),
            ActionCategory::Buy => Some("BY"),
            ActionCategory::Sabotage => Some("SB"),
            ActionCategory::Finished | ActionCategory::Unknown => None,
        }
    }

    /// Inverse of [`ActionCategory::abbreviation`].
    pub fn from_abbreviation(code: &str) -> Option<Self> {
        Self::ABBREVIATED
            .into_iter()
            .find(|category| category.abbreviation() == Some(code))
    }

    /// Glyph for the category, or [`FALLBACK_GLYPH`] when the table has none.
    pub fn glyph(&self) -> &'static str {
        glyph_for(self.name()).unwrap_or(FALLBACK_GLYPH)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, ActionCategory::Finished)
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of classifying one raw decision string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub category: ActionCategory,
    pub glyph: &'static str,
}

/// Glyph table lookup for action and crop names.
pub fn glyph_for(name: &str) -> Option<&'static str> {
    GLYPHS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, glyph)| *glyph)
}

/// Extract the action token: the second whitespace-delimited word.
pub fn action_token(raw_decision: &str) -> Option<&str> {
    raw_decision.split_whitespace().nth(1)
}

/// Classify a raw decision such as `"3 Plant Corn"`.
///
/// The first token is a turn marker and is ignored. Decisions with fewer than
/// two tokens, or an action outside the table, classify as
/// [`ActionCategory::Unknown`]. Never fails.
pub fn classify(raw_decision: &str) -> Classified {
    let category = action_token(raw_decision)
        .map(ActionCategory::from_token)
        .unwrap_or(ActionCategory::Unknown);

    Classified {
        category,
        glyph: category.glyph(),
    }
}
