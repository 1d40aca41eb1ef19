use crate::event::{Day, TickSnapshot};
use serde::Serialize;
use std::collections::BTreeMap;

/// Headline numbers of one farm, as of the latest tick
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FarmStats {
    pub day: Option<Day>,
    pub money: Option<f64>,
    pub energy: Option<f64>,
    pub decision: Option<String>,
    /// Planted crops by type
    pub crops: BTreeMap<String, usize>,
    /// Only known once the closing message arrives
    pub harvested: BTreeMap<String, i64>,
}

impl FarmStats {
    pub fn update(&mut self, snapshot: &TickSnapshot) {
        self.day = Some(snapshot.day);
        self.money = Some(snapshot.money);
        self.energy = Some(snapshot.energy);
        self.decision = Some(snapshot.decision.clone());
        self.crops.clear();
        for crop in &snapshot.crops {
            *self.crops.entry(crop.crop_type.clone()).or_default() += 1;
        }
        if let Some(harvested) = &snapshot.harvested_crops {
            self.harvested = harvested.clone();
        }
    }
}
