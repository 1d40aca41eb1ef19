use crate::action::{glyph_for, ActionCategory};
use crate::event::CropEntry;
use serde::Serialize;

/// Number of plots on a farm.
pub const GRID_CAPACITY: usize = 25;

/// Plots per row when drawn as a square
pub const GRID_COLUMNS: usize = 5;

const EMPTY_PLOT_TOOLTIP: &str = "Empty plot";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridCell {
    /// Crop glyph, or the raw crop type when it has none; empty for free plots
    pub glyph: String,
    pub tooltip: String,
    pub occupied: bool,
}

impl GridCell {
    fn planted(crop: &CropEntry) -> Self {
        Self {
            glyph: glyph_for(&crop.crop_type)
                .map(str::to_string)
                .unwrap_or_else(|| crop.crop_type.clone()),
            tooltip: format!("{} (planted on day {})", crop.crop_type, crop.planted_at),
            occupied: true,
        }
    }

    fn empty() -> Self {
        Self {
            glyph: String::new(),
            tooltip: EMPTY_PLOT_TOOLTIP.to_string(),
            occupied: false,
        }
    }
}

/// Current plot layout of one farm.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FarmGrid {
    cells: Vec<GridCell>,
    maintenance_overlay: bool,
}

impl FarmGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![GridCell::empty(); GRID_CAPACITY],
            maintenance_overlay: false,
        }
    }

    /// Rebuild the grid from scratch.
    ///
    /// Crops fill cells in planting order; anything past capacity is not
    /// shown. The overlay is visible only right after a maintenance action.
    pub fn render(&mut self, crops: &[CropEntry], last_action: ActionCategory) {
        self.cells = (0..GRID_CAPACITY)
            .map(|i| crops.get(i).map(GridCell::planted).unwrap_or_else(GridCell::empty))
            .collect();
        self.maintenance_overlay = last_action == ActionCategory::Maintenance;
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(GRID_COLUMNS)
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.occupied).count()
    }

    pub fn maintenance_overlay(&self) -> bool {
        self.maintenance_overlay
    }
}

impl Default for FarmGrid {
    fn default() -> Self {
        Self::new()
    }
}
