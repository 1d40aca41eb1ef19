// Per-agent series accumulated over one competition run

mod store;
mod timeline;

pub use store::SeriesStore;
pub use timeline::{ActionEvent, AgentTimeline};
