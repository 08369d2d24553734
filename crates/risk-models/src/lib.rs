//! Wire records exchanged with the risk API, and the canonical entities
//! derived from them.

mod alert;
pub mod infrastructure;
mod layers;
mod records;
mod risk;

pub use alert::{Alert, AlertId, Coords, Metrics};
pub use layers::{LayerKind, LayerSet};
pub use records::{HistoryRecord, MapLayerRequest, MapLayerResponse, SimulationRecord};
pub use risk::Risk;

/// Region name of the placeholder record which upstream emits while it boots.
/// It's never presented as a real alert.
pub const SYSTEM_STARTUP_REGION: &str = "System Startup";

/// Wildcard district selector of map-layer requests.
pub const ALL_DISTRICTS: &str = "All";
