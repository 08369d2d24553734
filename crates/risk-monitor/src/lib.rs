use std::future::Future;

pub mod controller;
pub mod defaults;
pub mod infrastructure;
pub mod layers;
pub mod normalize;
pub mod store;
pub mod view;

pub use controller::{Controller, Dashboard, LayerRefresh, Settings};
pub use defaults::ModeDefaults;
pub use store::AlertStore;

use risk_models::{HistoryRecord, MapLayerRequest, MapLayerResponse, SimulationRecord};

/// Sources are the upstream collaborators which feed the monitor.
///
/// Implementations perform I/O and may fail: the monitor decides what
/// a failure means for the presentation.
pub trait Sources: Send + Sync + 'static {
    /// Fetch the historical snapshot of alerts.
    fn history(&self) -> impl Future<Output = anyhow::Result<Vec<HistoryRecord>>> + Send;

    /// Fetch one live simulation poll.
    fn simulate(&self) -> impl Future<Output = anyhow::Result<Vec<SimulationRecord>>> + Send;

    /// Fetch the tile reference of a single raster map layer.
    fn map_layer(
        &self,
        request: MapLayerRequest,
    ) -> impl Future<Output = anyhow::Result<MapLayerResponse>> + Send;
}

/// Mode is the acquisition state: which upstream source feeds the alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// One-shot snapshot of past alerts. This is the initial mode.
    Historical,
    /// Recurring poll of the live simulation feed.
    Simulation,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Historical => Mode::Simulation,
            Mode::Simulation => Mode::Historical,
        }
    }

    /// Banner text shown in the status header.
    pub fn banner(self) -> &'static str {
        match self {
            Mode::Historical => "HISTORICAL",
            Mode::Simulation => "SIMULATION ACTIVE",
        }
    }

    /// Nominal confidence of alerts sourced in this mode.
    pub fn confidence(self) -> &'static str {
        match self {
            Mode::Historical => "100%",
            Mode::Simulation => "95%",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Historical => f.write_str("historical"),
            Mode::Simulation => f.write_str("simulation"),
        }
    }
}

/// AcquireError is the reason an acquisition cycle left the alerts untouched.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("failed to fetch {mode} alerts")]
    Fetch {
        mode: Mode,
        #[source]
        source: anyhow::Error,
    },
    #[error("{mode} source returned no usable alerts")]
    Empty { mode: Mode },
    #[error("{mode} response rejected")]
    Rejected {
        mode: Mode,
        #[source]
        source: normalize::NormalizeError,
    },
}
