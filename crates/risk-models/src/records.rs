use crate::{LayerKind, Metrics, Risk};

/// A record of the historical snapshot, as returned by `GET history`.
/// Upstream also sends `timestamp` and `type`, which aren't used.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HistoryRecord {
    pub region: String,
    pub risk: Risk,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
}

/// A record of one simulation poll, as returned by `GET simulate`.
///
/// Coordinates are required of simulated alerts, but are modeled as optional
/// so that a record lacking them can be reported rather than failing to
/// decode the entire response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimulationRecord {
    pub region: String,
    pub risk: Risk,
    pub timestamp: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
}

/// Request body of `POST map-layer`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapLayerRequest {
    pub districts: Vec<String>,
    pub layer_type: LayerKind,
}

/// Response body of `POST map-layer`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapLayerResponse {
    #[serde(rename = "tileUrl", default, skip_serializing_if = "Option::is_none")]
    pub tile_url: Option<String>,
}
