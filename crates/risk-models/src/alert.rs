use crate::Risk;

/// Identifier of an Alert within the collection it was minted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AlertId(String);

impl AlertId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier of a historical alert, which is its position in the snapshot.
    pub fn position(index: usize) -> Self {
        Self(index.to_string())
    }

    /// Identifier of a simulated alert. `cycle` is unique to the poll which
    /// produced the record, and `index` is its position within that poll.
    pub fn minted(cycle: u64, index: usize) -> Self {
        Self(format!("sim-{index}-{cycle}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for AlertId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

/// Contributing factors behind an alert's risk level.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Metrics {
    /// Slope instability, degrees.
    pub slope: f64,
    /// Rainfall, millimeters.
    pub rain: f64,
    /// Topographic wetness index.
    pub twi: f64,
    /// Vegetation health, as a percentage.
    pub ndvi: f64,
    /// Soil moisture saturation, as a percentage.
    /// Historical snapshots don't report it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture: Option<f64>,
    /// Ground vibration, mm/s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration: Option<f64>,
}

/// Alert is the canonical risk record of one region at a point in time.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub region: String,
    pub risk: Risk,
    /// Display label of when the alert was observed.
    pub time: String,
    pub coords: Coords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    /// Reference to an illustrative image of the alert's terrain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_image: Option<String>,
}
