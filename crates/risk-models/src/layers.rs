use std::collections::BTreeMap;

/// Kind of a raster map layer. Declaration order is the display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Composite risk heatmap.
    Risk,
    /// Slope intensity of the terrain.
    Slope,
    /// Topographic wetness index.
    Twi,
    /// Vegetation health.
    Ndvi,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Risk,
        LayerKind::Slope,
        LayerKind::Twi,
        LayerKind::Ndvi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Risk => "risk",
            LayerKind::Slope => "slope",
            LayerKind::Twi => "twi",
            LayerKind::Ndvi => "ndvi",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LayerSet maps each available layer kind to its tile reference.
/// A kind which isn't present has no overlay available.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LayerSet(BTreeMap<LayerKind, String>);

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: LayerKind, tile_url: String) {
        self.0.insert(kind, tile_url);
    }

    pub fn get(&self, kind: LayerKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    pub fn contains(&self, kind: LayerKind) -> bool {
        self.0.contains_key(&kind)
    }

    /// Available kinds, in display order.
    pub fn kinds(&self) -> impl Iterator<Item = LayerKind> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerKind, &str)> + '_ {
        self.0.iter().map(|(kind, url)| (*kind, url.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(LayerKind, String)> for LayerSet {
    fn from_iter<I: IntoIterator<Item = (LayerKind, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
