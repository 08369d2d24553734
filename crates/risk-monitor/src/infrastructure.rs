use anyhow::Context;
use risk_models::{
    infrastructure::{Feature, FeatureCollection},
    Coords, Risk,
};

/// Access routes of the monitored hill regions, bundled for when no
/// other dataset is provided.
const BUNDLED: &str = include_str!("infrastructure.geojson");

/// Parse the bundled infrastructure dataset.
pub fn bundled() -> anyhow::Result<FeatureCollection> {
    serde_json::from_str(BUNDLED).context("parsing bundled infrastructure dataset")
}

/// Load an infrastructure dataset from a GeoJSON file at `path`.
pub async fn load(path: &std::path::Path) -> anyhow::Result<FeatureCollection> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading infrastructure dataset {}", path.display()))?;

    serde_json::from_slice(&content)
        .with_context(|| format!("parsing infrastructure dataset {}", path.display()))
}

/// Stroke style of a drawn route.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStyle {
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f64,
    pub dash_array: &'static str,
}

pub fn route_style(exposure: &Risk) -> RouteStyle {
    RouteStyle {
        color: match exposure {
            Risk::High => "#ff0000",
            _ => "#0000ff",
        },
        weight: 4,
        opacity: 0.8,
        dash_array: "5, 10",
    }
}

/// Route is a styled critical route, ready to be drawn.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Route {
    pub name: String,
    pub route_type: String,
    pub exposure: Risk,
    pub path: Vec<Coords>,
    pub style: RouteStyle,
}

impl From<&Feature> for Route {
    fn from(feature: &Feature) -> Self {
        let props = &feature.properties;

        Route {
            name: props.name.clone(),
            route_type: props.route_type.clone(),
            exposure: props.risk_exposure.clone(),
            path: feature.geometry.path(),
            style: route_style(&props.risk_exposure),
        }
    }
}

pub fn routes(collection: &FeatureCollection) -> Vec<Route> {
    collection.features.iter().map(Route::from).collect()
}
