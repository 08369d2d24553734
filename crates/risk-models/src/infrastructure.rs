//! GeoJSON shapes of the critical infrastructure dataset.
//! Only LineString features are modeled, as the dataset holds routes.

use crate::{Coords, Risk};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub properties: RouteProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RouteProperties {
    pub name: String,
    #[serde(rename = "type")]
    pub route_type: String,
    /// Exposure of the route to landslide risk: High or Medium.
    pub risk_exposure: Risk,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Positions are GeoJSON `[longitude, latitude]` pairs.
    LineString { coordinates: Vec<[f64; 2]> },
}

impl Geometry {
    pub fn path(&self) -> Vec<Coords> {
        match self {
            Geometry::LineString { coordinates } => coordinates
                .iter()
                .map(|[lng, lat]| Coords {
                    lat: *lat,
                    lng: *lng,
                })
                .collect(),
        }
    }
}
