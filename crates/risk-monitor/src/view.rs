//! Presentation state derived from a Dashboard.
//!
//! Nothing here mutates: a View is recomputed from scratch whenever the
//! Dashboard changes, and renderers only ever read it.

use crate::{infrastructure::Route, AlertStore, Dashboard};
use risk_models::{Alert, AlertId, Coords, LayerKind, LayerSet, Metrics, Risk};

pub const PLACEHOLDER_PROMPT: &str = "Select a region on the map or list to view detailed analysis.";

pub const HIGH_COLOR: &str = "#e74c3c";
pub const MEDIUM_COLOR: &str = "#f1c40f";
pub const LOW_COLOR: &str = "#2ecc71";
/// Color of alerts having a risk level we don't recognize.
pub const NEUTRAL_COLOR: &str = "#95a5a6";

/// Order `alerts` by descending risk. Alerts of equal risk keep their relative order.
pub fn priority_list(alerts: &[Alert]) -> Vec<&Alert> {
    let mut list: Vec<&Alert> = alerts.iter().collect();
    list.sort_by_key(|alert| std::cmp::Reverse(alert.risk.rank()));
    list
}

/// Number of alerts whose risk is anything other than Low.
pub fn active_count(alerts: &[Alert]) -> usize {
    alerts.iter().filter(|alert| alert.risk != Risk::Low).count()
}

pub fn zone_color(risk: &Risk) -> &'static str {
    match risk {
        Risk::High => HIGH_COLOR,
        Risk::Medium => MEDIUM_COLOR,
        Risk::Low => LOW_COLOR,
        Risk::Unrecognized(_) => NEUTRAL_COLOR,
    }
}

/// Radius in meters of the buffer zone drawn around an alert, if it has one.
pub fn buffer_radius(risk: &Risk) -> Option<f64> {
    match risk {
        Risk::High => Some(8000.0),
        Risk::Medium => Some(4000.0),
        Risk::Low | Risk::Unrecognized(_) => None,
    }
}

/// Time label of an alert as shown in the alert list.
pub fn list_time_label(time: &str) -> &str {
    if time == "Just now" {
        "Now"
    } else {
        time
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BufferZone {
    pub radius_m: f64,
    pub color: &'static str,
}

/// One contributing factor shown in an alert's popup, as a percentage bar.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RiskDriver {
    pub label: &'static str,
    pub value: f64,
    pub color: &'static str,
}

impl RiskDriver {
    /// Filled width of the driver's bar, as a percentage.
    pub fn bar_percent(&self) -> f64 {
        self.value.clamp(0.0, 100.0)
    }
}

pub fn risk_drivers(metrics: &Metrics) -> Vec<RiskDriver> {
    vec![
        RiskDriver {
            label: "Slope Instability",
            value: metrics.slope,
            color: "#e74c3c",
        },
        RiskDriver {
            label: "Rainfall Saturation",
            value: metrics.rain,
            color: "#3498db",
        },
        RiskDriver {
            label: "Topographic Wetness",
            value: metrics.twi,
            color: "#9b59b6",
        },
        RiskDriver {
            label: "Vegetation Loss (Inv)",
            value: 100.0 - metrics.ndvi,
            color: "#2ecc71",
        },
    ]
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Marker {
    pub id: AlertId,
    pub region: String,
    pub risk: Risk,
    pub coords: Coords,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<BufferZone>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drivers: Vec<RiskDriver>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_image: Option<String>,
    pub selected: bool,
}

/// Map markers, one per alert and in the order of the store.
pub fn markers(store: &AlertStore) -> Vec<Marker> {
    let selected = store.selected_id();

    store
        .alerts()
        .iter()
        .map(|alert| {
            let color = zone_color(&alert.risk);

            Marker {
                id: alert.id.clone(),
                region: alert.region.clone(),
                risk: alert.risk.clone(),
                coords: alert.coords,
                color,
                buffer: buffer_radius(&alert.risk).map(|radius_m| BufferZone { radius_m, color }),
                drivers: alert.metrics.as_ref().map(risk_drivers).unwrap_or_default(),
                overlay_image: alert.overlay_image.clone(),
                selected: selected == Some(&alert.id),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetail {
    pub id: AlertId,
    pub region: String,
    pub risk: Risk,
    pub time: String,
    pub confidence: Option<String>,
    pub details: Option<String>,
    pub rows: Vec<DetailRow>,
    pub overlay_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "panel", rename_all = "camelCase")]
pub enum DetailPanel {
    Placeholder { prompt: &'static str },
    Alert(AlertDetail),
}

pub fn detail_panel(store: &AlertStore) -> DetailPanel {
    match store.selected() {
        Some(alert) => DetailPanel::Alert(alert_detail(alert)),
        None => DetailPanel::Placeholder {
            prompt: PLACEHOLDER_PROMPT,
        },
    }
}

pub fn alert_detail(alert: &Alert) -> AlertDetail {
    let mut rows = Vec::new();

    if let Some(metrics) = &alert.metrics {
        rows.push(DetailRow {
            label: "Rain",
            value: format!("{}mm", metrics.rain),
        });
        rows.push(DetailRow {
            label: "Slope",
            value: format!("{}°", metrics.slope),
        });
        if let Some(moisture) = metrics.moisture {
            rows.push(DetailRow {
                label: "Moisture",
                value: format!("{moisture}%"),
            });
        }
        if let Some(vibration) = metrics.vibration {
            rows.push(DetailRow {
                label: "Vibration",
                value: format!("{vibration} mm/s"),
            });
        }
    }

    AlertDetail {
        id: alert.id.clone(),
        region: alert.region.clone(),
        risk: alert.risk.clone(),
        time: alert.time.clone(),
        confidence: alert.confidence.clone(),
        details: alert.details.clone(),
        rows,
        overlay_image: alert.overlay_image.clone(),
    }
}

/// A raster layer which the map may draw over its base tiles.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TileOverlay {
    pub kind: LayerKind,
    pub name: &'static str,
    pub tile_url: String,
    pub opacity: f64,
    /// Whether the overlay is drawn before the operator picks any.
    pub visible: bool,
}

fn overlay_style(kind: LayerKind) -> (&'static str, f64) {
    match kind {
        LayerKind::Risk => ("Risk Heatmap (Composite)", 0.6),
        LayerKind::Slope => ("Slope Intensity (Terrain)", 0.8),
        LayerKind::Twi => ("Wetness Index (Hydrology)", 0.7),
        LayerKind::Ndvi => ("Vegetation Health (NDVI)", 0.6),
    }
}

/// Tile overlays of each available layer, in display order.
pub fn tile_overlays(layers: &LayerSet) -> Vec<TileOverlay> {
    layers
        .iter()
        .map(|(kind, tile_url)| {
            let (name, opacity) = overlay_style(kind);

            TileOverlay {
                kind,
                name,
                tile_url: tile_url.to_string(),
                opacity,
                visible: kind == LayerKind::Risk,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StatusHeader {
    pub banner: &'static str,
    /// Number of monitored zones, which is every current alert.
    pub zones: usize,
    pub active: usize,
    pub confidence: &'static str,
}

pub fn status_header(dash: &Dashboard) -> StatusHeader {
    let alerts = dash.store.alerts();

    StatusHeader {
        banner: dash.mode.banner(),
        zones: alerts.len(),
        active: active_count(alerts),
        confidence: dash.mode.confidence(),
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ListEntry {
    pub id: AlertId,
    pub region: String,
    pub risk: Risk,
    pub time: String,
    pub color: &'static str,
    pub selected: bool,
}

/// The alert list, in priority order.
pub fn alert_list(store: &AlertStore) -> Vec<ListEntry> {
    let selected = store.selected_id();

    priority_list(store.alerts())
        .into_iter()
        .map(|alert| ListEntry {
            id: alert.id.clone(),
            region: alert.region.clone(),
            risk: alert.risk.clone(),
            time: list_time_label(&alert.time).to_string(),
            color: zone_color(&alert.risk),
            selected: selected == Some(&alert.id),
        })
        .collect()
}

/// View is everything a renderer draws.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct View {
    pub header: StatusHeader,
    pub list: Vec<ListEntry>,
    pub markers: Vec<Marker>,
    pub detail: DetailPanel,
    pub overlays: Vec<TileOverlay>,
    pub routes: Vec<Route>,
}

pub fn render(dash: &Dashboard, routes: &[Route]) -> View {
    View {
        header: status_header(dash),
        list: alert_list(&dash.store),
        markers: markers(&dash.store),
        detail: detail_panel(&dash.store),
        overlays: tile_overlays(&dash.layers),
        routes: routes.to_vec(),
    }
}
