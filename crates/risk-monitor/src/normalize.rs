//! Normalization of upstream records into canonical Alerts.
//!
//! These are pure functions: the same record and defaults always produce the
//! same Alert, except that simulated alerts take the identifier they're given.

use crate::defaults::ModeDefaults;
use risk_models::{Alert, AlertId, Coords, HistoryRecord, SimulationRecord, SYSTEM_STARTUP_REGION};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("record has an empty region name")]
    EmptyRegion,
    #[error("record for region {region:?} has no coordinates")]
    MissingCoords { region: String },
}

/// Map a record of the historical snapshot at position `index`.
pub fn historical(
    index: usize,
    record: HistoryRecord,
    defaults: &ModeDefaults,
) -> Result<Alert, NormalizeError> {
    let HistoryRecord {
        region,
        risk,
        lat,
        lon,
        details,
        confidence,
        metrics,
    } = record;

    if region.trim().is_empty() {
        return Err(NormalizeError::EmptyRegion);
    }
    let coords = resolve_coords(&region, lat, lon, defaults)?;
    let overlay_image = defaults.overlay_for(&region, &risk);

    Ok(Alert {
        id: AlertId::position(index),
        time: defaults.time_label.unwrap_or_default().to_string(),
        coords,
        metrics,
        details: details.or_else(|| defaults.details.map(str::to_string)),
        confidence: confidence.or_else(|| defaults.confidence.map(str::to_string)),
        overlay_image,
        region,
        risk,
    })
}

/// Map a record of a simulation poll, assigning it identifier `id`.
pub fn simulation(
    id: AlertId,
    record: SimulationRecord,
    defaults: &ModeDefaults,
) -> Result<Alert, NormalizeError> {
    let SimulationRecord {
        region,
        risk,
        timestamp,
        lat,
        lon,
        metrics,
        details,
        confidence,
    } = record;

    if region.trim().is_empty() {
        return Err(NormalizeError::EmptyRegion);
    }
    let coords = resolve_coords(&region, lat, lon, defaults)?;
    let overlay_image = defaults.overlay_for(&region, &risk);

    Ok(Alert {
        id,
        time: match defaults.time_label {
            Some(label) => label.to_string(),
            None => timestamp,
        },
        coords,
        metrics,
        details: details.or_else(|| defaults.details.map(str::to_string)),
        confidence: confidence.or_else(|| defaults.confidence.map(str::to_string)),
        overlay_image,
        region,
        risk,
    })
}

/// Map a historical snapshot. Placeholder "System Startup" records and
/// records without a region are dropped, as are records which can't be
/// mapped. Remaining alerts are identified by their position after filtering.
pub fn historical_batch(records: Vec<HistoryRecord>, defaults: &ModeDefaults) -> Vec<Alert> {
    records
        .into_iter()
        .filter(|record| match record.region.trim() {
            SYSTEM_STARTUP_REGION => false,
            "" => {
                tracing::warn!(?record, "dropping historical record without a region");
                false
            }
            _ => true,
        })
        .enumerate()
        .filter_map(|(index, record)| match historical(index, record, defaults) {
            Ok(alert) => Some(warn_unrecognized(alert)),
            Err(err) => {
                tracing::warn!(%err, index, "dropping historical record");
                None
            }
        })
        .collect()
}

/// Map all records of simulation poll `cycle`. Any record which can't be
/// mapped rejects the whole poll, so that a partial response never
/// partially replaces the alerts.
pub fn simulation_batch(
    cycle: u64,
    records: Vec<SimulationRecord>,
    defaults: &ModeDefaults,
) -> Result<Vec<Alert>, NormalizeError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            simulation(AlertId::minted(cycle, index), record, defaults).map(warn_unrecognized)
        })
        .collect()
}

fn resolve_coords(
    region: &str,
    lat: Option<f64>,
    lon: Option<f64>,
    defaults: &ModeDefaults,
) -> Result<Coords, NormalizeError> {
    match (lat, lon, defaults.coords) {
        (Some(lat), Some(lng), _) => Ok(Coords { lat, lng }),
        (lat, lon, Some(fallback)) => Ok(Coords {
            lat: lat.unwrap_or(fallback.lat),
            lng: lon.unwrap_or(fallback.lng),
        }),
        (_, _, None) => Err(NormalizeError::MissingCoords {
            region: region.to_string(),
        }),
    }
}

fn warn_unrecognized(alert: Alert) -> Alert {
    if !alert.risk.is_recognized() {
        tracing::warn!(
            region = %alert.region,
            risk = %alert.risk,
            "alert has an unrecognized risk level, passing it through"
        );
    }
    alert
}
