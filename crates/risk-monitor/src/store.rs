use risk_models::{Alert, AlertId, Coords, Risk, SYSTEM_STARTUP_REGION};

/// AlertStore holds the current alerts and the selection cursor.
///
/// Alerts are only ever replaced wholesale. A replacement drops a selection
/// whose alert isn't part of the new collection.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct AlertStore {
    alerts: Vec<Alert>,
    selected: Option<AlertId>,
}

impl AlertStore {
    pub fn new(alerts: Vec<Alert>) -> Self {
        Self {
            alerts,
            selected: None,
        }
    }

    /// The store as it's presented before any acquisition has succeeded:
    /// a single placeholder alert.
    pub fn bootstrap() -> Self {
        Self::new(vec![Alert {
            id: AlertId::position(1),
            region: SYSTEM_STARTUP_REGION.to_string(),
            risk: Risk::Low,
            time: "Just now".to_string(),
            coords: Coords {
                lat: 10.0889,
                lng: 77.0595,
            },
            metrics: None,
            details: None,
            confidence: None,
            overlay_image: None,
        }])
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn get(&self, id: &AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|alert| &alert.id == id)
    }

    /// Replace all alerts, clearing a selection which no longer resolves.
    pub fn replace(&mut self, alerts: Vec<Alert>) {
        self.alerts = alerts;

        if let Some(id) = &self.selected {
            if self.get(id).is_none() {
                tracing::debug!(%id, "selected alert was replaced away, clearing selection");
                self.selected = None;
            }
        }
    }

    /// Select the alert identified by `id`. If there's no such alert,
    /// the selection is cleared instead.
    pub fn select(&mut self, id: &AlertId) -> Option<&Alert> {
        self.selected = self.get(id).map(|alert| alert.id.clone());
        self.selected()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Alert> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<&AlertId> {
        self.selected.as_ref()
    }
}
