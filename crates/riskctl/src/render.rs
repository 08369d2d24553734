//! Text rendering of the dashboard, for terminals.

use risk_monitor::view::{DetailPanel, RiskDriver, StatusHeader, View};

const BAR_WIDTH: usize = 10;

pub fn header(header: &StatusHeader) -> String {
    format!(
        "{} | zones: {} | active: {} | confidence: {}",
        header.banner, header.zones, header.active, header.confidence
    )
}

/// Render a percentage as a fixed-width bar.
pub fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn drivers(drivers: &[RiskDriver]) -> String {
    drivers
        .iter()
        .map(|driver| {
            format!(
                "{:<24}{} {}\n",
                driver.label,
                bar(driver.bar_percent()),
                driver.value
            )
        })
        .collect()
}

pub fn detail(panel: &DetailPanel) -> String {
    let detail = match panel {
        DetailPanel::Placeholder { prompt } => return format!("{prompt}\n"),
        DetailPanel::Alert(detail) => detail,
    };

    let mut out = format!(
        "{} [{}] {} ({})\n",
        detail.region, detail.id, detail.risk, detail.time
    );
    if let Some(confidence) = &detail.confidence {
        out.push_str(&format!("confidence: {confidence}\n"));
    }
    for row in &detail.rows {
        out.push_str(&format!("{}: {}\n", row.label, row.value));
    }
    if let Some(details) = &detail.details {
        out.push_str(&format!("{details}\n"));
    }
    if let Some(image) = &detail.overlay_image {
        out.push_str(&format!("overlay: {image}\n"));
    }
    out
}

pub fn dashboard(view: &View) -> String {
    let mut out = header(&view.header);
    out.push('\n');

    let mut alerts = crate::new_table(vec!["", "ID", "Region", "Risk", "Time"]);
    for entry in &view.list {
        alerts.add_row(vec![
            if entry.selected { "*" } else { "" }.to_string(),
            entry.id.to_string(),
            entry.region.clone(),
            entry.risk.to_string(),
            entry.time.clone(),
        ]);
    }
    out.push_str(&alerts.to_string());
    out.push('\n');

    if view.overlays.is_empty() {
        out.push_str("overlays: none available\n");
    } else {
        let names: Vec<_> = view
            .overlays
            .iter()
            .map(|o| {
                if o.visible {
                    format!("{} (shown)", o.name)
                } else {
                    o.name.to_string()
                }
            })
            .collect();
        out.push_str(&format!("overlays: {}\n", names.join(", ")));
    }
    out.push_str(&format!("routes: {}\n\n", view.routes.len()));

    out.push_str(&detail(&view.detail));
    if let Some(marker) = view.markers.iter().find(|m| m.selected) {
        out.push_str(&drivers(&marker.drivers));
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use risk_models::{Alert, AlertId, Coords, Metrics, Risk};
    use risk_monitor::{view, AlertStore};

    fn alert() -> Alert {
        Alert {
            id: AlertId::minted(4, 0),
            region: "Nilgiris Slide Zone".to_string(),
            risk: Risk::High,
            time: "14:05:09".to_string(),
            coords: Coords {
                lat: 11.4102,
                lng: 76.695,
            },
            metrics: Some(Metrics {
                slope: 85.5,
                rain: 120.5,
                twi: 70.25,
                ndvi: 40.5,
                moisture: Some(92.5),
                vibration: Some(1.5),
            }),
            details: Some("Heavy rainfall on saturated slopes.".to_string()),
            confidence: Some("97%".to_string()),
            overlay_image: Some("/risk_images/ooty_landslide.png".to_string()),
        }
    }

    #[test]
    fn test_bars() {
        assert_eq!(bar(0.0), "░░░░░░░░░░");
        assert_eq!(bar(59.5), "██████░░░░");
        assert_eq!(bar(250.0), "██████████");
    }

    #[test]
    fn test_detail_text() {
        let mut store = AlertStore::new(vec![alert()]);
        store.select(&AlertId::minted(4, 0));

        insta::assert_snapshot!(detail(&view::detail_panel(&store)), @r###"
        Nilgiris Slide Zone [sim-0-4] High (14:05:09)
        confidence: 97%
        Rain: 120.5mm
        Slope: 85.5°
        Moisture: 92.5%
        Vibration: 1.5 mm/s
        Heavy rainfall on saturated slopes.
        overlay: /risk_images/ooty_landslide.png
        "###);

        store.clear_selection();
        assert_eq!(
            detail(&view::detail_panel(&store)),
            "Select a region on the map or list to view detailed analysis.\n"
        );
    }

    #[test]
    fn test_header_text() {
        let header = view::status_header(&risk_monitor::Dashboard::bootstrap());
        assert_eq!(
            super::header(&header),
            "HISTORICAL | zones: 1 | active: 0 | confidence: 100%"
        );
    }
}
