//! Per-mode defaults which normalization applies to upstream records.
//!
//! Each mode declares its defaults once, here, including the ordered rules
//! which pick an alert's overlay image.

use crate::Mode;
use risk_models::{Coords, Risk};

pub const OOTY_LANDSLIDE_IMAGE: &str = "/risk_images/ooty_landslide.png";
pub const KODAI_WEATHER_IMAGE: &str = "/risk_images/kodai_weather.png";
pub const LANDSLIDE_WARNING_IMAGE: &str = "/risk_images/landslide_warning.png";
pub const DEFAULT_TERRAIN_IMAGE: &str = "/risk_images/default_terrain.png";

pub const HISTORICAL_TIME_LABEL: &str = "Historical Data";
pub const HISTORICAL_DETAILS: &str = "Historical analysis based on past data.";
pub const UNKNOWN_CONFIDENCE: &str = "N/A";

/// Position of historical records which don't report one.
pub const FALLBACK_COORDS: Coords = Coords {
    lat: 11.0,
    lng: 77.0,
};

/// A rule which selects an overlay image for an alert.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayRule {
    /// Matches when the region name contains `needle`.
    RegionContains {
        needle: &'static str,
        image: &'static str,
    },
    /// Matches alerts of exactly this risk level.
    RiskIs { risk: Risk, image: &'static str },
}

impl OverlayRule {
    fn select(&self, region: &str, risk: &Risk) -> Option<&'static str> {
        match self {
            OverlayRule::RegionContains { needle, image } if region.contains(*needle) => {
                Some(*image)
            }
            OverlayRule::RiskIs { risk: want, image } if want == risk => Some(*image),
            _ => None,
        }
    }
}

/// ModeDefaults are the field defaults and overlay policy of one mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeDefaults {
    /// When set, the time label of every alert. Otherwise the record's timestamp is used.
    pub time_label: Option<&'static str>,
    /// When set, fills in coordinates that a record omits.
    /// Otherwise records must carry their own coordinates.
    pub coords: Option<Coords>,
    pub details: Option<&'static str>,
    pub confidence: Option<&'static str>,
    /// Overlay rules, evaluated in order. The first match wins.
    pub overlay_rules: Vec<OverlayRule>,
    /// Overlay image of alerts which match no rule.
    pub overlay_fallback: Option<&'static str>,
}

impl ModeDefaults {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Historical => Self::historical(),
            Mode::Simulation => Self::simulation(),
        }
    }

    pub fn historical() -> Self {
        Self {
            time_label: Some(HISTORICAL_TIME_LABEL),
            coords: Some(FALLBACK_COORDS),
            details: Some(HISTORICAL_DETAILS),
            confidence: Some(UNKNOWN_CONFIDENCE),
            overlay_rules: region_rules(),
            overlay_fallback: None,
        }
    }

    pub fn simulation() -> Self {
        let mut overlay_rules = region_rules();
        overlay_rules.push(OverlayRule::RiskIs {
            risk: Risk::High,
            image: LANDSLIDE_WARNING_IMAGE,
        });

        Self {
            time_label: None,
            coords: None,
            details: None,
            confidence: None,
            overlay_rules,
            overlay_fallback: Some(DEFAULT_TERRAIN_IMAGE),
        }
    }

    /// Select the overlay image of an alert in `region` having `risk`.
    pub fn overlay_for(&self, region: &str, risk: &Risk) -> Option<String> {
        self.overlay_rules
            .iter()
            .find_map(|rule| rule.select(region, risk))
            .or(self.overlay_fallback)
            .map(str::to_string)
    }
}

// Region rules shared by both modes, and which take priority over any risk rule.
fn region_rules() -> Vec<OverlayRule> {
    vec![
        OverlayRule::RegionContains {
            needle: "Nilgiris",
            image: OOTY_LANDSLIDE_IMAGE,
        },
        OverlayRule::RegionContains {
            needle: "Kodaikanal",
            image: KODAI_WEATHER_IMAGE,
        },
    ]
}
