/// Risk level of an alert, as reported upstream.
///
/// Upstream doesn't validate risk levels. A value outside of the known three
/// is passed through as `Unrecognized` so it's still visible, but it ranks
/// below `Low` and has no buffer zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Risk {
    Low,
    Medium,
    High,
    Unrecognized(String),
}

impl Risk {
    /// Rank of this level within the total order High > Medium > Low.
    /// Unrecognized levels rank below Low.
    pub fn rank(&self) -> u8 {
        match self {
            Risk::High => 3,
            Risk::Medium => 2,
            Risk::Low => 1,
            Risk::Unrecognized(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Risk::Low => "Low",
            Risk::Medium => "Medium",
            Risk::High => "High",
            Risk::Unrecognized(other) => other.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Risk::Unrecognized(_))
    }
}

impl From<String> for Risk {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Low" => Risk::Low,
            "Medium" => Risk::Medium,
            "High" => Risk::High,
            _ => Risk::Unrecognized(value),
        }
    }
}

impl From<&str> for Risk {
    fn from(value: &str) -> Self {
        Risk::from(value.to_string())
    }
}

impl From<Risk> for String {
    fn from(value: Risk) -> Self {
        match value {
            Risk::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Risk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
