use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const TOTAL_POINTS: &str = "total_points";
pub const MINUTES: &str = "minutes";

/// The scalar a squad run maximizes, derived from a player's stats and price.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveMetric {
    #[default]
    TotalPoints,
    /// Points per unit of price.
    Roi,
    PointsPerMinute,
    /// Points per minute multiplied by ROI.
    PpmRoi,
    /// Any numeric stat column, looked up by its normalized name.
    Stat(String),
}

impl ObjectiveMetric {
    /// Evaluate the metric. `None` when a required stat is missing; the result
    /// may be non-finite (zero minutes, zero price) and callers must check.
    pub fn evaluate(&self, stats: &BTreeMap<String, f64>, price: f64) -> Option<f64> {
        let stat = |key: &str| stats.get(key).copied();
        match self {
            ObjectiveMetric::TotalPoints => stat(TOTAL_POINTS),
            ObjectiveMetric::Roi => Some(stat(TOTAL_POINTS)? / price),
            ObjectiveMetric::PointsPerMinute => Some(stat(TOTAL_POINTS)? / stat(MINUTES)?),
            ObjectiveMetric::PpmRoi => {
                let points = stat(TOTAL_POINTS)?;
                Some((points / stat(MINUTES)?) * (points / price))
            }
            ObjectiveMetric::Stat(name) => stat(&normalize_key(name)),
        }
    }
}

impl fmt::Display for ObjectiveMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveMetric::TotalPoints => f.write_str("total_points"),
            ObjectiveMetric::Roi => f.write_str("roi"),
            ObjectiveMetric::PointsPerMinute => f.write_str("points_per_minute"),
            ObjectiveMetric::PpmRoi => f.write_str("ppm_roi"),
            ObjectiveMetric::Stat(name) => write!(f, "stat:{}", normalize_key(name)),
        }
    }
}

/// Normalize a column or stat name to snake_case: "Total Points" -> "total_points",
/// "Selected By %" -> "selected_by".
pub fn normalize_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_lowercase());
        } else if !key.is_empty() && !key.ends_with('_') {
            key.push('_');
        }
    }
    while key.ends_with('_') {
        key.pop();
    }
    key
}
