use serde::{Deserialize, Serialize};

use crate::domain::constraints::SquadConfig;
use crate::domain::error::ConfigError;
use crate::domain::extract::SquadResult;
use crate::domain::normalize::{PositionCodes, RawPlayerRow, RejectedRow};
use crate::domain::objective::ObjectiveMetric;

// ---------- API (wire) types: owned & serde-friendly ----------

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    /// Falls back to the stored roster when absent.
    #[serde(default)]
    pub players: Option<Vec<RawPlayerRow>>,
    pub config: SquadConfig,
    #[serde(default = "default_objectives")]
    pub objectives: Vec<ObjectiveMetric>,
    #[serde(default)]
    pub position_codes: Option<PositionCodes>,
    #[serde(default)]
    pub min_minutes: Option<f64>,
}

fn default_objectives() -> Vec<ObjectiveMetric> {
    vec![ObjectiveMetric::TotalPoints]
}

#[derive(Debug, Serialize)]
pub struct ApiSolution {
    pub objective: String,
    pub solver: String,
    pub dropped: usize,
    pub filtered: usize,
    pub rejected: Vec<RejectedRow>,
    pub result: SquadResult,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub solutions: Vec<ApiSolution>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precondition: Option<ConfigError>,
}

impl ApiError {
    pub fn message(error: impl Into<String>) -> Self {
        ApiError {
            error: error.into(),
            precondition: None,
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(error: ConfigError) -> Self {
        ApiError {
            error: error.to_string(),
            precondition: Some(error),
        }
    }
}
