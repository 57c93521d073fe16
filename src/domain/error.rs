use serde::Serialize;
use thiserror::Error;

use crate::domain::player::{PlayerId, Position};

/// Why a raw row was rejected by the normalizer.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataError {
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid player id {id}")]
    InvalidId { id: i64 },

    #[error("duplicate player id {id}")]
    DuplicateId { id: PlayerId },

    #[error("unknown position `{position}`")]
    UnknownPosition { position: String },

    #[error("price {price} is negative or not finite")]
    InvalidPrice { price: f64 },

    #[error("value for objective `{objective}` is missing or not finite")]
    NonFiniteValue { objective: String },
}

/// A configuration that cannot describe a solvable squad request.
///
/// Raised before any solver is invoked so callers get the precise precondition
/// that failed rather than a generic infeasibility verdict.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("player pool is empty after normalization")]
    EmptyPool,

    #[error("squad size must be at least 1")]
    ZeroSquadSize,

    #[error("budget {budget} must be positive and finite")]
    InvalidBudget { budget: f64 },

    #[error("price scale must be at least 1")]
    ZeroPriceScale,

    #[error("price {price} is not a whole number of units at price scale {price_scale}")]
    OffGridPrice { price: f64, price_scale: u32 },

    #[error("price {price} at price scale {price_scale} exceeds the solver's integer range")]
    PriceOutOfRange { price: f64, price_scale: u32 },

    #[error("budget {budget} at price scale {price_scale} exceeds the solver's integer range")]
    BudgetOutOfRange { budget: f64, price_scale: u32 },

    #[error("per-club cap must be at least 1 (club: {})", club.as_deref().unwrap_or("all"))]
    ZeroClubCap { club: Option<String> },

    #[error("no per-club cap configured for club `{club}`")]
    MissingClubCap { club: String },

    #[error("position quotas total {quota_total}, more than the squad size {squad_size}")]
    QuotasExceedSquadSize { quota_total: u32, squad_size: u32 },

    #[error("exact position quotas total {quota_total} but squad size is {squad_size}")]
    QuotaSizeMismatch { quota_total: u32, squad_size: u32 },

    #[error("quota for {position} is {quota} but the pool only has {available}")]
    InsufficientSupply {
        position: Position,
        quota: u32,
        available: usize,
    },
}

/// Failure of an optimization run as a whole.
///
/// Solver verdicts (infeasible, timeout, ...) are not errors; they are carried
/// in `SquadResult::status`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("solver returned a selection that fails verification: {0}")]
    Verification(String),
}
