use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::error::ConfigError;
use crate::domain::player::{PlayerRecord, Position};
use crate::domain::validate::validate_config;

/// Largest price scale tried when none is configured (prices to the millionth).
pub const MAX_PRICE_SCALE: u32 = 1_000_000;

/// Relative distance from an integer a scaled price may have and still sit on the grid.
const GRID_TOLERANCE: f64 = 1e-9;
const BUDGET_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaMode {
    /// Selected count per position must equal the quota.
    Exact,
    /// Selected count per position must be at least the quota.
    Minimum,
}

/// Per-club cap: one value for every club, or an explicit mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClubCap {
    Uniform(u32),
    PerClub {
        caps: BTreeMap<String, u32>,
        #[serde(default)]
        default: Option<u32>,
    },
}

impl ClubCap {
    pub fn cap_for(&self, club: &str) -> Option<u32> {
        match self {
            ClubCap::Uniform(cap) => Some(*cap),
            ClubCap::PerClub { caps, default } => caps.get(club).copied().or(*default),
        }
    }
}

/// Caller-facing squad rules, before they are checked against a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadConfig {
    pub squad_size: u32,
    pub quota_mode: QuotaMode,
    pub quotas: BTreeMap<Position, u32>,
    pub budget: f64,
    pub max_per_team: ClubCap,
    /// Integer price units per currency unit. When absent, the smallest power
    /// of ten that puts every pool price on the grid is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_scale: Option<u32>,
}

impl SquadConfig {
    /// Full 15-player squad: exactly 2 GK, 5 DEF, 5 MID, 3 FWD within 100.0, at most 3 per club.
    pub fn full_squad() -> Self {
        SquadConfig {
            squad_size: 15,
            quota_mode: QuotaMode::Exact,
            quotas: quotas([2, 5, 5, 3]),
            budget: 100.0,
            max_per_team: ClubCap::Uniform(3),
            price_scale: None,
        }
    }

    /// Starting eleven: at least 1 GK, 4 DEF, 4 MID, 2 FWD within 84.0, at most 3 per club.
    pub fn starting_eleven() -> Self {
        SquadConfig {
            squad_size: 11,
            quota_mode: QuotaMode::Minimum,
            quotas: quotas([1, 4, 4, 2]),
            budget: 84.0,
            max_per_team: ClubCap::Uniform(3),
            price_scale: None,
        }
    }

    pub fn quota_total(&self) -> u32 {
        self.quotas.values().sum()
    }
}

fn quotas(counts: [u32; 4]) -> BTreeMap<Position, u32> {
    Position::ALL.into_iter().zip(counts).collect()
}

/// Validated squad rules resolved against a concrete pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintSet {
    pub squad_size: u32,
    pub quota_mode: QuotaMode,
    /// One entry per position; absent quotas are 0.
    pub position_quotas: BTreeMap<Position, u32>,
    pub budget: f64,
    /// Cap for every club present in the pool.
    pub club_caps: BTreeMap<String, u32>,
    /// Resolved scale; every pool price is a whole number of units at this scale.
    pub price_scale: u32,
    budget_units: i64,
}

impl ConstraintSet {
    pub fn quota(&self, position: Position) -> u32 {
        self.position_quotas.get(&position).copied().unwrap_or(0)
    }

    pub fn cap(&self, club: &str) -> Option<u32> {
        self.club_caps.get(club).copied()
    }

    /// Price in integer price units. Exact for every price in the pool.
    pub fn price_units(&self, price: f64) -> i64 {
        scaled_units(price, self.price_scale)
    }

    /// Budget in integer price units, rounded down and capped at the price of
    /// the whole pool, above which it cannot bind.
    pub fn budget_units(&self) -> i64 {
        self.budget_units
    }
}

fn scaled_units(price: f64, scale: u32) -> i64 {
    (price * f64::from(scale)).round() as i64
}

fn on_grid(price: f64, scale: u32) -> bool {
    let scaled = price * f64::from(scale);
    (scaled - scaled.round()).abs() <= GRID_TOLERANCE * scaled.abs().max(1.0)
}

/// The configured scale if every price sits on its grid, else the smallest
/// power of ten up to [`MAX_PRICE_SCALE`] that does.
fn resolve_price_scale(pool: &[PlayerRecord], configured: Option<u32>) -> Result<u32, ConfigError> {
    let off_grid = |scale: u32| pool.iter().find(|p| !on_grid(p.price, scale));

    if let Some(scale) = configured {
        return match off_grid(scale) {
            Some(player) => Err(ConfigError::OffGridPrice {
                price: player.price,
                price_scale: scale,
            }),
            None => Ok(scale),
        };
    }

    let mut scale = 1;
    loop {
        match off_grid(scale) {
            None => return Ok(scale),
            Some(player) if scale >= MAX_PRICE_SCALE => {
                return Err(ConfigError::OffGridPrice {
                    price: player.price,
                    price_scale: scale,
                })
            }
            Some(_) => scale *= 10,
        }
    }
}

/// Derive the concrete constraint set for `pool` from `config`.
///
/// Fails fast on any structurally invalid configuration; such a request must
/// never reach a solver.
pub fn build_constraint_set(
    pool: &[PlayerRecord],
    config: &SquadConfig,
) -> Result<ConstraintSet, ConfigError> {
    if pool.is_empty() {
        return Err(ConfigError::EmptyPool);
    }
    validate_config(config)?;

    let mut club_caps = BTreeMap::new();
    for player in pool {
        if club_caps.contains_key(&player.team) {
            continue;
        }
        let cap = config
            .max_per_team
            .cap_for(&player.team)
            .ok_or_else(|| ConfigError::MissingClubCap {
                club: player.team.clone(),
            })?;
        if cap == 0 {
            return Err(ConfigError::ZeroClubCap {
                club: Some(player.team.clone()),
            });
        }
        club_caps.insert(player.team.clone(), cap);
    }

    let price_scale = resolve_price_scale(pool, config.price_scale)?;
    let mut pool_units: i64 = 0;
    for player in pool {
        let units = scaled_units(player.price, price_scale);
        if units > i64::from(i32::MAX) {
            return Err(ConfigError::PriceOutOfRange {
                price: player.price,
                price_scale,
            });
        }
        pool_units += units;
    }
    let budget_units = (config.budget * f64::from(price_scale) + BUDGET_EPSILON)
        .floor()
        .min(pool_units as f64) as i64;
    if budget_units > i64::from(i32::MAX) {
        return Err(ConfigError::BudgetOutOfRange {
            budget: config.budget,
            price_scale,
        });
    }

    let position_quotas = Position::ALL
        .into_iter()
        .map(|position| (position, config.quotas.get(&position).copied().unwrap_or(0)))
        .collect();

    Ok(ConstraintSet {
        squad_size: config.squad_size,
        quota_mode: config.quota_mode,
        position_quotas,
        budget: config.budget,
        club_caps,
        price_scale,
        budget_units,
    })
}
