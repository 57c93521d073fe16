use std::collections::BTreeMap;

use crate::domain::constraints::{ClubCap, ConstraintSet, QuotaMode, SquadConfig};
use crate::domain::error::ConfigError;
use crate::domain::player::{PlayerRecord, Position};

/// Budget slack tolerated when re-checking a selection, in currency units.
const BUDGET_TOLERANCE: f64 = 1e-6;

/// Structural checks on a configuration that need no pool.
pub fn validate_config(config: &SquadConfig) -> Result<(), ConfigError> {
    if config.squad_size == 0 {
        return Err(ConfigError::ZeroSquadSize);
    }
    if !config.budget.is_finite() || config.budget <= 0.0 {
        return Err(ConfigError::InvalidBudget {
            budget: config.budget,
        });
    }
    if config.price_scale == Some(0) {
        return Err(ConfigError::ZeroPriceScale);
    }
    match &config.max_per_team {
        ClubCap::Uniform(0) => return Err(ConfigError::ZeroClubCap { club: None }),
        ClubCap::PerClub { default: Some(0), .. } => {
            return Err(ConfigError::ZeroClubCap { club: None })
        }
        _ => (),
    }

    let quota_total = config.quota_total();
    if quota_total > config.squad_size {
        return Err(ConfigError::QuotasExceedSquadSize {
            quota_total,
            squad_size: config.squad_size,
        });
    }
    if config.quota_mode == QuotaMode::Exact && quota_total != config.squad_size {
        return Err(ConfigError::QuotaSizeMismatch {
            quota_total,
            squad_size: config.squad_size,
        });
    }
    Ok(())
}

/// Pool-level pre-check: every position must have at least as many players as its quota.
pub fn check_position_supply(
    pool: &[PlayerRecord],
    constraints: &ConstraintSet,
) -> Result<(), ConfigError> {
    let supply = count_by(pool, |p| p.position);
    for (&position, &quota) in &constraints.position_quotas {
        let available = supply.get(&position).copied().unwrap_or(0);
        if (quota as usize) > available {
            return Err(ConfigError::InsufficientSupply {
                position,
                quota,
                available,
            });
        }
    }
    Ok(())
}

/// Re-check a selection against every rule. Returns a description of the first violation.
pub fn verify_selection(
    selected: &[PlayerRecord],
    constraints: &ConstraintSet,
) -> Result<(), String> {
    if selected.len() != constraints.squad_size as usize {
        return Err(format!(
            "squad size: selected {} players, expected {}",
            selected.len(),
            constraints.squad_size
        ));
    }

    let by_position = count_by(selected, |p| p.position);
    for position in Position::ALL {
        let count = by_position.get(&position).copied().unwrap_or(0);
        let quota = constraints.quota(position) as usize;
        let ok = match constraints.quota_mode {
            QuotaMode::Exact => count == quota,
            QuotaMode::Minimum => count >= quota,
        };
        if !ok {
            return Err(format!(
                "{} quota: selected {}, quota {} ({:?})",
                position, count, quota, constraints.quota_mode
            ));
        }
    }

    let total_price: f64 = selected.iter().map(|p| p.price).sum();
    if total_price > constraints.budget + BUDGET_TOLERANCE {
        return Err(format!(
            "budget: total price {} exceeds {}",
            total_price, constraints.budget
        ));
    }

    let by_club = count_by(selected, |p| p.team.as_str());
    for (club, count) in by_club {
        match constraints.cap(club) {
            Some(cap) if count <= cap as usize => (),
            Some(cap) => {
                return Err(format!("club {}: selected {}, cap {}", club, count, cap));
            }
            None => return Err(format!("club {}: not present in the constraint set", club)),
        }
    }
    Ok(())
}

fn count_by<'a, K: Ord>(
    players: &'a [PlayerRecord],
    key: impl Fn(&'a PlayerRecord) -> K,
) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for player in players {
        *counts.entry(key(player)).or_insert(0) += 1;
    }
    counts
}
