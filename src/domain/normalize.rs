use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::domain::error::DataError;
use crate::domain::objective::{normalize_key, ObjectiveMetric, MINUTES};
use crate::domain::player::{PlayerId, PlayerRecord, Position};

/// Position as it arrives from a data source: a numeric code or a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionField {
    Code(u8),
    Label(String),
}

/// One player row as supplied by an external collaborator (CSV, JSON).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlayerRow {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub team: Option<String>,
    pub position: Option<PositionField>,
    pub price: Option<f64>,
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
}

/// Mapping from numeric position codes to positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionCodes(pub BTreeMap<u8, Position>);

impl Default for PositionCodes {
    fn default() -> Self {
        PositionCodes(BTreeMap::from([
            (1, Position::Goalkeeper),
            (2, Position::Defender),
            (3, Position::Midfielder),
            (4, Position::Forward),
        ]))
    }
}

impl PositionCodes {
    pub fn resolve(&self, field: &PositionField) -> Result<Position, DataError> {
        match field {
            PositionField::Code(code) => {
                self.0
                    .get(code)
                    .copied()
                    .ok_or_else(|| DataError::UnknownPosition {
                        position: code.to_string(),
                    })
            }
            PositionField::Label(label) => {
                if let Ok(code) = label.trim().parse::<u8>() {
                    return self.resolve(&PositionField::Code(code));
                }
                Position::from_label(label).ok_or_else(|| DataError::UnknownPosition {
                    position: label.clone(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub position_codes: PositionCodes,
    pub objective: ObjectiveMetric,
    /// Players with `minutes` at or below this are filtered out.
    pub min_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    /// Index of the row in the input sequence.
    pub row: usize,
    pub id: Option<i64>,
    pub reason: DataError,
}

/// Outcome of normalization: the usable pool plus what was left out.
#[derive(Debug, Clone, Default)]
pub struct NormalizedPool {
    pub players: Vec<PlayerRecord>,
    pub rejected: Vec<RejectedRow>,
    /// Rows excluded by the minimum-minutes filter. Not malformed, so not in `rejected`.
    pub filtered: usize,
    /// Input row index of each entry in `players`.
    pub source_rows: Vec<usize>,
}

impl NormalizedPool {
    pub fn dropped(&self) -> usize {
        self.rejected.len()
    }
}

/// Project raw rows into `PlayerRecord`s valued by `options.objective`.
///
/// Malformed rows are dropped and recorded; the input is never modified.
pub fn normalize(rows: &[RawPlayerRow], options: &NormalizeOptions) -> NormalizedPool {
    let pool = revalue(&project_rows(rows, options), &options.objective);
    debug!(
        "normalized {} rows: {} players, {} rejected, {} filtered",
        rows.len(),
        pool.players.len(),
        pool.rejected.len(),
        pool.filtered
    );
    pool
}

/// The structural half of [`normalize`]: every check except the objective value.
///
/// Players carry a value of 0 until [`revalue`]d. Of rows sharing an id, the
/// first well-formed one is kept; the minimum-minutes filter runs after that.
pub fn project_rows(rows: &[RawPlayerRow], options: &NormalizeOptions) -> NormalizedPool {
    let mut pool = NormalizedPool::default();
    let mut seen: HashSet<PlayerId> = HashSet::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let record = match project_row(row, options) {
            Ok(record) => record,
            Err(reason) => {
                reject(&mut pool, index, row.id, reason);
                continue;
            }
        };

        if !seen.insert(record.id) {
            reject(&mut pool, index, row.id, DataError::DuplicateId { id: record.id });
            continue;
        }

        if let Some(threshold) = options.min_minutes {
            if record.stat(MINUTES).map_or(true, |minutes| minutes <= threshold) {
                pool.filtered += 1;
                continue;
            }
        }

        pool.players.push(record);
        pool.source_rows.push(index);
    }
    pool
}

/// Value `base` under `objective`.
///
/// Players whose value is missing or non-finite are dropped and recorded next
/// to the rows `base` already rejected. `base` itself is left untouched, so
/// one projected pool serves any number of objectives.
pub fn revalue(base: &NormalizedPool, objective: &ObjectiveMetric) -> NormalizedPool {
    let mut pool = NormalizedPool {
        rejected: base.rejected.clone(),
        filtered: base.filtered,
        ..NormalizedPool::default()
    };
    for (index, player) in base.players.iter().enumerate() {
        let row = base.source_rows.get(index).copied().unwrap_or(index);
        match evaluate(objective, &player.stats, player.price) {
            Ok(value) => {
                pool.players.push(PlayerRecord {
                    value,
                    ..player.clone()
                });
                pool.source_rows.push(row);
            }
            Err(reason) => reject(&mut pool, row, Some(i64::from(player.id)), reason),
        }
    }
    pool.rejected.sort_by_key(|rejected| rejected.row);
    pool
}

fn reject(pool: &mut NormalizedPool, row: usize, id: Option<i64>, reason: DataError) {
    warn!("dropping player row {} (id {:?}): {}", row, id, reason);
    pool.rejected.push(RejectedRow { row, id, reason });
}

fn project_row(row: &RawPlayerRow, options: &NormalizeOptions) -> Result<PlayerRecord, DataError> {
    let raw_id = row.id.ok_or(DataError::MissingField { field: "id" })?;
    let id = PlayerId::try_from(raw_id).map_err(|_| DataError::InvalidId { id: raw_id })?;
    let name = non_empty(&row.name).ok_or(DataError::MissingField { field: "name" })?;
    let team = non_empty(&row.team).ok_or(DataError::MissingField { field: "team" })?;
    let position = row
        .position
        .as_ref()
        .ok_or(DataError::MissingField { field: "position" })
        .and_then(|field| options.position_codes.resolve(field))?;
    let price = row.price.ok_or(DataError::MissingField { field: "price" })?;
    if !price.is_finite() || price < 0.0 {
        return Err(DataError::InvalidPrice { price });
    }

    let stats: BTreeMap<String, f64> = row
        .stats
        .iter()
        .map(|(key, value)| (normalize_key(key), *value))
        .collect();

    Ok(PlayerRecord {
        id,
        name: name.to_string(),
        team: team.to_string(),
        position,
        price,
        value: 0.0,
        stats,
    })
}

fn evaluate(
    objective: &ObjectiveMetric,
    stats: &BTreeMap<String, f64>,
    price: f64,
) -> Result<f64, DataError> {
    objective
        .evaluate(stats, price)
        .filter(|value| value.is_finite())
        .ok_or_else(|| DataError::NonFiniteValue {
            objective: objective.to_string(),
        })
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
