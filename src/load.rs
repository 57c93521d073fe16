use log::warn;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::domain::normalize::{PositionField, RawPlayerRow};
use crate::domain::objective::normalize_key;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Name,
    Team,
    Position,
    Price,
    Stat,
}

fn classify(key: &str) -> Column {
    match key {
        "player_id" | "id" => Column::Id,
        "name" | "player" | "web_name" => Column::Name,
        "team" | "club" => Column::Team,
        "position" | "element_type" => Column::Position,
        "cost" | "price" | "now_cost" => Column::Price,
        _ => Column::Stat,
    }
}

/// Load a player roster CSV from disk.
pub fn load_roster(path: impl AsRef<Path>) -> Result<Vec<RawPlayerRow>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_roster(file)
}

/// Parse a roster CSV with a header row into raw rows.
///
/// Identity columns are matched on their normalized header; every other column
/// that holds a number becomes a stat. Cells that do not parse are left missing
/// so the normalizer can account for the row.
pub fn read_roster<R: Read>(rdr: R) -> Result<Vec<RawPlayerRow>, LoadError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers: Vec<(Column, String)> = reader
        .headers()?
        .iter()
        .map(|header| {
            let key = normalize_key(header);
            (classify(&key), key)
        })
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let mut row = RawPlayerRow::default();
        let mut stats = BTreeMap::new();

        for ((column, key), cell) in headers.iter().zip(record.iter()) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            match column {
                Column::Id => row.id = cell.parse::<i64>().ok(),
                Column::Name => row.name = Some(cell.to_string()),
                Column::Team => row.team = Some(cell.to_string()),
                Column::Position => row.position = Some(PositionField::Label(cell.to_string())),
                Column::Price => row.price = parse_number(cell),
                Column::Stat => {
                    if let Some(value) = parse_number(cell) {
                        stats.insert(key.clone(), value);
                    }
                }
            }
        }
        if row.id.is_none() {
            warn!("roster row {} has no usable player id", index + 1);
        }
        row.stats = stats;
        rows.push(row);
    }
    Ok(rows)
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
Player ID,Name,Team,Position,Cost,Total Points,Minutes,Selected By %,PpM ROI
1,Raya,Arsenal,1,5.5,150,3420,21.3,0.0012
2,Saliba,Arsenal,2,6.0,160,3330,33.0,0.0013
3,Salah,Liverpool,3,12.5,250,3000,,0.0017
4,Haaland,Man City,FWD,14.0,230,2800,60.1,0.0013
,Nobody,Spurs,4,4.5,10,90,0.1,x
";

    #[test]
    fn test_read_roster_maps_identity_columns_and_stats() {
        let rows = read_roster(ROSTER.as_bytes()).unwrap();
        assert_eq!(rows.len(), 5);

        let raya = &rows[0];
        assert_eq!(raya.id, Some(1));
        assert_eq!(raya.name.as_deref(), Some("Raya"));
        assert_eq!(raya.team.as_deref(), Some("Arsenal"));
        assert_eq!(raya.position, Some(PositionField::Label("1".to_string())));
        assert_eq!(raya.price, Some(5.5));
        assert_eq!(raya.stats.get("total_points"), Some(&150.0));
        assert_eq!(raya.stats.get("minutes"), Some(&3420.0));
        assert_eq!(raya.stats.get("selected_by"), Some(&21.3));
        assert_eq!(raya.stats.get("ppm_roi"), Some(&0.0012));
    }

    #[test]
    fn test_read_roster_leaves_empty_and_bad_cells_missing() {
        let rows = read_roster(ROSTER.as_bytes()).unwrap();
        assert!(rows[2].stats.get("selected_by").is_none());
        assert_eq!(rows[3].position, Some(PositionField::Label("FWD".to_string())));
        assert_eq!(rows[4].id, None);
        assert!(rows[4].stats.get("ppm_roi").is_none());
    }

    #[test]
    fn test_read_roster_given_ragged_rows_should_error() {
        let csv = "Player ID,Name\n1,Raya,extra\n";
        assert!(matches!(read_roster(csv.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_load_roster_given_missing_file_should_error() {
        let err = load_roster("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
