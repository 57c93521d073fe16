use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type PlayerId = u32;

/// Playing position. The declaration order is the display order of a squad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn short_label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Parse a position label (case-insensitive), e.g. "GK", "gkp", "Defender".
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "gk" | "gkp" | "goalkeeper" => Some(Position::Goalkeeper),
            "def" | "defender" => Some(Position::Defender),
            "mid" | "midfielder" => Some(Position::Midfielder),
            "fwd" | "fw" | "forward" => Some(Position::Forward),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_label())
    }
}

/// A normalized player, ready to be placed in a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: Position,
    pub price: f64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, f64>,
}

impl PlayerRecord {
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        team: impl Into<String>,
        position: Position,
        price: f64,
        value: f64,
    ) -> Self {
        PlayerRecord {
            id,
            name: name.into(),
            team: team.into(),
            position,
            price,
            value,
            stats: BTreeMap::new(),
        }
    }

    pub fn stat(&self, key: &str) -> Option<f64> {
        self.stats.get(key).copied()
    }
}
