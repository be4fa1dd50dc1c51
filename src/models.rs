use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    Jungle,
    Mid,
    Adc,
    Support,
}

impl Position {
    // Scrape order for every champion
    pub const ALL: [Position; 5] = [
        Position::Top,
        Position::Jungle,
        Position::Mid,
        Position::Adc,
        Position::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Top => "top",
            Position::Jungle => "jungle",
            Position::Mid => "mid",
            Position::Adc => "adc",
            Position::Support => "support",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::ConfigError(format!("Unknown position: {}", s)))
    }
}

/// Win rate and games played against one opponent, kept as the site formats them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    pub win_rate: String,
    pub games_played: String,
}

impl Matchup {
    pub fn has_percent_win_rate(&self) -> bool {
        self.win_rate.contains('%')
    }
}

/// Opponent name (normalized) -> matchup.
pub type MatchupTable = BTreeMap<String, Matchup>;

/// Absent position = not collected; present but empty = collected zero rows.
pub type ChampionMatchups = BTreeMap<Position, MatchupTable>;

pub fn total_rows(matchups: &ChampionMatchups) -> usize {
    matchups.values().map(|table| table.len()).sum()
}

/// One stored document, identified by (champion_name, patch, tier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionStats {
    pub champion_name: String,
    pub patch: String,
    pub tier: String,
    pub scraped_at: DateTime<Utc>,
    pub matchups: ChampionMatchups,
}
