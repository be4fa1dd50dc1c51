use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::ValidationTarget;
use crate::models::{ChampionMatchups, Position};

/// Freshly collected tier: normalized champion name -> matchups.
pub type TierBatch = BTreeMap<String, ChampionMatchups>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("no data for validation champion '{0}'")]
    MissingChampion(String),

    #[error("no '{position}' data for validation champion '{champion}'")]
    MissingPosition { champion: String, position: Position },

    #[error("no matchup against '{opponent}' for '{champion}' ({position})")]
    MissingOpponent {
        champion: String,
        position: Position,
        opponent: String,
    },

    #[error("win rate for '{champion}' vs '{opponent}' has no '%' ('{win_rate}')")]
    MalformedWinRate {
        champion: String,
        opponent: String,
        win_rate: String,
    },
}

/// Smoke test over one known data point. A failure means the page layout most
/// likely drifted, and the whole tier batch must not be persisted.
pub fn validate_batch(batch: &TierBatch, target: &ValidationTarget) -> Result<(), ValidationFailure> {
    let champion = batch
        .get(&target.champion)
        .ok_or_else(|| ValidationFailure::MissingChampion(target.champion.clone()))?;

    let table = champion
        .get(&target.position)
        .ok_or_else(|| ValidationFailure::MissingPosition {
            champion: target.champion.clone(),
            position: target.position,
        })?;

    let matchup = table
        .get(&target.opponent)
        .ok_or_else(|| ValidationFailure::MissingOpponent {
            champion: target.champion.clone(),
            position: target.position,
            opponent: target.opponent.clone(),
        })?;

    if !matchup.has_percent_win_rate() {
        return Err(ValidationFailure::MalformedWinRate {
            champion: target.champion.clone(),
            opponent: target.opponent.clone(),
            win_rate: matchup.win_rate.clone(),
        });
    }

    Ok(())
}

/// Per-champion gate for the streaming policy.
pub fn has_any_valid_winrate(matchups: &ChampionMatchups) -> bool {
    matchups
        .values()
        .flat_map(|table| table.values())
        .any(|matchup| matchup.has_percent_win_rate())
}
