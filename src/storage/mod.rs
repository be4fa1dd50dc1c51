//! Persistence for scraped champion stats.

pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::ChampionStats;

pub use sqlite::SqliteStatsRepository;

/// Document store keyed by (champion_name, patch, tier).
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Replace the whole document for the key, or insert it.
    async fn upsert(&self, stats: &ChampionStats) -> Result<(), AppError>;

    /// Best effort; close errors are logged, not returned.
    async fn disconnect(&self);
}
