use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::schema::create_tables;
use super::StatsRepository;
use crate::error::AppError;
use crate::models::ChampionStats;

const UPSERT_SQL: &str = r#"
    INSERT INTO ranked_stats (champion_name, patch, tier, scraped_at, matchups)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (champion_name, patch, tier)
    DO UPDATE SET scraped_at = excluded.scraped_at, matchups = excluded.matchups
"#;

/// Single shared connection for the process lifetime. `None` once disconnected.
pub struct SqliteStatsRepository {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStatsRepository {
    /// Open (creating if needed) the database and verify it answers a ping.
    pub fn connect(db_path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::ConnectError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| {
            AppError::ConnectError(format!("Failed to open {}: {}", db_path.display(), e))
        })?;

        let repo = Self::from_connection(conn)?;
        info!(path = %db_path.display(), "connected to stats database");
        Ok(repo)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::ConnectError(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        create_tables(&conn)
            .map_err(|e| AppError::ConnectError(format!("Failed to create schema: {}", e)))?;

        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| AppError::ConnectError(format!("Failed to ping database: {}", e)))?;

        Ok(SqliteStatsRepository {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    #[cfg(test)]
    pub fn find(&self, champion: &str, patch: &str, tier: &str) -> Result<Option<ChampionStats>, AppError> {
        use rusqlite::OptionalExtension;

        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(|| AppError::SaveError("connection closed".to_string()))?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT scraped_at, matchups FROM ranked_stats WHERE champion_name = ?1 AND patch = ?2 AND tier = ?3",
                params![champion, patch, tier],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| AppError::SaveError(e.to_string()))?;

        Ok(row.map(|(scraped_at, matchups)| ChampionStats {
            champion_name: champion.to_string(),
            patch: patch.to_string(),
            tier: tier.to_string(),
            scraped_at: chrono::DateTime::parse_from_rfc3339(&scraped_at)
                .unwrap()
                .with_timezone(&chrono::Utc),
            matchups: serde_json::from_str(&matchups).unwrap(),
        }))
    }

    #[cfg(test)]
    pub fn count(&self) -> usize {
        let guard = self.conn.lock().unwrap();
        guard
            .as_ref()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM ranked_stats", [], |row| row.get::<_, i64>(0))
            .unwrap() as usize
    }
}

#[async_trait]
impl StatsRepository for SqliteStatsRepository {
    async fn upsert(&self, stats: &ChampionStats) -> Result<(), AppError> {
        let matchups = serde_json::to_string(&stats.matchups).map_err(|e| {
            AppError::SaveError(format!("Failed to serialize matchups for {}: {}", stats.champion_name, e))
        })?;
        let champion = stats.champion_name.clone();
        let patch = stats.patch.clone();
        let tier = stats.tier.clone();
        let scraped_at = stats.scraped_at.to_rfc3339();
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| AppError::SaveError("Connection lock poisoned".to_string()))?;
            let conn = guard
                .as_ref()
                .ok_or_else(|| AppError::SaveError("Connection already closed".to_string()))?;

            conn.execute(UPSERT_SQL, params![champion, patch, tier, scraped_at, matchups])
                .map_err(|e| {
                    AppError::SaveError(format!(
                        "Failed to upsert champion stats for {} (Patch: {}, Tier: {}): {}",
                        champion, patch, tier, e
                    ))
                })?;

            debug!(champion = %champion, patch = %patch, tier = %tier, "saved champion stats");
            Ok(())
        })
        .await
        .map_err(|e| AppError::SaveError(format!("Save task failed: {}", e)))?
    }

    async fn disconnect(&self) {
        let taken = match self.conn.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => {
                warn!("connection lock poisoned, skipping disconnect");
                return;
            }
        };

        if let Some(conn) = taken {
            match conn.close() {
                Ok(()) => info!("disconnected from stats database"),
                Err((_, e)) => warn!(error = %e, "error disconnecting from stats database"),
            }
        }
    }
}
