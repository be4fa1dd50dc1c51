//! SQLite schema for the ranked stats documents
//!
//! Tables:
//! - ranked_stats: one document per (champion_name, patch, tier); matchups stored as JSON

use rusqlite::{Connection, Result};

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS ranked_stats (
            champion_name TEXT NOT NULL,
            patch TEXT NOT NULL,
            tier TEXT NOT NULL,
            scraped_at TEXT NOT NULL,
            matchups TEXT NOT NULL,
            PRIMARY KEY (champion_name, patch, tier)
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_ranked_stats_patch_tier ON ranked_stats(patch, tier)",
        [],
    )?;

    Ok(())
}
