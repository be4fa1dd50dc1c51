use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use crate::error::AppError;
use crate::models::ChampionStats;

// Snapshot of one tier's persisted documents, written next to the database write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSnapshot<'a> {
    pub patch: &'a str,
    pub tier: &'a str,
    pub exported_at: DateTime<Utc>,
    pub champions: &'a [ChampionStats],
}

#[derive(Debug, Clone)]
pub struct SnapshotExporter {
    dir: PathBuf,
}

impl SnapshotExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotExporter { dir: dir.into() }
    }

    pub fn snapshot_path(&self, patch: &str, tier: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.json", patch, tier))
    }

    pub fn export(&self, patch: &str, tier: &str, champions: &[ChampionStats]) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::ExportError(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let snapshot = TierSnapshot {
            patch,
            tier,
            exported_at: Utc::now(),
            champions,
        };
        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            AppError::ExportError(format!("Failed to serialize snapshot: {}", e))
        })?;

        let path = self.snapshot_path(patch, tier);
        write_atomically(&path, &json)?;
        Ok(path)
    }
}

// Write to a sibling temp file first so readers never see half a snapshot.
fn write_atomically(path: &Path, contents: &str) -> Result<(), AppError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).map_err(|e| {
        AppError::ExportError(format!("Failed to write {}: {}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        AppError::ExportError(format!("Failed to move snapshot into {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChampionMatchups;

    #[test]
    fn writes_named_snapshot_for_patch_and_tier() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SnapshotExporter::new(dir.path().join("exports"));
        let champions = vec![ChampionStats {
            champion_name: "ezreal".to_string(),
            patch: "15.7".to_string(),
            tier: "challenger".to_string(),
            scraped_at: Utc::now(),
            matchups: ChampionMatchups::new(),
        }];

        let path = exporter.export("15.7", "challenger", &champions).unwrap();

        assert_eq!(path, dir.path().join("exports").join("15.7_challenger.json"));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["tier"], "challenger");
        assert_eq!(written["champions"][0]["championName"], "ezreal");
        assert!(!path.with_extension("json.tmp").exists());
    }
}
