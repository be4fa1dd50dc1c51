//! The scrape-validate-persist cycle.
//!
//! Every blocking point (tier pacing, champion pacing, the wait for the next
//! cycle, each save) observes the shared `CancellationToken`. Network calls are
//! never interrupted; cancellation only stops the next unit of work from
//! starting.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::collector::MatchupCollector;
use super::normalize::normalize_champion_name;
use super::validation::{has_any_valid_winrate, validate_batch, TierBatch};
use crate::api::{PageFetcher, PatchSource};
use crate::config::{Config, PersistencePolicy};
use crate::error::Cancelled;
use crate::export::SnapshotExporter;
use crate::models::{total_rows, ChampionMatchups, ChampionStats};
use crate::patch::{to_query_form, to_storage_form};
use crate::storage::StatsRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    /// Patch resolution failed; nothing was scraped.
    Skipped,
    Cancelled,
}

// Patch in both representations, resolved once per cycle.
struct PatchForms {
    storage: String,
    query: String,
}

pub struct Orchestrator {
    config: Config,
    fetcher: Arc<dyn PageFetcher>,
    patches: Arc<dyn PatchSource>,
    repository: Arc<dyn StatsRepository>,
    exporter: Option<SnapshotExporter>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        patches: Arc<dyn PatchSource>,
        repository: Arc<dyn StatsRepository>,
    ) -> Self {
        let exporter = config
            .export_dir
            .as_ref()
            .map(|dir| SnapshotExporter::new(dir.clone()));
        Orchestrator {
            config,
            fetcher,
            patches,
            repository,
            exporter,
        }
    }

    /// Run a cycle now, then one per `cycle_interval` until the token fires.
    pub async fn run(&self, token: CancellationToken) {
        info!("performing initial scrape");
        if self.run_cycle(&token).await == CycleOutcome::Cancelled {
            return;
        }

        let period = self.config.cycle_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(hours = period.as_secs() / 3600, "waiting for next scheduled run");

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("shutdown signal received");
                    return;
                }
                _ = ticker.tick() => {
                    if token.is_cancelled() {
                        info!("cancelled while waiting, skipping scheduled run");
                        return;
                    }
                    info!("scheduled scrape starting");
                    if self.run_cycle(&token).await == CycleOutcome::Cancelled {
                        return;
                    }
                    info!("scheduled scrape complete, waiting for next run");
                }
            }
        }
    }

    pub async fn run_cycle(&self, token: &CancellationToken) -> CycleOutcome {
        let latest = match self.patches.latest_patch(&self.config.patch_api_url).await {
            Ok(patch) => patch,
            Err(e) => {
                error!(error = %e, "could not fetch latest patch version, skipping scrape cycle");
                return CycleOutcome::Skipped;
            }
        };
        info!(patch = %latest, "latest patch version identified");

        let patch = PatchForms {
            storage: to_storage_form(&latest),
            query: to_query_form(&latest),
        };

        match self.scrape_patch(token, &patch).await {
            Ok(()) => {
                info!("finished scraping cycle");
                CycleOutcome::Completed
            }
            Err(Cancelled) => {
                info!("scrape cycle cancelled");
                CycleOutcome::Cancelled
            }
        }
    }

    async fn scrape_patch(&self, token: &CancellationToken, patch: &PatchForms) -> Result<(), Cancelled> {
        checkpoint(token)?;
        let champions = self.champion_list().await;

        for tier in &self.config.tiers {
            self.scrape_tier(token, tier, &champions, patch).await?;
        }
        Ok(())
    }

    // Normalized, de-duplicated, in page order. A failed fetch yields an empty list.
    async fn champion_list(&self) -> Vec<String> {
        let names = match self.fetcher.fetch_champion_names().await {
            Ok(names) => names,
            Err(e) => {
                error!(error = %e, "failed to fetch champion list");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let champions: Vec<String> = names
            .iter()
            .map(|name| normalize_champion_name(name))
            .filter(|name| !name.is_empty() && seen.insert(name.clone()))
            .collect();

        info!(count = champions.len(), "champion list collected");
        champions
    }

    async fn scrape_tier(
        &self,
        token: &CancellationToken,
        tier: &str,
        champions: &[String],
        patch: &PatchForms,
    ) -> Result<(), Cancelled> {
        if token.is_cancelled() {
            info!(tier, "cancelled before starting tier");
            return Err(Cancelled);
        }

        info!(tier, delay_secs = self.config.tier_delay.as_secs(), "waiting before scraping tier");
        pause(token, self.config.tier_delay).await?;

        info!(
            tier,
            patch = %patch.storage,
            opgg_patch = %patch.query,
            policy = %self.config.policy,
            "scraping tier"
        );

        match self.config.policy {
            PersistencePolicy::Batch => self.scrape_tier_batch(token, tier, champions, patch).await,
            PersistencePolicy::Streaming => self.scrape_tier_streaming(token, tier, champions, patch).await,
        }
    }

    async fn scrape_tier_batch(
        &self,
        token: &CancellationToken,
        tier: &str,
        champions: &[String],
        patch: &PatchForms,
    ) -> Result<(), Cancelled> {
        let mut batch = TierBatch::new();
        for champion in champions {
            let matchups = self.collect_champion(token, champion, tier, patch).await?;
            batch.insert(champion.clone(), matchups);
        }

        checkpoint(token)?;

        if let Err(failure) = validate_batch(&batch, &self.config.validation) {
            warn!(tier, patch = %patch.storage, reason = %failure, "validation failed, skipping save for this batch");
            return Ok(());
        }
        info!(tier, patch = %patch.storage, "validation passed");

        let scraped_at = Utc::now();
        let mut saved = Vec::new();
        for (champion, matchups) in batch {
            checkpoint(token)?;
            if total_rows(&matchups) == 0 {
                continue;
            }

            let stats = champion_stats(champion, patch, tier, scraped_at, matchups);
            if self.save(token, &stats).await? {
                saved.push(stats);
            }
        }

        self.finish_tier(tier, patch, &saved);
        Ok(())
    }

    async fn scrape_tier_streaming(
        &self,
        token: &CancellationToken,
        tier: &str,
        champions: &[String],
        patch: &PatchForms,
    ) -> Result<(), Cancelled> {
        // Taken when the first champion of the tier clears the gate, then shared.
        let mut scraped_at: Option<DateTime<Utc>> = None;
        let mut saved = Vec::new();

        for champion in champions {
            let matchups = self.collect_champion(token, champion, tier, patch).await?;

            if !has_any_valid_winrate(&matchups) {
                warn!(champion = %champion, tier, "no valid win rate found, skipping save");
                continue;
            }

            checkpoint(token)?;
            let scraped_at = *scraped_at.get_or_insert_with(Utc::now);
            let stats = champion_stats(champion.clone(), patch, tier, scraped_at, matchups);
            if self.save(token, &stats).await? {
                saved.push(stats);
            }
        }

        self.finish_tier(tier, patch, &saved);
        Ok(())
    }

    async fn collect_champion(
        &self,
        token: &CancellationToken,
        champion: &str,
        tier: &str,
        patch: &PatchForms,
    ) -> Result<ChampionMatchups, Cancelled> {
        if token.is_cancelled() {
            info!(champion, tier, "cancelled before scraping champion");
            return Err(Cancelled);
        }

        debug!(champion, tier, "scraping matchups");
        pause(token, self.config.champion_delay).await?;

        let matchups = MatchupCollector::new(self.fetcher.as_ref())
            .collect(champion, tier, &patch.query)
            .await;

        if total_rows(&matchups) == 0 {
            warn!(champion, tier, patch = %patch.query, "no matchups found, possible scrape issue");
        }
        Ok(matchups)
    }

    // Ok(false) on a save error; Err only when the error coincides with shutdown.
    async fn save(&self, token: &CancellationToken, stats: &ChampionStats) -> Result<bool, Cancelled> {
        match self.repository.upsert(stats).await {
            Ok(()) => Ok(true),
            Err(e) if token.is_cancelled() => {
                info!(champion = %stats.champion_name, error = %e, "cancelled during save");
                Err(Cancelled)
            }
            Err(e) => {
                error!(champion = %stats.champion_name, tier = %stats.tier, error = %e, "error saving stats");
                Ok(false)
            }
        }
    }

    fn finish_tier(&self, tier: &str, patch: &PatchForms, saved: &[ChampionStats]) {
        info!(tier, patch = %patch.storage, saved = saved.len(), "finished saving tier");

        let Some(exporter) = &self.exporter else {
            return;
        };
        if saved.is_empty() {
            return;
        }
        match exporter.export(&patch.storage, tier, saved) {
            Ok(path) => info!(path = %path.display(), "exported tier snapshot"),
            Err(e) => warn!(error = %e, "failed to export tier snapshot"),
        }
    }
}

fn champion_stats(
    champion_name: String,
    patch: &PatchForms,
    tier: &str,
    scraped_at: DateTime<Utc>,
    matchups: ChampionMatchups,
) -> ChampionStats {
    ChampionStats {
        champion_name,
        patch: patch.storage.clone(),
        tier: tier.to_string(),
        scraped_at,
        matchups,
    }
}

fn checkpoint(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}

/// Sleep for `duration` unless the token fires first.
pub async fn pause(token: &CancellationToken, duration: Duration) -> Result<(), Cancelled> {
    if duration.is_zero() {
        return checkpoint(token);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
