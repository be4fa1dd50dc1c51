use tracing::{debug, warn};

use super::normalize::normalize_champion_name;
use crate::api::endpoints::counters_url;
use crate::api::models::CounterRow;
use crate::api::PageFetcher;
use crate::models::{ChampionMatchups, Matchup, MatchupTable, Position};

pub struct MatchupCollector<'a> {
    fetcher: &'a dyn PageFetcher,
}

impl<'a> MatchupCollector<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher) -> Self {
        MatchupCollector { fetcher }
    }

    /// One fetch per position, in `Position::ALL` order. A failed fetch leaves
    /// that position out; zero rows records it as present and empty.
    pub async fn collect(&self, champion: &str, tier: &str, query_patch: &str) -> ChampionMatchups {
        let mut matchups = ChampionMatchups::new();

        for position in Position::ALL {
            let url = counters_url(champion, position, tier, query_patch);
            match self.fetcher.fetch_rows(&url).await {
                Ok(rows) => {
                    let table = rows_to_table(rows);
                    debug!(champion, %position, rows = table.len(), "collected position");
                    matchups.insert(position, table);
                }
                Err(e) => {
                    warn!(champion, %position, tier, error = %e, "failed to fetch counters");
                }
            }
        }

        matchups
    }
}

fn rows_to_table(rows: Vec<CounterRow>) -> MatchupTable {
    rows.into_iter()
        .filter_map(|row| {
            let opponent = normalize_champion_name(&row.name);
            if opponent.is_empty() {
                return None;
            }
            Some((
                opponent,
                Matchup {
                    win_rate: row.win_rate,
                    games_played: row.games_played,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned rows per URL; unknown URLs return no rows.
    #[derive(Default)]
    pub struct StubFetcher {
        pub pages: HashMap<String, Vec<CounterRow>>,
        pub failing: Vec<String>,
        pub champions: Vec<String>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub fn with_page(mut self, url: String, rows: Vec<CounterRow>) -> Self {
            self.pages.insert(url, rows);
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch_rows(&self, url: &str) -> Result<Vec<CounterRow>, AppError> {
            self.requested.lock().unwrap().push(url.to_string());
            if self.failing.iter().any(|f| f == url) {
                return Err(AppError::FetchError(format!("{} returned status 503", url)));
            }
            Ok(self.pages.get(url).cloned().unwrap_or_default())
        }

        async fn fetch_champion_names(&self) -> Result<Vec<String>, AppError> {
            Ok(self.champions.clone())
        }
    }

    #[tokio::test]
    async fn collects_only_rows_served_for_each_position() {
        let fetcher = StubFetcher::default().with_page(
            counters_url("ezreal", Position::Adc, "emerald_plus", "15.07"),
            vec![
                CounterRow::new("Jinx", "55%", "1000"),
                CounterRow::new("Caitlyn", "48%", "800"),
            ],
        );

        let matchups = MatchupCollector::new(&fetcher)
            .collect("ezreal", "emerald_plus", "15.07")
            .await;

        assert_eq!(matchups.len(), 5);
        let non_empty: Vec<_> = matchups
            .iter()
            .filter(|(_, table)| !table.is_empty())
            .map(|(position, _)| *position)
            .collect();
        assert_eq!(non_empty, vec![Position::Adc]);

        let adc = &matchups[&Position::Adc];
        assert_eq!(adc.len(), 2);
        assert_eq!(adc["jinx"].win_rate, "55%");
        assert_eq!(adc["jinx"].games_played, "1000");
        assert_eq!(adc["caitlyn"].win_rate, "48%");
    }

    #[tokio::test]
    async fn positions_are_requested_in_fixed_order() {
        let fetcher = StubFetcher::default();
        MatchupCollector::new(&fetcher)
            .collect("ahri", "challenger", "15.10")
            .await;

        let expected: Vec<String> = Position::ALL
            .iter()
            .map(|p| counters_url("ahri", *p, "challenger", "15.10"))
            .collect();
        assert_eq!(fetcher.requests(), expected);
    }

    #[tokio::test]
    async fn failed_position_is_absent_and_others_still_collected() {
        let mut fetcher = StubFetcher::default().with_page(
            counters_url("ahri", Position::Mid, "challenger", "15.10"),
            vec![CounterRow::new("Zed", "51.2%", "300")],
        );
        fetcher
            .failing
            .push(counters_url("ahri", Position::Jungle, "challenger", "15.10"));

        let matchups = MatchupCollector::new(&fetcher)
            .collect("ahri", "challenger", "15.10")
            .await;

        assert_eq!(fetcher.requests().len(), 5);
        assert!(!matchups.contains_key(&Position::Jungle));
        assert!(matchups[&Position::Top].is_empty());
        assert_eq!(matchups[&Position::Mid]["zed"].win_rate, "51.2%");
    }

    #[test]
    fn malformed_rows_are_kept_but_nameless_rows_dropped() {
        let table = rows_to_table(vec![
            CounterRow::new("Dr. Mundo", "", "n/a"),
            CounterRow::new("   ", "50%", "10"),
            CounterRow::new("", "50%", "10"),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table["drmundo"].win_rate, "");
        assert_eq!(table["drmundo"].games_played, "n/a");
        // whitespace-only names normalize to "" and are not matchup rows
        assert!(!table.contains_key(""));
    }
}
