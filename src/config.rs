use crate::error::AppError;
use crate::models::Position;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PATCH_API_URL: &str = "https://ddragon.leagueoflegends.com/api/versions.json";
pub const DEFAULT_TIERS: [&str; 5] = [
    "emerald_plus",
    "diamond_plus",
    "master_plus",
    "grandmaster",
    "challenger",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PersistencePolicy {
    /// Collect a whole tier, validate once, then save every champion
    Batch,
    /// Validate and save each champion right after it is collected
    #[default]
    Streaming,
}

impl FromStr for PersistencePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(PersistencePolicy::Batch),
            "streaming" => Ok(PersistencePolicy::Streaming),
            other => Err(AppError::ConfigError(format!(
                "Unknown persistence policy '{}' (expected batch or streaming)",
                other
            ))),
        }
    }
}

impl fmt::Display for PersistencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistencePolicy::Batch => f.write_str("batch"),
            PersistencePolicy::Streaming => f.write_str("streaming"),
        }
    }
}

/// The single data point used as a circuit breaker for a tier batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationTarget {
    pub champion: String,
    pub position: Position,
    pub opponent: String,
}

impl Default for ValidationTarget {
    fn default() -> Self {
        ValidationTarget {
            champion: "ezreal".to_string(),
            position: Position::Adc,
            opponent: "jinx".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub patch_api_url: String,
    pub tiers: Vec<String>,
    pub tier_delay: Duration,
    pub champion_delay: Duration,
    pub cycle_interval: Duration,
    pub policy: PersistencePolicy,
    pub requests_per_second: u32,
    pub export_dir: Option<PathBuf>,
    pub validation: ValidationTarget,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: default_database_path(),
            patch_api_url: DEFAULT_PATCH_API_URL.to_string(),
            tiers: DEFAULT_TIERS.iter().map(|t| t.to_string()).collect(),
            tier_delay: Duration::from_secs(60),
            champion_delay: Duration::from_secs(2),
            cycle_interval: Duration::from_secs(24 * 60 * 60),
            policy: PersistencePolicy::default(),
            requests_per_second: 2,
            export_dir: None,
            validation: ValidationTarget::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Config::default();

        let database_path = env::var("STATS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let patch_api_url = env::var("PATCH_API_URL").unwrap_or(defaults.patch_api_url);

        let tiers = match env::var("SCRAPE_TIERS") {
            Ok(raw) => parse_tiers(&raw)?,
            Err(_) => defaults.tiers,
        };

        let tier_delay = Duration::from_secs(env_or("SCRAPE_TIER_DELAY_SECS", 60u64)?);
        let champion_delay = Duration::from_secs(env_or("SCRAPE_CHAMPION_DELAY_SECS", 2u64)?);
        let cycle_interval = interval_from_hours(env_or("SCRAPE_INTERVAL_HOURS", 24u64)?)?;

        let policy = env_or("SCRAPE_POLICY", defaults.policy)?;
        let requests_per_second = non_zero_rate(env_or(
            "SCRAPE_REQUESTS_PER_SECOND",
            defaults.requests_per_second,
        )?)?;
        let export_dir = env::var("SCRAPE_EXPORT_DIR").ok().map(PathBuf::from);

        let validation = ValidationTarget {
            champion: env::var("VALIDATION_CHAMPION").unwrap_or(defaults.validation.champion),
            position: env_or("VALIDATION_POSITION", defaults.validation.position)?,
            opponent: env::var("VALIDATION_OPPONENT").unwrap_or(defaults.validation.opponent),
        };

        Ok(Config {
            database_path,
            patch_api_url,
            tiers,
            tier_delay,
            champion_delay,
            cycle_interval,
            policy,
            requests_per_second,
            export_dir,
            validation,
        })
    }
}

fn default_database_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".matchup_scraper")
        .join("ranked_stats.db")
}

fn env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid {} '{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}

fn interval_from_hours(hours: u64) -> Result<Duration, AppError> {
    if hours == 0 {
        return Err(AppError::ConfigError(
            "SCRAPE_INTERVAL_HOURS must be at least 1".to_string(),
        ));
    }
    hours
        .checked_mul(60 * 60)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            AppError::ConfigError(format!("SCRAPE_INTERVAL_HOURS {} is too large", hours))
        })
}

fn non_zero_rate(requests_per_second: u32) -> Result<u32, AppError> {
    if requests_per_second == 0 {
        return Err(AppError::ConfigError(
            "SCRAPE_REQUESTS_PER_SECOND must be at least 1".to_string(),
        ));
    }
    Ok(requests_per_second)
}

fn parse_tiers(raw: &str) -> Result<Vec<String>, AppError> {
    let tiers: Vec<String> = raw
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if tiers.is_empty() {
        return Err(AppError::ConfigError("SCRAPE_TIERS is empty".to_string()));
    }
    Ok(tiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_production_schedule() {
        let config = Config::default();
        assert_eq!(config.tiers.len(), 5);
        assert_eq!(config.tiers[0], "emerald_plus");
        assert_eq!(config.tiers[4], "challenger");
        assert_eq!(config.cycle_interval, Duration::from_secs(86_400));
        assert_eq!(config.policy, PersistencePolicy::Streaming);
        assert_eq!(config.validation, ValidationTarget::default());
    }

    #[test]
    fn tiers_are_trimmed_and_empty_entries_dropped() {
        let tiers = parse_tiers(" challenger , ,grandmaster").unwrap();
        assert_eq!(tiers, vec!["challenger", "grandmaster"]);
        assert!(parse_tiers(" , ").is_err());
    }

    #[test]
    fn interval_hours_are_bounded_without_overflow() {
        assert_eq!(interval_from_hours(24).unwrap(), Duration::from_secs(86_400));
        assert!(matches!(interval_from_hours(0), Err(AppError::ConfigError(_))));
        assert!(matches!(
            interval_from_hours(u64::MAX),
            Err(AppError::ConfigError(_))
        ));
        assert!(matches!(
            interval_from_hours(u64::MAX / 3600 + 1),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn zero_request_rate_is_rejected() {
        assert!(matches!(non_zero_rate(0), Err(AppError::ConfigError(_))));
        assert_eq!(non_zero_rate(2).unwrap(), 2);
    }

    #[test]
    fn policy_parses_from_text() {
        assert_eq!("Batch".parse::<PersistencePolicy>().unwrap(), PersistencePolicy::Batch);
        assert_eq!(
            "streaming".parse::<PersistencePolicy>().unwrap(),
            PersistencePolicy::Streaming
        );
        assert!("parallel".parse::<PersistencePolicy>().is_err());
    }
}
