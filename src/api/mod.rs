pub mod client;
pub mod endpoints;
pub mod html;
pub mod models;

use async_trait::async_trait;

use crate::error::AppError;
use models::CounterRow;

/// Fetches a page and extracts its rows. One request per call, no retries.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_rows(&self, url: &str) -> Result<Vec<CounterRow>, AppError>;

    /// Display names from the champion index, in page order.
    async fn fetch_champion_names(&self) -> Result<Vec<String>, AppError>;
}

/// Resolves the newest game patch as `major.minor`.
#[async_trait]
pub trait PatchSource: Send + Sync {
    async fn latest_patch(&self, api_url: &str) -> Result<String, AppError>;
}
