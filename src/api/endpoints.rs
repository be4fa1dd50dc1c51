// op.gg page URLs. Content must be present in the initial HTML (no JS rendering).

use crate::models::Position;

pub const OPGG_BASE: &str = "https://www.op.gg";
pub const CHAMPIONS_ENDPOINT: &str = "https://www.op.gg/champions";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Counter table for one champion/position, e.g.
/// `https://www.op.gg/champions/ezreal/counters/adc?region=global&tier=emerald_plus&patch=15.07`
pub fn counters_url(champion: &str, position: Position, tier: &str, query_patch: &str) -> String {
    format!(
        "{}/champions/{}/counters/{}?region=global&tier={}&patch={}",
        OPGG_BASE, champion, position, tier, query_patch
    )
}
