use serde::Deserialize;

// One `<li>` of a counters page, as text. No parsing of the numbers happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRow {
    pub name: String,
    pub win_rate: String,
    pub games_played: String,
}

impl CounterRow {
    #[cfg(test)]
    pub fn new(name: &str, win_rate: &str, games_played: &str) -> Self {
        CounterRow {
            name: name.to_string(),
            win_rate: win_rate.to_string(),
            games_played: games_played.to_string(),
        }
    }
}

// Data Dragon versions.json: newest first, e.g. ["15.8.1", "15.7.1", ...]
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct VersionsDto(pub Vec<String>);
