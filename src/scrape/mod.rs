//! op.gg matchup scraping: name normalization, per-champion collection,
//! validation gates and the scheduling loop that ties them together.

pub mod collector;
pub mod normalize;
pub mod orchestrator;
pub mod validation;

pub use orchestrator::Orchestrator;
