pub mod config;
pub mod enricher;

pub use config::{ScoringConfig, ScoringFileConfig, ScoringOverrides};
pub use enricher::{normalize_market_cap, score, sort_scored, Enricher, Score, ScoredMatch};
