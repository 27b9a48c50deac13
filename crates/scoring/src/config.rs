use serde::{Deserialize, Serialize};

/// Thresholds for the fundamentals score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Highest trailing P/E that still earns a point.
    pub pe_max: f64,
    /// Smallest market cap, in 亿 (100 million), that earns a point.
    pub market_cap_min: f64,
    /// Award a point for positive net profit. When false a note is recorded instead.
    pub require_profit: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pe_max: 150.0,
            market_cap_min: 100.0,
            require_profit: true,
        }
    }
}

/// Caller-supplied partial config. Absent fields keep the base value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringOverrides {
    #[serde(default)]
    pub pe_max: Option<f64>,
    #[serde(default)]
    pub market_cap_min: Option<f64>,
    #[serde(default)]
    pub require_profit: Option<bool>,
}

impl ScoringConfig {
    /// Merge `overrides` field by field over `self`.
    pub fn with_overrides(self, overrides: &ScoringOverrides) -> Self {
        Self {
            pe_max: overrides.pe_max.unwrap_or(self.pe_max),
            market_cap_min: overrides.market_cap_min.unwrap_or(self.market_cap_min),
            require_profit: overrides.require_profit.unwrap_or(self.require_profit),
        }
    }
}

/// Server-side scoring defaults file (TOML).
///
/// Example `config/scoring.toml`:
/// ```toml
/// [scoring]
/// pe_max = 80.0
/// market_cap_min = 200.0
/// require_profit = true
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScoringFileConfig {
    #[serde(default)]
    pub scoring: ScoringOverrides,
}

impl ScoringFileConfig {
    /// Load from a TOML file.
    pub fn load(path: &str) -> common::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| common::Error::Config(format!("scoring config at '{path}': {e}")))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Built-in defaults with the file's values applied.
    pub fn resolve(&self) -> ScoringConfig {
        ScoringConfig::default().with_overrides(&self.scoring)
    }
}
