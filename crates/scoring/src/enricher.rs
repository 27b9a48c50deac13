use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use common::{round2, Fundamentals, FundamentalsSource, MatchResult};

use crate::config::ScoringConfig;

/// Raw market caps above this are taken to be in 万 (ten-thousands).
const TEN_THOUSAND_UNIT_THRESHOLD: f64 = 100_000.0;

pub const REASON_PE: &str = "市盈率达标";
pub const REASON_MARKET_CAP: &str = "市值达标";
pub const REASON_PROFIT: &str = "盈利";
pub const NOTE_PROFIT_NOT_REQUIRED: &str = "未要求盈利";

/// A match with its fundamentals score attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    /// 0 to 3.
    pub score: u8,
    pub score_reasons: Vec<String>,
    pub pe_ttm: Option<f64>,
    pub market_cap_billion: Option<f64>,
    pub net_profit: Option<f64>,
}

/// Points and the reasons that earned them, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Score {
    pub points: u8,
    pub reasons: Vec<String>,
}

/// Bring a raw market cap into 亿 units.
pub fn normalize_market_cap(raw: f64) -> f64 {
    if raw > TEN_THOUSAND_UNIT_THRESHOLD {
        raw / 10_000.0
    } else {
        raw
    }
}

/// Score fundamentals against `cfg`. Checks run in a fixed order:
/// P/E, market cap, profit.
pub fn score(fundamentals: &Fundamentals, cfg: &ScoringConfig) -> Score {
    let mut out = Score::default();

    if known(fundamentals.pe_ttm).is_some_and(|pe| pe <= cfg.pe_max) {
        out.points += 1;
        out.reasons.push(REASON_PE.to_string());
    }

    if known(fundamentals.market_cap)
        .map(normalize_market_cap)
        .is_some_and(|cap| cap >= cfg.market_cap_min)
    {
        out.points += 1;
        out.reasons.push(REASON_MARKET_CAP.to_string());
    }

    if cfg.require_profit {
        if known(fundamentals.net_profit).is_some_and(|p| p > 0.0) {
            out.points += 1;
            out.reasons.push(REASON_PROFIT.to_string());
        }
    } else {
        out.reasons.push(NOTE_PROFIT_NOT_REQUIRED.to_string());
    }

    out
}

/// Order by score, then change percent, both descending.
pub fn sort_scored(matches: &mut [ScoredMatch]) {
    matches.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| cmp_desc(a.result.change_pct, b.result.change_pct))
    });
}

fn cmp_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Attaches fundamentals scores to matched symbols.
///
/// Fundamentals lookups run one after another. A lookup that fails or
/// exceeds `timeout` yields all-null fundamentals and a score built from
/// nothing.
pub struct Enricher {
    source: Arc<dyn FundamentalsSource>,
    timeout: Duration,
}

impl Enricher {
    pub fn new(source: Arc<dyn FundamentalsSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub async fn fundamentals(&self, symbol: &str) -> Fundamentals {
        match tokio::time::timeout(self.timeout, self.source.fundamentals(symbol)).await {
            Ok(Ok(f)) => f,
            Ok(Err(e)) => {
                debug!(symbol, error = %e, "Fundamentals lookup failed");
                Fundamentals::default()
            }
            Err(_) => {
                debug!(symbol, timeout = ?self.timeout, "Fundamentals lookup timed out");
                Fundamentals::default()
            }
        }
    }

    pub async fn enrich(&self, result: MatchResult, cfg: &ScoringConfig) -> ScoredMatch {
        let fundamentals = self.fundamentals(&result.symbol).await;
        let Score { points, reasons } = score(&fundamentals, cfg);

        ScoredMatch {
            result,
            score: points,
            score_reasons: reasons,
            pe_ttm: known(fundamentals.pe_ttm).map(round2),
            market_cap_billion: known(fundamentals.market_cap)
                .map(|cap| round2(normalize_market_cap(cap))),
            net_profit: known(fundamentals.net_profit),
        }
    }

    /// Score every match and return them best first.
    pub async fn enrich_all(
        &self,
        matches: Vec<MatchResult>,
        cfg: &ScoringConfig,
    ) -> Vec<ScoredMatch> {
        let mut scored = Vec::with_capacity(matches.len());
        for m in matches {
            scored.push(self.enrich(m, cfg).await);
        }
        sort_scored(&mut scored);
        info!(count = scored.len(), "Scoring complete");
        scored
    }
}
