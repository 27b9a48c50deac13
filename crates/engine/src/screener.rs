use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use common::{FetchWindow, MatchResult, SymbolUniverse};
use scoring::{Enricher, ScoredMatch, ScoringConfig, ScoringOverrides};
use strategy::params::MIN_HISTORY;

use crate::scheduler::Scheduler;
use crate::universe::{load_universe, parse_symbols};

/// One entry of the response's match list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MatchEntry {
    Scored(ScoredMatch),
    Plain(MatchResult),
}

impl MatchEntry {
    pub fn result(&self) -> &MatchResult {
        match self {
            MatchEntry::Scored(s) => &s.result,
            MatchEntry::Plain(m) => m,
        }
    }
}

/// Per-request knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    pub score: bool,
    pub scoring: ScoringOverrides,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            score: true,
            scoring: ScoringOverrides::default(),
        }
    }
}

/// Everything a scan produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    /// Symbols scheduled for evaluation.
    pub total: usize,
    pub matches: Vec<MatchEntry>,
    /// Effective scoring config after overrides.
    pub scoring: ScoringConfig,
    pub score_enabled: bool,
}

/// Request-scoped pipeline: symbol list, fan-out, optional scoring, ordering.
pub struct Screener {
    scheduler: Scheduler,
    universe: Arc<dyn SymbolUniverse>,
    enricher: Enricher,
    default_scoring: ScoringConfig,
}

impl Screener {
    pub fn new(
        scheduler: Scheduler,
        universe: Arc<dyn SymbolUniverse>,
        enricher: Enricher,
        default_scoring: ScoringConfig,
    ) -> Self {
        Self {
            scheduler,
            universe,
            enricher,
            default_scoring,
        }
    }

    pub fn workers(&self) -> usize {
        self.scheduler.workers()
    }

    pub fn default_scoring(&self) -> ScoringConfig {
        self.default_scoring
    }

    /// Screen `symbols_raw` (or the whole universe when it names nothing)
    /// as of `today`.
    pub async fn scan(&self, symbols_raw: &str, today: NaiveDate, options: &ScanOptions) -> ScanReport {
        let scoring = self.default_scoring.with_overrides(&options.scoring);

        let mut symbols = parse_symbols(symbols_raw);
        if symbols.is_empty() {
            symbols = load_universe(self.universe.as_ref()).await;
        }

        if symbols.is_empty() {
            return ScanReport {
                total: 0,
                matches: Vec::new(),
                scoring,
                score_enabled: options.score,
            };
        }

        let total = symbols.len();
        let window = FetchWindow::trailing(today, MIN_HISTORY);
        info!(total, start = %window.start, end = %window.end, "Scan started");

        let mut matched = self.scheduler.run(symbols, window).await;

        let matches = if options.score {
            self.enricher
                .enrich_all(matched, &scoring)
                .await
                .into_iter()
                .map(MatchEntry::Scored)
                .collect()
        } else {
            matched.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));
            matched.into_iter().map(MatchEntry::Plain).collect()
        };

        ScanReport {
            total,
            matches,
            scoring,
            score_enabled: options.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as Days;
    use common::{Bar, Error, Fundamentals, FundamentalsSource, MarketDataSource, Result, SymbolInfo};
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::evaluator::SymbolEvaluator;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    fn series(last_close: f64, last_volume: f64) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut bars: Vec<Bar> = (0..129)
            .map(|i| Bar {
                date: start + Days::days(i),
                open: 10.0,
                high: 10.05,
                low: 9.95,
                close: 10.0,
                volume: 1000.0,
            })
            .collect();
        bars.push(Bar {
            date: start + Days::days(129),
            open: 10.0,
            high: last_close + 0.1,
            low: 9.98,
            close: last_close,
            volume: last_volume,
        });
        bars
    }

    struct TableSource(HashMap<String, Vec<Bar>>);

    #[async_trait]
    impl MarketDataSource for TableSource {
        async fn daily_bars(&self, symbol: &str, _window: FetchWindow) -> Result<Vec<Bar>> {
            Ok(self.0.get(symbol).cloned().unwrap_or_default())
        }
    }

    struct DownUniverse;

    #[async_trait]
    impl SymbolUniverse for DownUniverse {
        async fn list_symbols(&self) -> Result<Vec<SymbolInfo>> {
            Err(Error::Http("timeout".into()))
        }
    }

    struct TableFundamentals(HashMap<String, Fundamentals>);

    #[async_trait]
    impl FundamentalsSource for TableFundamentals {
        async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
            Ok(self.0.get(symbol).copied().unwrap_or_default())
        }
    }

    fn screener(bars: HashMap<String, Vec<Bar>>, funds: HashMap<String, Fundamentals>) -> Screener {
        let evaluator = SymbolEvaluator::new(Arc::new(TableSource(bars)), Duration::from_secs(5));
        Screener::new(
            Scheduler::new(Arc::new(evaluator), 8),
            Arc::new(DownUniverse),
            Enricher::new(Arc::new(TableFundamentals(funds)), Duration::from_secs(5)),
            ScoringConfig::default(),
        )
    }

    #[tokio::test]
    async fn empty_symbols_scan_fallback_universe() {
        let report = screener(HashMap::new(), HashMap::new())
            .scan("", today(), &ScanOptions::default())
            .await;
        assert_eq!(report.total, 5);
        assert!(report.matches.is_empty());
        assert!(report.score_enabled);
    }

    #[tokio::test]
    async fn scored_matches_are_ranked() {
        let mut bars = HashMap::new();
        bars.insert("600001".to_string(), series(11.0, 5000.0));
        bars.insert("600002".to_string(), series(11.5, 5000.0));
        bars.insert("600003".to_string(), series(11.0, 3900.0));

        let mut funds = HashMap::new();
        funds.insert(
            "600001".to_string(),
            Fundamentals {
                pe_ttm: Some(20.0),
                market_cap: Some(600.0),
                net_profit: Some(1.0),
            },
        );

        let report = screener(bars, funds)
            .scan("600001,600002,600003", today(), &ScanOptions::default())
            .await;

        assert_eq!(report.total, 3);
        let order: Vec<&str> = report.matches.iter().map(|m| m.result().symbol.as_str()).collect();
        assert_eq!(order, vec!["600001", "600002"]);
        match &report.matches[0] {
            MatchEntry::Scored(s) => assert_eq!(s.score, 3),
            other => panic!("expected scored entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unscored_matches_sorted_by_change() {
        let mut bars = HashMap::new();
        bars.insert("600001".to_string(), series(11.0, 5000.0));
        bars.insert("600002".to_string(), series(11.5, 5000.0));

        let options = ScanOptions {
            score: false,
            ..ScanOptions::default()
        };
        let report = screener(bars, HashMap::new())
            .scan("600001 600002", today(), &options)
            .await;

        assert!(!report.score_enabled);
        let order: Vec<&str> = report.matches.iter().map(|m| m.result().symbol.as_str()).collect();
        assert_eq!(order, vec!["600002", "600001"]);
        assert!(matches!(report.matches[0], MatchEntry::Plain(_)));
    }

    #[tokio::test]
    async fn overrides_are_echoed() {
        let options = ScanOptions {
            score: true,
            scoring: ScoringOverrides {
                pe_max: Some(20.0),
                market_cap_min: Some(500.0),
                require_profit: None,
            },
        };
        let report = screener(HashMap::new(), HashMap::new())
            .scan("600519", today(), &options)
            .await;
        assert_eq!(report.total, 1);
        assert_eq!(report.scoring.pe_max, 20.0);
        assert_eq!(report.scoring.market_cap_min, 500.0);
        assert!(report.scoring.require_profit);
    }
}
