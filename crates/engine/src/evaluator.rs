use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use common::{round2, Error, FetchWindow, MarketDataSource, MatchResult, Result, SymbolInfo};
use strategy::{IndicatorTable, SeriesRejected};

/// Outcome of evaluating one symbol, before failures are folded into "no match".
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Matched(MatchResult),
    NoSignal,
    Rejected(SeriesRejected),
}

/// Runs fetch, validate, compute and extract for a single symbol.
///
/// `evaluate` never fails: fetch errors, timeouts and short series all
/// come back as `None`, so one bad symbol cannot abort a batch.
pub struct SymbolEvaluator {
    source: Arc<dyn MarketDataSource>,
    fetch_timeout: Duration,
}

impl SymbolEvaluator {
    pub fn new(source: Arc<dyn MarketDataSource>, fetch_timeout: Duration) -> Self {
        Self {
            source,
            fetch_timeout,
        }
    }

    pub async fn evaluate(&self, symbol: &SymbolInfo, window: FetchWindow) -> Option<MatchResult> {
        match self.try_evaluate(symbol, window).await {
            Ok(Evaluation::Matched(m)) => {
                debug!(symbol = %m.symbol, change_pct = m.change_pct, "Pattern matched");
                Some(m)
            }
            Ok(Evaluation::NoSignal) => None,
            Ok(Evaluation::Rejected(reason)) => {
                debug!(symbol = %symbol.code, %reason, "Series rejected");
                None
            }
            Err(e) => {
                debug!(symbol = %symbol.code, error = %e, "Evaluation failed");
                None
            }
        }
    }

    /// Same as `evaluate` but keeps the reason a symbol did not match.
    pub async fn try_evaluate(&self, symbol: &SymbolInfo, window: FetchWindow) -> Result<Evaluation> {
        let bars = self.fetch(&symbol.code, window).await?;

        let series = match strategy::validate(bars) {
            Ok(series) => series,
            Err(reason) => return Ok(Evaluation::Rejected(reason)),
        };

        let table = strategy::compute(&series);
        Ok(match match_from_table(symbol, &table) {
            Some(m) => Evaluation::Matched(m),
            None => Evaluation::NoSignal,
        })
    }

    async fn fetch(&self, code: &str, window: FetchWindow) -> Result<Vec<common::Bar>> {
        tokio::time::timeout(self.fetch_timeout, self.source.daily_bars(code, window))
            .await
            .map_err(|_| Error::Timeout(self.fetch_timeout))?
    }
}

/// Build the match report from the last two rows, if the last row signals.
pub fn match_from_table(symbol: &SymbolInfo, table: &IndicatorTable) -> Option<MatchResult> {
    let latest = table.latest()?;
    if !latest.signal {
        return None;
    }
    let previous = table.previous()?;

    Some(MatchResult {
        symbol: symbol.code.clone(),
        name: symbol.name.clone(),
        date: latest.bar.date.format("%Y-%m-%d").to_string(),
        close: round2(latest.bar.close),
        change_pct: round2((latest.change_ratio? - 1.0) * 100.0),
        volume_ratio: round2(latest.bar.volume / previous.bar.volume),
        turbulence_pct: round2(latest.oscillation_pct?),
        min_price_m: round2(latest.min_low_m?),
    })
}
