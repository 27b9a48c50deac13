use std::sync::Arc;

use futures_util::{future, stream, StreamExt};
use tracing::{info, warn};

use common::{FetchWindow, MatchResult, SymbolInfo};

use crate::evaluator::SymbolEvaluator;

/// Default number of symbols evaluated at once.
pub const MAX_WORKERS: usize = 8;

/// Fans symbol evaluations out over a bounded pool of tasks.
///
/// Each evaluation runs in its own task; at most `workers` are in flight.
/// Results arrive in completion order. A task that panics is logged and
/// dropped like any other non-match.
pub struct Scheduler {
    evaluator: Arc<SymbolEvaluator>,
    workers: usize,
}

impl Scheduler {
    pub fn new(evaluator: Arc<SymbolEvaluator>, workers: usize) -> Self {
        Self {
            evaluator,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Evaluate every symbol and return only the matches. Waits for the
    /// whole batch.
    pub async fn run(&self, symbols: Vec<SymbolInfo>, window: FetchWindow) -> Vec<MatchResult> {
        let total = symbols.len();

        let matches: Vec<MatchResult> = stream::iter(symbols)
            .map(|symbol| {
                let evaluator = Arc::clone(&self.evaluator);
                tokio::spawn(async move { evaluator.evaluate(&symbol, window).await })
            })
            .buffer_unordered(self.workers)
            .filter_map(|joined| {
                future::ready(match joined {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(error = %e, "Evaluation task aborted");
                        None
                    }
                })
            })
            .collect()
            .await;

        info!(total, matched = matches.len(), workers = self.workers, "Batch complete");
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration as Days, NaiveDate};
    use common::{Bar, Error, MarketDataSource, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn breakout_series() -> Vec<Bar> {
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
            high: 11.1,
            low: 9.98,
            close: 11.0,
            volume: 5000.0,
        });
        bars
    }

    /// Codes starting with "M" match, "E" error, "P" panic, "S" hang;
    /// everything else returns a non-matching series.
    struct ScriptedSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataSource for ScriptedSource {
        async fn daily_bars(&self, symbol: &str, _window: FetchWindow) -> Result<Vec<Bar>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match symbol.chars().next() {
                Some('M') => Ok(breakout_series()),
                Some('E') => Err(Error::DataSource("no data".into())),
                Some('P') => panic!("malformed upstream payload"),
                Some('S') => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
                _ => Ok(breakout_series()[..100].to_vec()),
            }
        }
    }

    fn window() -> FetchWindow {
        FetchWindow::trailing(NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(), 125)
    }

    fn scheduler(source: Arc<ScriptedSource>, workers: usize) -> Scheduler {
        let evaluator = SymbolEvaluator::new(source, Duration::from_secs(5));
        Scheduler::new(Arc::new(evaluator), workers)
    }

    #[tokio::test]
    async fn collects_only_matches() {
        let source = Arc::new(ScriptedSource::new());
        let symbols = ["M1", "N1", "E1", "M2", "N2"]
            .iter()
            .map(|c| SymbolInfo::code(*c))
            .collect();

        let mut matches = scheduler(source, MAX_WORKERS).run(symbols, window()).await;
        matches.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        let codes: Vec<&str> = matches.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(codes, vec!["M1", "M2"]);
    }

    #[tokio::test]
    async fn never_exceeds_worker_bound() {
        let source = Arc::new(ScriptedSource::new());
        let symbols = (0..40).map(|i| SymbolInfo::code(format!("N{i}"))).collect();

        let matches = scheduler(Arc::clone(&source), 8).run(symbols, window()).await;
        assert!(matches.is_empty());
        let peak = source.peak.load(Ordering::SeqCst);
        assert!(peak <= 8, "peak concurrency {peak} exceeded bound");
        assert!(peak > 1, "batch ran serially");
    }

    #[tokio::test]
    async fn panicking_task_does_not_abort_batch() {
        let source = Arc::new(ScriptedSource::new());
        let symbols = vec![SymbolInfo::code("P1"), SymbolInfo::code("M1")];
        let matches = scheduler(source, 2).run(symbols, window()).await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].symbol, "M1");
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_fetch_is_bounded_by_timeout() {
        let source = Arc::new(ScriptedSource::new());
        let symbols = vec![SymbolInfo::code("S1"), SymbolInfo::code("M1")];
        let matches = scheduler(source, 2).run(symbols, window()).await;
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_returns_nothing() {
        let source = Arc::new(ScriptedSource::new());
        let matches = scheduler(source, 8).run(Vec::new(), window()).await;
        assert!(matches.is_empty());
    }
}
