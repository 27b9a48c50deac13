use async_trait::async_trait;

use crate::{Bar, FetchWindow, Fundamentals, Result, SymbolInfo};

/// Daily price history provider.
///
/// Implementations may return an empty series; callers treat that the same
/// as too little history. Errors are never surfaced past the Symbol Evaluator.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily bars for `symbol` within `window`, oldest first.
    async fn daily_bars(&self, symbol: &str, window: FetchWindow) -> Result<Vec<Bar>>;
}

/// Source of the full list of symbols to scan when the caller names none.
#[async_trait]
pub trait SymbolUniverse: Send + Sync {
    async fn list_symbols(&self) -> Result<Vec<SymbolInfo>>;
}

/// Latest P/E, market cap and net profit for a symbol.
///
/// Fields the provider cannot find or parse come back as `None`.
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals>;
}
