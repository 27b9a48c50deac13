use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One trading day of price and volume data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A symbol code together with its display name, if one is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub code: String,
    pub name: Option<String>,
}

impl SymbolInfo {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: Some(name.into()),
        }
    }

    /// A bare code with no display name, as parsed from a request.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
        }
    }
}

/// Inclusive calendar-date range handed to the market data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    /// Calendar days fetched per trading day needed, covering weekends and holidays.
    pub const CALENDAR_BUFFER: f64 = 1.8;

    /// Window ending at `today` that is wide enough to hold `trading_days` bars.
    pub fn trailing(today: NaiveDate, trading_days: usize) -> Self {
        let days = (trading_days as f64 * Self::CALENDAR_BUFFER).ceil() as i64;
        Self {
            start: today - Duration::days(days),
            end: today,
        }
    }

    pub fn calendar_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// A symbol whose latest bar matched the breakout pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub symbol: String,
    pub name: Option<String>,
    /// Date of the matching bar, `YYYY-MM-DD`.
    pub date: String,
    pub close: f64,
    pub change_pct: f64,
    pub volume_ratio: f64,
    pub turbulence_pct: f64,
    pub min_price_m: f64,
}

/// Raw fundamentals as reported by the provider. Market cap is in the
/// provider's own unit; the scorer normalises it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ttm: Option<f64>,
    pub market_cap: Option<f64>,
    pub net_profit: Option<f64>,
}

/// Round to two decimals, the precision every reported metric uses.
/// Exact ties go to the even neighbour (4.125 -> 4.12).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
