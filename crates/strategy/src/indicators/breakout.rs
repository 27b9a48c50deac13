//! Bottom breakout ("底部暴力K线") pattern.
//!
//! A bar matches when price sits in a bottom zone, the bar is a strong
//! bullish candle, the three bars before it were quiet, and volume jumps
//! at least `VOLUME_MULTIPLE` times over the previous bar.
//!
//! State is carried forward bar by bar; every derived value only looks at
//! the current and earlier bars.
use common::Bar;
use serde::Serialize;

use crate::indicators::window::RollingExtreme;
use crate::params::{
    BOTTOM_LOOKBACK, LONG_RAISE, OSCILLATION_MAX_PCT, OSCILLATION_WINDOW, PRICE_RANGE,
    PULLBACK_WINDOW, TURBULENCE, VOLUME_MULTIPLE,
};

/// The four sub-conditions of the pattern for one bar.
/// `None` means the inputs were not yet available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Conditions {
    pub bottom_zone: Option<bool>,
    pub big_bullish: Option<bool>,
    pub sharp_pullback: Option<bool>,
    pub volume_surge: Option<bool>,
}

impl Conditions {
    /// True only when every sub-condition is known and true.
    pub fn all_met(&self) -> bool {
        [
            self.bottom_zone,
            self.big_bullish,
            self.sharp_pullback,
            self.volume_surge,
        ]
        .iter()
        .all(|c| *c == Some(true))
    }
}

/// One input bar plus everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub bar: Bar,
    /// Lowest low over the trailing `BOTTOM_LOOKBACK` bars.
    pub min_low_m: Option<f64>,
    pub near_bottom: Option<bool>,
    pub highest_high_p: Option<f64>,
    pub lowest_low_p: Option<f64>,
    /// Range of the trailing `OSCILLATION_WINDOW` bars, in percent of the low.
    pub oscillation_pct: Option<f64>,
    pub oscillation_ok: Option<bool>,
    /// Close over previous close.
    pub change_ratio: Option<f64>,
    pub prev3_high: Option<f64>,
    pub prev3_low: Option<f64>,
    pub prev3_oscillation: Option<f64>,
    /// Volume over previous volume.
    pub volume_ratio: Option<f64>,
    pub conditions: Conditions,
    pub signal: bool,
}

impl IndicatorRow {
    /// The bottom lookback window is full on this row.
    pub fn is_complete(&self) -> bool {
        self.min_low_m.is_some()
    }
}

/// Rolling state of the indicator engine. Feed bars oldest first.
#[derive(Debug, Clone)]
pub struct BreakoutState {
    low_m: RollingExtreme,
    high_p: RollingExtreme,
    low_p: RollingExtreme,
    high_3: RollingExtreme,
    low_3: RollingExtreme,
    prev: Option<Bar>,
}

impl Default for BreakoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakoutState {
    pub fn new() -> Self {
        Self {
            low_m: RollingExtreme::min(BOTTOM_LOOKBACK),
            high_p: RollingExtreme::max(OSCILLATION_WINDOW),
            low_p: RollingExtreme::min(OSCILLATION_WINDOW),
            high_3: RollingExtreme::max(PULLBACK_WINDOW),
            low_3: RollingExtreme::min(PULLBACK_WINDOW),
            prev: None,
        }
    }

    /// Advance by one bar and return its derived row.
    pub fn next(&mut self, bar: Bar) -> IndicatorRow {
        // Bottom zone
        let min_low_m = self.low_m.push(bar.low);
        let near_bottom = min_low_m.map(|m| bar.low <= m * PRICE_RANGE);

        let highest_high_p = self.high_p.push(bar.high);
        let lowest_low_p = self.low_p.push(bar.low);
        let oscillation_pct = highest_high_p
            .zip(lowest_low_p)
            .and_then(|(h, l)| finite((h - l) / l * 100.0));
        let oscillation_ok = oscillation_pct.map(|pct| pct <= OSCILLATION_MAX_PCT);
        let bottom_zone = either(near_bottom, oscillation_ok);

        // Big bullish candle
        let change_ratio = self.prev.and_then(|p| finite(bar.close / p.close));
        let big_bullish = change_ratio.map(|r| r > LONG_RAISE && bar.close > bar.open);

        // Quiet range over the bars before this one
        let prev3_high = self.high_3.value();
        let prev3_low = self.low_3.value();
        self.high_3.push(bar.high);
        self.low_3.push(bar.low);
        let prev3_oscillation = prev3_high
            .zip(prev3_low)
            .and_then(|(h, l)| finite(h / l));
        let sharp_pullback = prev3_oscillation.map(|r| r < TURBULENCE);

        // Volume surge
        let volume_ratio = self.prev.and_then(|p| finite(bar.volume / p.volume));
        let volume_surge = volume_ratio.map(|r| r >= VOLUME_MULTIPLE);

        self.prev = Some(bar);

        let conditions = Conditions {
            bottom_zone,
            big_bullish,
            sharp_pullback,
            volume_surge,
        };

        IndicatorRow {
            bar,
            min_low_m,
            near_bottom,
            highest_high_p,
            lowest_low_p,
            oscillation_pct,
            oscillation_ok,
            change_ratio,
            prev3_high,
            prev3_low,
            prev3_oscillation,
            volume_ratio,
            conditions,
            signal: min_low_m.is_some() && conditions.all_met(),
        }
    }
}

/// Derived rows for a whole series, one per input bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorTable {
    rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    pub fn from_bars(bars: &[Bar]) -> Self {
        let mut state = BreakoutState::new();
        Self {
            rows: bars.iter().map(|&bar| state.next(bar)).collect(),
        }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// The row before the latest one.
    pub fn previous(&self) -> Option<&IndicatorRow> {
        self.rows.len().checked_sub(2).map(|i| &self.rows[i])
    }
}

/// Three-valued OR: known true wins over unknown.
fn either(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
