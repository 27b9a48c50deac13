//! Fixed parameters of the bottom breakout pattern.
//!
//! These are part of the strategy's identity and are not configurable.

/// N: minimum day-over-day volume multiple.
pub const VOLUME_MULTIPLE: f64 = 4.0;

/// M: lookback, in bars, for the bottom (lowest low) detection.
pub const BOTTOM_LOOKBACK: usize = 120;

/// P: window, in bars, for the oscillation range.
pub const OSCILLATION_WINDOW: usize = 30;

/// P reused as the oscillation bound in percent. Changing either value
/// changes the strategy.
pub const OSCILLATION_MAX_PCT: f64 = OSCILLATION_WINDOW as f64;

/// Low may sit at most this multiple above the M-bar lowest low.
pub const PRICE_RANGE: f64 = 1.05;

/// Close-over-close ratio a bullish bar must exceed.
pub const LONG_RAISE: f64 = 1.05;

/// High/low ratio of the prior bars must stay under this.
pub const TURBULENCE: f64 = 1.03;

/// Number of prior bars checked for a quiet range before the breakout.
pub const PULLBACK_WINDOW: usize = 3;

/// Bars a series needs before any indicator is computed.
pub const MIN_HISTORY: usize = BOTTOM_LOOKBACK + 5;
