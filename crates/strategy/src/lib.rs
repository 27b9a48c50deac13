pub mod indicators;
pub mod params;
pub mod validator;

pub use indicators::{BreakoutState, Conditions, IndicatorRow, IndicatorTable};
pub use validator::{validate, SeriesRejected, ValidSeries};

/// Run the indicator engine over a validated series.
pub fn compute(series: &ValidSeries) -> IndicatorTable {
    IndicatorTable::from_bars(series.bars())
}
