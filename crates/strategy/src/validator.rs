use common::Bar;
use thiserror::Error;

use crate::params::MIN_HISTORY;

/// Why a series cannot be evaluated. Both cases are ordinary no-match
/// outcomes, not failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesRejected {
    #[error("insufficient history: have {have} bars, need {need}")]
    InsufficientHistory { have: usize, need: usize },

    #[error("bars not strictly ascending by date at index {index}")]
    OutOfOrder { index: usize },
}

/// A daily series long enough for every rolling window, strictly ascending
/// by date. Only `validate` constructs one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSeries(Vec<Bar>);

impl ValidSeries {
    pub fn bars(&self) -> &[Bar] {
        &self.0
    }
}

/// Accept `bars` unchanged if it holds at least `MIN_HISTORY` bars in
/// strictly ascending date order.
pub fn validate(bars: Vec<Bar>) -> Result<ValidSeries, SeriesRejected> {
    if bars.len() < MIN_HISTORY {
        return Err(SeriesRejected::InsufficientHistory {
            have: bars.len(),
            need: MIN_HISTORY,
        });
    }

    if let Some(pos) = bars.windows(2).position(|w| w[1].date <= w[0].date) {
        return Err(SeriesRejected::OutOfOrder { index: pos + 1 });
    }

    Ok(ValidSeries(bars))
}
