pub mod breakout;
pub mod window;

pub use breakout::{BreakoutState, Conditions, IndicatorRow, IndicatorTable};
pub use window::RollingExtreme;
