pub mod eastmoney;
pub mod evaluator;
pub mod scheduler;
pub mod screener;
pub mod universe;

pub use eastmoney::EastmoneyClient;
pub use evaluator::{Evaluation, SymbolEvaluator};
pub use scheduler::{Scheduler, MAX_WORKERS};
pub use screener::{MatchEntry, ScanOptions, ScanReport, Screener};
pub use universe::{fallback_universe, filter_universe, load_universe, parse_symbols};
