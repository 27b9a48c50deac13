mod analyze;
mod health;

pub use analyze::{analyze_router, AnalyzeRequest, AnalyzeResponse, Stats, SymbolsField};
pub use health::health_router;
