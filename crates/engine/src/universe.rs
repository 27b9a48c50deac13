use std::collections::HashSet;

use tracing::{info, warn};

use common::{SymbolInfo, SymbolUniverse};

/// Shanghai and Shenzhen main board code prefixes.
pub const LISTING_PREFIXES: [&str; 2] = ["60", "00"];

/// Scanned when the universe source is unavailable.
pub const FALLBACK_UNIVERSE: [(&str, &str); 5] = [
    ("600519", "贵州茅台"),
    ("000858", "五粮液"),
    ("601318", "中国平安"),
    ("600036", "招商银行"),
    ("000333", "美的集团"),
];

pub fn fallback_universe() -> Vec<SymbolInfo> {
    FALLBACK_UNIVERSE
        .iter()
        .map(|(code, name)| SymbolInfo::new(*code, *name))
        .collect()
}

/// Keep main board listings and drop flagged (ST) or delisting (退) issuers.
pub fn filter_universe(symbols: Vec<SymbolInfo>) -> Vec<SymbolInfo> {
    symbols
        .into_iter()
        .filter(|s| LISTING_PREFIXES.iter().any(|p| s.code.starts_with(p)))
        .filter(|s| !s.name.as_deref().is_some_and(is_flagged))
        .collect()
}

fn is_flagged(name: &str) -> bool {
    name.to_uppercase().contains("ST") || name.contains('退')
}

/// Full symbol list from `source`, filtered. Falls back to the static list
/// when the source errors or nothing survives the filter.
pub async fn load_universe(source: &dyn SymbolUniverse) -> Vec<SymbolInfo> {
    match source.list_symbols().await {
        Ok(listed) => {
            let raw = listed.len();
            let kept = filter_universe(listed);
            if kept.is_empty() {
                warn!(raw, "Universe empty after filtering, using fallback list");
                return fallback_universe();
            }
            info!(raw, kept = kept.len(), "Universe loaded");
            kept
        }
        Err(e) => {
            warn!(error = %e, "Universe source unavailable, using fallback list");
            fallback_universe()
        }
    }
}

/// Split a free-form symbol list on commas (ASCII or full-width),
/// semicolons and whitespace. Duplicates keep their first position.
pub fn parse_symbols(raw: &str) -> Vec<SymbolInfo> {
    let mut seen = HashSet::new();
    raw.split(|c: char| c == ',' || c == '，' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(SymbolInfo::code)
        .collect()
}
