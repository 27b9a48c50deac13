use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use common::{Error, Fundamentals, FundamentalsSource, Result};

use super::{secid, EastmoneyClient};

/// Quote snapshot fields: code, name, total market cap (yuan), net
/// profit (yuan), dynamic P/E, TTM P/E.
const QUOTE_FIELDS: &str = "f57,f58,f116,f105,f162,f164";

/// Yuan per 亿.
const YUAN_PER_YI: f64 = 100_000_000.0;

/// Exact field names first, then fuzzy matches: `keywords` are CJK
/// substrings, `tokens` must equal a whole ASCII word of the field name
/// (so `pe` hits `pe_ratio` but not `type`).
struct Lookup {
    keys: &'static [&'static str],
    keywords: &'static [&'static str],
    tokens: &'static [&'static str],
}

const PE: Lookup = Lookup {
    keys: &["pe_ttm", "peTTM", "市盈率TTM", "市盈率(TTM)", "f164", "f162"],
    keywords: &["市盈率"],
    tokens: &["pe"],
};

const MARKET_CAP: Lookup = Lookup {
    keys: &["total_mv", "totalMarketCap", "总市值", "f116"],
    keywords: &["市值"],
    tokens: &["mv", "cap"],
};

const NET_PROFIT: Lookup = Lookup {
    keys: &["net_profit", "netProfit", "归母净利润", "净利润", "f105"],
    keywords: &["净利润"],
    tokens: &["profit"],
};

#[async_trait]
impl FundamentalsSource for EastmoneyClient {
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let params = [
            ("secid", secid(symbol)),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fields", QUOTE_FIELDS.to_string()),
        ];
        let resp: QuoteResponse = self.get_json(&self.quote_url, &params, self.quote_timeout).await?;
        let data = resp
            .data
            .ok_or_else(|| Error::DataSource(format!("no quote data for {symbol}")))?;

        let mut f = parse_fundamentals(&data);
        // Eastmoney reports market cap in yuan.
        f.market_cap = f.market_cap.map(|yuan| yuan / YUAN_PER_YI);
        Ok(f)
    }
}

/// Pull P/E, market cap and net profit out of a loosely shaped record.
/// Each metric tries its known field names first, then any field whose
/// name matches one of its keywords or tokens.
pub fn parse_fundamentals(record: &Map<String, Value>) -> Fundamentals {
    Fundamentals {
        pe_ttm: pick(record, &PE),
        market_cap: pick(record, &MARKET_CAP),
        net_profit: pick(record, &NET_PROFIT),
    }
}

fn pick(record: &Map<String, Value>, lookup: &Lookup) -> Option<f64> {
    lookup
        .keys
        .iter()
        .find_map(|k| record.get(*k).and_then(number))
        .or_else(|| {
            record
                .iter()
                .find_map(|(name, value)| lookup.matches(name).then(|| number(value)).flatten())
        })
}

impl Lookup {
    fn matches(&self, name: &str) -> bool {
        if self.keywords.iter().any(|kw| name.contains(kw)) {
            return true;
        }
        let lower = name.to_ascii_lowercase();
        lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| self.tokens.contains(&word))
    }
}

/// Numbers pass through; strings are parsed after stripping thousands
/// separators and a trailing percent sign. Placeholders like "-" are `None`.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .replace(',', "")
            .parse::<f64>()
            .ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    data: Option<Map<String, Value>>,
}
