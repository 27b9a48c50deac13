use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use common::{Bar, Error, FetchWindow, MarketDataSource, Result};

use super::{secid, EastmoneyClient};

/// Daily klines.
const KLT_DAILY: &str = "101";
/// Forward-adjusted prices (前复权).
const FQT_FORWARD: &str = "1";

#[async_trait]
impl MarketDataSource for EastmoneyClient {
    async fn daily_bars(&self, symbol: &str, window: FetchWindow) -> Result<Vec<Bar>> {
        let params = [
            ("secid", secid(symbol)),
            ("klt", KLT_DAILY.to_string()),
            ("fqt", FQT_FORWARD.to_string()),
            ("beg", window.start.format("%Y%m%d").to_string()),
            ("end", window.end.format("%Y%m%d").to_string()),
            ("fields1", "f1,f2,f3,f4,f5,f6".to_string()),
            ("fields2", "f51,f52,f53,f54,f55,f56".to_string()),
        ];
        let resp: KlineResponse = self.get_json(&self.kline_url, &params, self.fetch_timeout).await?;

        if resp.rc != 0 {
            return Err(Error::DataSource(format!("kline rc={} for {symbol}", resp.rc)));
        }

        let lines = resp.data.and_then(|d| d.klines).unwrap_or_default();
        Ok(parse_klines(&lines))
    }
}

/// Parse `date,open,close,high,low,volume,...` rows into bars sorted by
/// date. Malformed rows are skipped; for a repeated date the later row wins.
pub fn parse_klines(lines: &[String]) -> Vec<Bar> {
    let mut bars: Vec<Bar> = lines
        .iter()
        .filter_map(|line| {
            let bar = parse_line(line);
            if bar.is_none() {
                warn!(line = %line, "Invalid kline row, skipping");
            }
            bar
        })
        .collect();

    bars.sort_by_key(|b| b.date);
    bars.dedup_by(|later, earlier| {
        if later.date == earlier.date {
            *earlier = *later;
            true
        } else {
            false
        }
    });
    bars
}

fn parse_line(line: &str) -> Option<Bar> {
    let mut parts = line.split(',').map(str::trim);
    let date = NaiveDate::parse_from_str(parts.next()?, "%Y-%m-%d").ok()?;
    let mut num = || parts.next()?.parse::<f64>().ok().filter(|v| v.is_finite());

    let open = num()?;
    let close = num()?;
    let high = num()?;
    let low = num()?;
    let volume = num()?;

    Some(Bar {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

#[derive(Debug, Deserialize)]
struct KlineResponse {
    rc: i32,
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    klines: Option<Vec<String>>,
}
