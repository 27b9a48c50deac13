//! Eastmoney public HTTP endpoints for A-share data.
//!
//! One client serves all three collaborators: daily klines, the listed
//! symbol universe, and the quote snapshot used for fundamentals.
mod fundamentals;
mod kline;
mod universe;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use common::{Config, Error, Result};

pub use fundamentals::parse_fundamentals;
pub use kline::parse_klines;
pub use universe::{parse_listing, ListResponse};

/// REST client for the Eastmoney quote APIs.
///
/// Timeouts are set per request: kline and listing calls use the fetch
/// bound, quote snapshots use their own (usually longer) bound.
pub struct EastmoneyClient {
    http: Client,
    kline_url: String,
    quote_url: String,
    list_url: String,
    fetch_timeout: Duration,
    quote_timeout: Duration,
}

impl EastmoneyClient {
    pub fn new(
        kline_url: impl Into<String>,
        quote_url: impl Into<String>,
        list_url: impl Into<String>,
        fetch_timeout: Duration,
    ) -> Self {
        let http = Client::builder()
            .use_rustls_tls()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            kline_url: kline_url.into(),
            quote_url: quote_url.into(),
            list_url: list_url.into(),
            fetch_timeout,
            quote_timeout: fetch_timeout,
        }
    }

    /// Bound quote snapshot requests separately from kline fetches.
    pub fn with_quote_timeout(mut self, timeout: Duration) -> Self {
        self.quote_timeout = timeout;
        self
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.kline_url.as_str(),
            cfg.quote_url.as_str(),
            cfg.list_url.as_str(),
            cfg.fetch_timeout,
        )
        .with_quote_timeout(cfg.fundamentals_timeout)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        base: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T> {
        let url = Url::parse_with_params(base, params)
            .map_err(|e| Error::Config(format!("invalid endpoint '{base}': {e}")))?;

        debug!(%url, "Eastmoney request");
        let resp = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Http(format!("HTTP {status}: {body}")));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Eastmoney `secid` for a bare or suffixed code: Shanghai codes start
/// with 5, 6 or 9 and use market 1, everything else market 0.
pub fn secid(symbol: &str) -> String {
    let code = symbol.split('.').next().unwrap_or(symbol).trim();
    let market = match code.chars().next() {
        Some('5') | Some('6') | Some('9') => 1,
        _ => 0,
    };
    format!("{market}.{code}")
}
