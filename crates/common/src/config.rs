use std::time::Duration;

pub const DEFAULT_KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
pub const DEFAULT_QUOTE_URL: &str = "https://push2.eastmoney.com/api/qt/stock/get";
pub const DEFAULT_LIST_URL: &str = "https://push2.eastmoney.com/api/qt/clist/get";

/// All configuration loaded from environment variables at startup.
/// Every variable is optional; a present but unparseable value causes an
/// immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Pipeline
    pub max_workers: usize,
    pub fetch_timeout: Duration,
    pub fundamentals_timeout: Duration,

    // Scoring defaults file (TOML)
    pub scoring_config_path: Option<String>,

    // Data source endpoints
    pub kline_url: String,
    pub quote_url: String,
    pub list_url: String,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Config {
            port: parsed_env("SCREENER_PORT").unwrap_or(8000),
            max_workers: parsed_env("MAX_WORKERS").unwrap_or(8),
            fetch_timeout: Duration::from_secs(parsed_env("FETCH_TIMEOUT_SECS").unwrap_or(5)),
            fundamentals_timeout: Duration::from_secs(
                parsed_env("FUNDAMENTALS_TIMEOUT_SECS").unwrap_or(10),
            ),
            scoring_config_path: optional_env("SCORING_CONFIG_PATH"),
            kline_url: optional_env("EASTMONEY_KLINE_URL")
                .unwrap_or_else(|| DEFAULT_KLINE_URL.to_string()),
            quote_url: optional_env("EASTMONEY_QUOTE_URL")
                .unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string()),
            list_url: optional_env("EASTMONEY_LIST_URL")
                .unwrap_or_else(|| DEFAULT_LIST_URL.to_string()),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    optional_env(key).map(|raw| {
        raw.trim().parse::<T>().unwrap_or_else(|_| {
            panic!("Environment variable '{key}' has invalid value '{raw}'. Check your .env file.")
        })
    })
}
