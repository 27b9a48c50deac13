use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::Config;
use engine::{EastmoneyClient, Scheduler, Screener, SymbolEvaluator};
use scoring::{Enricher, ScoringConfig, ScoringFileConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(
        port = cfg.port,
        workers = cfg.max_workers,
        fetch_timeout = ?cfg.fetch_timeout,
        "Screener starting"
    );

    let default_scoring = match &cfg.scoring_config_path {
        Some(path) => ScoringFileConfig::load(path)
            .with_context(|| format!("loading scoring config from '{path}'"))?
            .resolve(),
        None => ScoringConfig::default(),
    };
    info!(
        pe_max = default_scoring.pe_max,
        market_cap_min = default_scoring.market_cap_min,
        require_profit = default_scoring.require_profit,
        "Scoring defaults"
    );

    // ── Data sources ──────────────────────────────────────────────────────────
    let eastmoney = Arc::new(EastmoneyClient::from_config(&cfg));

    // ── Pipeline ──────────────────────────────────────────────────────────────
    let evaluator = SymbolEvaluator::new(eastmoney.clone(), cfg.fetch_timeout);
    let scheduler = Scheduler::new(Arc::new(evaluator), cfg.max_workers);
    let enricher = Enricher::new(eastmoney.clone(), cfg.fundamentals_timeout);
    let screener = Screener::new(scheduler, eastmoney, enricher, default_scoring);

    // ── HTTP API ──────────────────────────────────────────────────────────────
    let state = api::AppState::new(Arc::new(screener));
    api::serve(state, cfg.port, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    })
    .await
    .context("API server failed")?;

    info!("Screener stopped");
    Ok(())
}
