pub mod routes;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use chrono::{Duration, NaiveDate, Utc};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use engine::Screener;

/// Returns the trading calendar date a scan runs as of.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub screener: Arc<Screener>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(screener: Arc<Screener>) -> Self {
        Self {
            screener,
            clock: Arc::new(market_today),
        }
    }
}

/// Today's date in China Standard Time (UTC+8), where the market trades.
pub fn market_today() -> NaiveDate {
    (Utc::now() + Duration::hours(8)).date_naive()
}

/// Full router with CORS and gzip layers.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::analyze_router())
        .merge(routes::health_router())
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new())
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "Screener API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
