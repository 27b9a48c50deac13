use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use engine::{MatchEntry, ScanOptions, ScanReport};
use scoring::{ScoringConfig, ScoringOverrides};

use crate::AppState;

pub fn analyze_router() -> Router<AppState> {
    Router::new()
        .route("/api/stock-analysis", post(analyze))
        .route("/analyze", post(analyze))
}

/// `symbols` may be one delimited string or a list of codes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SymbolsField {
    Text(String),
    List(Vec<String>),
}

impl SymbolsField {
    pub fn joined(self) -> String {
        match self {
            SymbolsField::Text(s) => s,
            SymbolsField::List(items) => items.join(","),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub strategy: String,
    /// Empty or absent scans the whole universe.
    #[serde(default)]
    pub symbols: Option<SymbolsField>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub scoring: Option<ScoringOverrides>,
    /// Defaults to true.
    #[serde(default)]
    pub score: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub matched: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub strategy: String,
    pub matches: Vec<MatchEntry>,
    pub stats: Stats,
    pub scoring: ScoringConfig,
    pub score_enabled: bool,
}

impl AnalyzeResponse {
    fn from_report(strategy: String, report: ScanReport) -> Self {
        Self {
            strategy,
            stats: Stats {
                total: report.total,
                matched: report.matches.len(),
            },
            matches: report.matches,
            scoring: report.scoring,
            score_enabled: report.score_enabled,
        }
    }
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Json<AnalyzeResponse> {
    let AnalyzeRequest {
        strategy,
        symbols,
        notes,
        scoring,
        score,
    } = req;

    let symbols = symbols.map(SymbolsField::joined).unwrap_or_default();
    let options = ScanOptions {
        score: score.unwrap_or(true),
        scoring: scoring.unwrap_or_default(),
    };
    let today = (state.clock)();

    let span = info_span!("scan", scan_id = %Uuid::new_v4(), strategy = %strategy);
    let report = async {
        if let Some(notes) = notes.as_deref().filter(|n| !n.trim().is_empty()) {
            debug!(notes, "Request notes");
        }
        let report = state.screener.scan(&symbols, today, &options).await;
        info!(
            total = report.total,
            matched = report.matches.len(),
            score_enabled = report.score_enabled,
            "Scan complete"
        );
        report
    }
    .instrument(span)
    .await;

    Json(AnalyzeResponse::from_report(strategy, report))
}
