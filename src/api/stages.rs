//! Stage classification endpoints.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::{parse_tickers, render_summary_table, summary_rows};
use crate::types::{AnalysisOptions, BatchReport, ClassificationResult, MaOverlay, RuleSet};
use crate::AppState;

/// API response wrapper.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Serialize)]
pub struct ApiMeta {
    pub count: usize,
}

impl<T> ApiResponse<T> {
    fn new(data: T, count: usize) -> Self {
        Self {
            data,
            meta: ApiMeta { count },
        }
    }
}

/// Query parameters for stage endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct StagesQuery {
    /// Comma-separated tickers, e.g. "AAPL, MSFT, TSLA"
    pub tickers: Option<String>,
    /// Rule set: v1 (4-label) or v2 (8-label)
    pub rules: Option<String>,
    /// Include headline sentiment per ticker
    #[serde(default)]
    pub news: bool,
}

impl StagesQuery {
    /// Resolve the rule set, falling back to the configured default.
    pub fn rule_set(&self, default: RuleSet) -> Result<RuleSet> {
        match self.rules.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(name) => RuleSet::from_str(name)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown rule set: {}", name))),
        }
    }

    /// Parsed tickers. At least one is required.
    pub fn tickers(&self) -> Result<Vec<String>> {
        let tickers = parse_tickers(self.tickers.as_deref().unwrap_or_default());
        if tickers.is_empty() {
            return Err(AppError::BadRequest(
                "At least one ticker is required".to_string(),
            ));
        }
        Ok(tickers)
    }
}

/// Create the stages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_stages))
        .route("/summary", get(get_summary))
        .route("/:ticker", get(get_ticker_stage))
        .route("/:ticker/overlay", get(get_overlay))
}

/// Classify a batch of tickers.
async fn get_stages(
    State(state): State<AppState>,
    Query(query): Query<StagesQuery>,
) -> Result<Json<ApiResponse<BatchReport>>> {
    let tickers = query.tickers()?;
    let options = AnalysisOptions {
        rule_set: query.rule_set(state.config.analysis.default_rule_set)?,
        include_news: query.news,
    };

    let report = state.aggregator.run(&tickers, options).await;
    let count = report.results.len();
    Ok(Json(ApiResponse::new(report, count)))
}

/// Classify a batch and render the summary as a text table.
async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<StagesQuery>,
) -> Result<impl IntoResponse> {
    let tickers = query.tickers()?;
    let rule_set = query.rule_set(state.config.analysis.default_rule_set)?;

    let results = state.aggregator.classify_batch(&tickers, rule_set).await;
    let table = render_summary_table(&summary_rows(&results));

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], table))
}

/// Classify a single ticker.
async fn get_ticker_stage(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<StagesQuery>,
) -> Result<Json<ApiResponse<ClassificationResult>>> {
    let rule_set = query.rule_set(state.config.analysis.default_rule_set)?;
    let result = state.aggregator.classify_ticker(&ticker, rule_set).await;
    Ok(Json(ApiResponse::new(result, 1)))
}

/// Close and moving averages per bar, for charting.
async fn get_overlay(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<Vec<MaOverlay>>>> {
    let points = state.aggregator.overlay(&ticker).await?;
    let count = points.len();
    Ok(Json(ApiResponse::new(points, count)))
}
