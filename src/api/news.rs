//! News sentiment endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::types::NewsSentiment;
use crate::AppState;

/// Create the news router.
pub fn router() -> Router<AppState> {
    Router::new().route("/:ticker", get(get_sentiment))
}

/// Headline sentiment for one ticker.
async fn get_sentiment(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<NewsSentiment>> {
    let scorer = state
        .aggregator
        .news_scorer()
        .ok_or_else(|| AppError::Internal("News sentiment is not configured".to_string()))?;

    Ok(Json(scorer.score_ticker(&ticker).await))
}
