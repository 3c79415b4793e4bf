//! External data sources: price history, news search and translation.

pub mod newsapi;
pub mod translate;
pub mod yahoo;

pub use newsapi::NewsApiClient;
pub use translate::{LibreTranslateClient, PassThroughTranslator};
pub use yahoo::YahooFinanceClient;

use crate::error::AnalysisError;
use crate::types::{Article, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Historical daily price bars for a ticker.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetch daily bars covering the last `lookback_days` calendar days.
    ///
    /// Unknown symbols yield an empty series rather than an error.
    async fn fetch_daily(
        &self,
        ticker: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, AnalysisError>;
}

/// Search for recent news articles.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Articles mentioning `query` published since `from`, most recent first.
    async fn search(
        &self,
        query: &str,
        from: DateTime<Utc>,
        language: &str,
    ) -> Result<Vec<Article>, AnalysisError>;
}

/// Translate text to a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> Result<String, AnalysisError>;
}
