//! Batch stage classification.
//!
//! Runs the calculator and classifier for each requested ticker, converting
//! every per-ticker failure into that ticker's diagnostic so one bad symbol
//! never affects the rest of the batch.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::services::classifier::classify;
use crate::services::moving_average::overlay;
use crate::services::{NewsSentimentScorer, SeriesCache};
use crate::sources::PriceHistoryProvider;
use crate::types::{
    AnalysisOptions, BatchReport, ClassificationResult, MaOverlay, PriceSeries, RuleSet,
    StageEvidence, SummaryRow,
};
use futures_util::stream::{self, StreamExt};
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, warn};

/// Split comma-separated tickers, trimming and upper-casing each.
///
/// Empty entries are dropped. Duplicates are kept.
pub fn parse_tickers(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Classifies tickers from their price history.
pub struct StageAggregator {
    prices: Arc<dyn PriceHistoryProvider>,
    news: Option<Arc<NewsSentimentScorer>>,
    cache: SeriesCache,
    config: AnalysisConfig,
}

impl StageAggregator {
    pub fn new(prices: Arc<dyn PriceHistoryProvider>, config: AnalysisConfig) -> Self {
        Self {
            prices,
            news: None,
            cache: SeriesCache::new(config.price_cache_ttl()),
            config,
        }
    }

    /// Attach a sentiment scorer for requests that include news.
    pub fn with_news(mut self, scorer: Arc<NewsSentimentScorer>) -> Self {
        self.news = Some(scorer);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn news_scorer(&self) -> Option<&Arc<NewsSentimentScorer>> {
        self.news.as_ref()
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Fetch a ticker's series through the cache, bounded by the request timeout.
    pub async fn fetch_series(&self, ticker: &str) -> Result<Arc<PriceSeries>, AnalysisError> {
        let lookback = self.config.lookback_days;
        if let Some(series) = self.cache.get(ticker, lookback) {
            debug!("Using cached series for {}", ticker);
            return Ok(series);
        }

        let timeout = self.config.request_timeout();
        let series = tokio::time::timeout(timeout, self.prices.fetch_daily(ticker, lookback))
            .await
            .map_err(|_| {
                AnalysisError::external(format!(
                    "price request timed out after {}s",
                    timeout.as_secs()
                ))
            })??;

        let series = Arc::new(series);
        self.cache.insert(lookback, series.clone());
        Ok(series)
    }

    async fn evaluate_ticker(&self, ticker: &str) -> Result<StageEvidence, AnalysisError> {
        let series = self.fetch_series(ticker).await?;
        debug!("Fetched {} bars for {}", series.len(), ticker);
        StageEvidence::from_series(&series)
    }

    /// Classify one ticker. Never fails; failures become a diagnostic result.
    pub async fn classify_ticker(&self, ticker: &str, rule_set: RuleSet) -> ClassificationResult {
        let ticker = ticker.trim().to_uppercase();

        match self.evaluate_ticker(&ticker).await {
            Ok(evidence) => {
                let stage = classify(rule_set, &evidence);
                debug!("{} classified as {}", ticker, stage);
                ClassificationResult::classified(ticker, stage, evidence)
            }
            Err(e) => {
                match &e {
                    AnalysisError::NoData | AnalysisError::InsufficientData => {
                        debug!("{}: {}", ticker, e)
                    }
                    _ => warn!("Error processing {}: {}", ticker, e),
                }
                ClassificationResult::diagnostic(ticker, &e)
            }
        }
    }

    /// Classify tickers concurrently. One result per input ticker, in input order.
    pub async fn classify_batch(
        &self,
        tickers: &[String],
        rule_set: RuleSet,
    ) -> Vec<ClassificationResult> {
        stream::iter(tickers.iter().cloned())
            .map(|ticker| async move { self.classify_ticker(&ticker, rule_set).await })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await
    }

    /// Classify a batch and attach the summary table and, if asked, news sentiment.
    pub async fn run(&self, tickers: &[String], options: AnalysisOptions) -> BatchReport {
        let results = self.classify_batch(tickers, options.rule_set).await;

        let news = match (&self.news, options.include_news) {
            (Some(scorer), true) => Some(scorer.score_batch(tickers).await),
            (None, true) => {
                warn!("News requested but no sentiment scorer is configured");
                None
            }
            _ => None,
        };

        BatchReport {
            rule_set: options.rule_set,
            summary: summary_rows(&results),
            results,
            news,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Per-bar close and moving averages for one ticker.
    pub async fn overlay(&self, ticker: &str) -> Result<Vec<MaOverlay>, AnalysisError> {
        let series = self.fetch_series(&ticker.trim().to_uppercase()).await?;
        if series.is_empty() {
            return Err(AnalysisError::NoData);
        }
        Ok(overlay(&series))
    }
}

/// Flatten results into summary table rows.
pub fn summary_rows(results: &[ClassificationResult]) -> Vec<SummaryRow> {
    results.iter().map(SummaryRow::from).collect()
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// Render rows as a fixed-width text table.
pub fn render_summary_table(rows: &[SummaryRow]) -> String {
    const HEADERS: [&str; 10] = [
        "Ticker", "Stage", "MA_5", "MA_8", "MA_13", "MA_50", "MA_55", "MA_60", "Short Slope",
        "Long Slope",
    ];

    let table: Vec<[String; 10]> = rows
        .iter()
        .map(|r| {
            [
                r.ticker.clone(),
                r.stage.clone(),
                cell(r.ma_5),
                cell(r.ma_8),
                cell(r.ma_13),
                cell(r.ma_50),
                cell(r.ma_55),
                cell(r.ma_60),
                cell(r.short_slope),
                cell(r.long_slope),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &table {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let mut out = String::new();
    let mut write_row = |values: &[String]| {
        let line: Vec<String> = values
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (value, width))| {
                let pad = width.saturating_sub(value.chars().count());
                // Text columns left-aligned, numbers right-aligned
                if i < 2 {
                    format!("{}{}", value, " ".repeat(pad))
                } else {
                    format!("{}{}", " ".repeat(pad), value)
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    };

    write_row(&HEADERS.map(String::from));
    for row in &table {
        write_row(row);
    }

    out
}
