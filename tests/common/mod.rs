//! In-memory providers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stagewatch::config::AnalysisConfig;
use stagewatch::sources::{NewsProvider, PriceHistoryProvider, Translator};
use stagewatch::{AnalysisError, Article, PriceSeries};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const START_MS: i64 = 1_700_000_000_000;

/// 90 closes rising by 1 from 100.
pub fn rising() -> Vec<f64> {
    (0..90).map(|i| 100.0 + i as f64).collect()
}

/// 90 closes falling by 1 from 200.
pub fn falling() -> Vec<f64> {
    (0..90).map(|i| 200.0 - i as f64).collect()
}

/// 90 identical closes.
pub fn flat() -> Vec<f64> {
    vec![50.0; 90]
}

/// Price provider backed by a map of ticker to closes or error.
#[derive(Default)]
pub struct StubPrices {
    series: HashMap<String, Result<Vec<f64>, AnalysisError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ticker: &str, closes: Vec<f64>) -> Self {
        self.series.insert(ticker.to_string(), Ok(closes));
        self
    }

    pub fn failing(mut self, ticker: &str, error: AnalysisError) -> Self {
        self.series.insert(ticker.to_string(), Err(error));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceHistoryProvider for StubPrices {
    async fn fetch_daily(
        &self,
        ticker: &str,
        _lookback_days: u32,
    ) -> Result<PriceSeries, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.series.get(ticker) {
            Some(Ok(closes)) => Ok(PriceSeries::from_closes(ticker, START_MS, closes)),
            Some(Err(e)) => Err(e.clone()),
            // Unknown symbols behave like Yahoo: an empty series
            None => Ok(PriceSeries::empty(ticker)),
        }
    }
}

/// News provider backed by a map of ticker to articles or error.
#[derive(Default)]
pub struct StubNews {
    articles: HashMap<String, Result<Vec<Article>, AnalysisError>>,
    delay: Option<Duration>,
}

impl StubNews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ticker: &str, titles: &[&str]) -> Self {
        let articles = titles
            .iter()
            .enumerate()
            .map(|(i, title)| Article {
                title: title.to_string(),
                url: format!("https://news.example.com/{}/{}", ticker.to_lowercase(), i),
                // Later entries are older
                published_at: Some(START_MS - i as i64 * 3_600_000),
            })
            .collect();
        self.articles.insert(ticker.to_string(), Ok(articles));
        self
    }

    pub fn with_articles(mut self, ticker: &str, articles: Vec<Article>) -> Self {
        self.articles.insert(ticker.to_string(), Ok(articles));
        self
    }

    pub fn failing(mut self, ticker: &str, error: AnalysisError) -> Self {
        self.articles.insert(ticker.to_string(), Err(error));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl NewsProvider for StubNews {
    async fn search(
        &self,
        query: &str,
        _from: DateTime<Utc>,
        _language: &str,
    ) -> Result<Vec<Article>, AnalysisError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.articles
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Translator backed by a phrase map. Unknown phrases fail.
#[derive(Default)]
pub struct StubTranslator {
    phrases: HashMap<String, String>,
    delay: Option<Duration>,
}

impl StubTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, from: &str, to: &str) -> Self {
        self.phrases.insert(from.to_string(), to.to_string());
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(&self, text: &str, _target: &str) -> Result<String, AnalysisError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.phrases
            .get(text)
            .cloned()
            .ok_or_else(|| AnalysisError::external("translation service unavailable"))
    }
}

pub fn analysis_config() -> AnalysisConfig {
    AnalysisConfig {
        request_timeout_secs: 1,
        max_concurrency: 4,
        ..AnalysisConfig::default()
    }
}
