//! Yahoo Finance API client for historical stock data.
//!
//! Uses the unofficial chart API, which needs no API key.

use crate::error::AnalysisError;
use crate::sources::PriceHistoryProvider;
use crate::types::{PriceBar, PriceSeries};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

/// Turn a chart response into a series.
///
/// "Not Found" errors and missing results mean the symbol has no data and
/// yield an empty series. Bars without a positive close are skipped.
fn parse_chart(ticker: &str, data: YahooChartResponse) -> Result<PriceSeries, AnalysisError> {
    if let Some(error) = data.chart.error {
        if error.code.eq_ignore_ascii_case("not found") {
            return Ok(PriceSeries::empty(ticker));
        }
        return Err(AnalysisError::external(format!(
            "Yahoo API error: {} - {}",
            error.code, error.description
        )));
    }

    let result = match data.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => return Ok(PriceSeries::empty(ticker)),
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = match result.indicators.quote.into_iter().next() {
        Some(quote) => quote,
        None => return Ok(PriceSeries::empty(ticker)),
    };

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let close = match closes.get(i).copied().flatten() {
            Some(c) if c > 0.0 => c,
            _ => continue,
        };

        bars.push(PriceBar {
            time: timestamp * 1000,
            open: opens.get(i).copied().flatten().unwrap_or(close),
            high: highs.get(i).copied().flatten().unwrap_or(close),
            low: lows.get(i).copied().flatten().unwrap_or(close),
            close,
            volume: volumes.get(i).copied().flatten().unwrap_or(0) as f64,
        });
    }

    Ok(PriceSeries::new(ticker, bars))
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(timeout: Duration) -> Result<Self, AnalysisError> {
        Self::with_base_url(YAHOO_CHART_URL, timeout)
    }

    /// Create a client against a different chart endpoint.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    async fn fetch_daily(
        &self,
        ticker: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, AnalysisError> {
        let yahoo_symbol = normalize_yahoo_symbol(ticker);
        let url = format!(
            "{}/{}?range={}d&interval=1d&includePrePost=false",
            self.base_url, yahoo_symbol, lookback_days
        );

        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(PriceSeries::empty(ticker));
        }
        if !response.status().is_success() {
            return Err(AnalysisError::external(format!(
                "API error: {}",
                response.status()
            )));
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::external(format!("Parse error: {}", e)))?;

        parse_chart(ticker, data)
    }
}
