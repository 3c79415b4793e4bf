use serde::{Deserialize, Serialize};

/// Daily OHLC bar. `time` is a unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Bar carrying only a close price, used when the source reports nothing else.
    pub fn from_close(time: i64, close: f64) -> Self {
        Self {
            time,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

/// Ordered daily bars for one ticker, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    /// Empty series, as returned for unknown or delisted symbols.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self::new(ticker, Vec::new())
    }

    /// Build a series from closes with one-day spacing starting at `start_ms`.
    pub fn from_closes(ticker: impl Into<String>, start_ms: i64, closes: &[f64]) -> Self {
        const DAY_MS: i64 = 86_400_000;
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar::from_close(start_ms + i as i64 * DAY_MS, close))
            .collect();
        Self::new(ticker, bars)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Close and moving averages at one bar, for chart overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaOverlay {
    pub time: i64,
    pub close: f64,
    pub ma_5: Option<f64>,
    pub ma_8: Option<f64>,
    pub ma_13: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_55: Option<f64>,
    pub ma_60: Option<f64>,
}
