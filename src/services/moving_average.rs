//! Moving average and slope calculation.
//!
//! Derives the short (5, 8, 13) and long (50, 55, 60) simple moving averages
//! from a close series, and the slope of each triplet over the last three bars.

use crate::error::AnalysisError;
use crate::types::{MaOverlay, PriceSeries, StageEvidence};

/// Short moving average windows.
pub const SHORT_WINDOWS: [usize; 3] = [5, 8, 13];

/// Long moving average windows.
pub const LONG_WINDOWS: [usize; 3] = [50, 55, 60];

/// Number of bars between the latest bar and the slope reference bar.
pub const SLOPE_LOOKBACK: usize = 3;

/// Simple rolling mean over `window` values.
///
/// Entry `i` is defined iff `i >= window - 1`. A zero window is never defined.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let sum: f64 = values[i + 1 - window..=i].iter().sum();
            Some(sum / window as f64)
        })
        .collect()
}

/// Mean of the defined members of a triplet. `None` if no member is defined.
fn defined_mean(values: [Option<f64>; 3]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    }
}

/// Six rolling means aligned with the bars of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverageSet {
    pub short: [Vec<Option<f64>>; 3],
    pub long: [Vec<Option<f64>>; 3],
    len: usize,
}

impl MovingAverageSet {
    /// Compute the standard short and long windows.
    pub fn compute(closes: &[f64]) -> Self {
        Self::compute_with(closes, SHORT_WINDOWS, LONG_WINDOWS)
    }

    /// Compute with custom windows.
    pub fn compute_with(closes: &[f64], short: [usize; 3], long: [usize; 3]) -> Self {
        Self {
            short: short.map(|w| rolling_mean(closes, w)),
            long: long.map(|w| rolling_mean(closes, w)),
            len: closes.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn short_at(&self, index: usize) -> [Option<f64>; 3] {
        [0, 1, 2].map(|k| self.short[k].get(index).copied().flatten())
    }

    pub fn long_at(&self, index: usize) -> [Option<f64>; 3] {
        [0, 1, 2].map(|k| self.long[k].get(index).copied().flatten())
    }

    /// Index of the latest bar, if any.
    pub fn latest_index(&self) -> Option<usize> {
        self.len.checked_sub(1)
    }

    /// Index the slope is measured from: three bars before the latest, or the
    /// latest itself when the series has fewer than four bars.
    pub fn past_index(&self) -> Option<usize> {
        let latest = self.latest_index()?;
        Some(latest.checked_sub(SLOPE_LOOKBACK).unwrap_or(latest))
    }
}

/// Change in the short and long triplet means between the past and latest bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopePair {
    pub short_slope: f64,
    pub long_slope: f64,
}

impl SlopePair {
    /// Compute slopes from a moving average set.
    ///
    /// Triplet means skip undefined members. Returns `None` when a triplet has
    /// no defined member at either end.
    pub fn compute(set: &MovingAverageSet) -> Option<Self> {
        let latest = set.latest_index()?;
        let past = set.past_index()?;

        let short_slope = defined_mean(set.short_at(latest))? - defined_mean(set.short_at(past))?;
        let long_slope = defined_mean(set.long_at(latest))? - defined_mean(set.long_at(past))?;

        Some(Self {
            short_slope,
            long_slope,
        })
    }
}

impl StageEvidence {
    /// Compute the evidence the classifier needs from a price series.
    pub fn from_series(series: &PriceSeries) -> Result<Self, AnalysisError> {
        if series.is_empty() {
            return Err(AnalysisError::NoData);
        }

        let set = MovingAverageSet::compute(&series.closes());
        Self::from_moving_averages(&set)
    }

    /// Evidence at the latest bar of an already computed set.
    pub fn from_moving_averages(set: &MovingAverageSet) -> Result<Self, AnalysisError> {
        let latest = set.latest_index().ok_or(AnalysisError::NoData)?;

        let short = set.short_at(latest);
        let long = set.long_at(latest);
        let (short_mas, long_mas) = match (collect_defined(short), collect_defined(long)) {
            (Some(s), Some(l)) => (s, l),
            _ => return Err(AnalysisError::InsufficientData),
        };

        let slopes = SlopePair::compute(set)
            .ok_or_else(|| AnalysisError::computation("slope reference bar has no moving averages"))?;

        let evidence = Self {
            short_mas,
            long_mas,
            short_slope: slopes.short_slope,
            long_slope: slopes.long_slope,
        };

        if !evidence.is_finite() {
            return Err(AnalysisError::computation(
                "non-finite moving average or slope",
            ));
        }

        Ok(evidence)
    }

    fn is_finite(&self) -> bool {
        self.short_mas
            .iter()
            .chain(self.long_mas.iter())
            .chain([self.short_slope, self.long_slope].iter())
            .all(|v| v.is_finite())
    }
}

fn collect_defined(values: [Option<f64>; 3]) -> Option<[f64; 3]> {
    Some([values[0]?, values[1]?, values[2]?])
}

/// Per-bar close and moving averages of a series.
pub fn overlay(series: &PriceSeries) -> Vec<MaOverlay> {
    let set = MovingAverageSet::compute(&series.closes());

    series
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let [ma_5, ma_8, ma_13] = set.short_at(i);
            let [ma_50, ma_55, ma_60] = set.long_at(i);
            MaOverlay {
                time: bar.time,
                close: bar.close,
                ma_5,
                ma_8,
                ma_13,
                ma_50,
                ma_55,
                ma_60,
            }
        })
        .collect()
}
