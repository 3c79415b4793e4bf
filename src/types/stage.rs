use crate::error::AnalysisError;
use crate::types::NewsSentiment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trend stage assigned by the classifier.
///
/// The first four variants belong to the 4-label rule set, the rest to the
/// 8-label transition rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Markup,
    Markdown,
    Accumulation,
    Distribution,
    #[serde(rename = "Stage 1")]
    Stage1,
    #[serde(rename = "Stage 1→2")]
    Stage1To2,
    #[serde(rename = "Stage 2")]
    Stage2,
    #[serde(rename = "Stage 2→3")]
    Stage2To3,
    #[serde(rename = "Stage 3")]
    Stage3,
    #[serde(rename = "Stage 3→4")]
    Stage3To4,
    #[serde(rename = "Stage 4")]
    Stage4,
    #[serde(rename = "Stage 4→1")]
    Stage4To1,
    Unclassified,
}

impl Stage {
    /// Get display label for this stage.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Markup => "Markup",
            Stage::Markdown => "Markdown",
            Stage::Accumulation => "Accumulation",
            Stage::Distribution => "Distribution",
            Stage::Stage1 => "Stage 1",
            Stage::Stage1To2 => "Stage 1→2",
            Stage::Stage2 => "Stage 2",
            Stage::Stage2To3 => "Stage 2→3",
            Stage::Stage3 => "Stage 3",
            Stage::Stage3To4 => "Stage 3→4",
            Stage::Stage4 => "Stage 4",
            Stage::Stage4To1 => "Stage 4→1",
            Stage::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which ordered rule list the classifier evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    /// Markup / Markdown / Accumulation / Distribution.
    #[default]
    FourStage,
    /// Stage 1 through Stage 4 with the transitions between them.
    Transition,
}

impl RuleSet {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "4" | "four" | "four_stage" | "basic" | "classify_stage" => {
                Some(Self::FourStage)
            }
            "v2" | "8" | "eight" | "transition" | "classify_stage_v2" => Some(Self::Transition),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FourStage => "4-label",
            Self::Transition => "8-label",
        }
    }
}

/// Moving averages and slopes at the latest bar of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEvidence {
    /// MA 5, MA 8, MA 13.
    pub short_mas: [f64; 3],
    /// MA 50, MA 55, MA 60.
    pub long_mas: [f64; 3],
    pub short_slope: f64,
    pub long_slope: f64,
}

/// Either a stage with its evidence or a diagnostic message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Classified {
        stage: Stage,
        evidence: StageEvidence,
    },
    Diagnostic {
        message: String,
    },
}

/// Classification of one ticker within one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub ticker: String,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

impl ClassificationResult {
    pub fn classified(ticker: impl Into<String>, stage: Stage, evidence: StageEvidence) -> Self {
        Self {
            ticker: ticker.into(),
            outcome: StageOutcome::Classified { stage, evidence },
        }
    }

    pub fn diagnostic(ticker: impl Into<String>, error: &AnalysisError) -> Self {
        Self {
            ticker: ticker.into(),
            outcome: StageOutcome::Diagnostic {
                message: error.to_string(),
            },
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match &self.outcome {
            StageOutcome::Classified { stage, .. } => Some(*stage),
            StageOutcome::Diagnostic { .. } => None,
        }
    }

    pub fn evidence(&self) -> Option<&StageEvidence> {
        match &self.outcome {
            StageOutcome::Classified { evidence, .. } => Some(evidence),
            StageOutcome::Diagnostic { .. } => None,
        }
    }

    /// Stage label, or the diagnostic message when unclassified.
    pub fn label(&self) -> &str {
        match &self.outcome {
            StageOutcome::Classified { stage, .. } => stage.label(),
            StageOutcome::Diagnostic { message } => message,
        }
    }
}

/// One row of the batch summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub ticker: String,
    pub stage: String,
    pub ma_5: Option<f64>,
    pub ma_8: Option<f64>,
    pub ma_13: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_55: Option<f64>,
    pub ma_60: Option<f64>,
    pub short_slope: Option<f64>,
    pub long_slope: Option<f64>,
}

impl From<&ClassificationResult> for SummaryRow {
    fn from(result: &ClassificationResult) -> Self {
        let evidence = result.evidence();
        let short = |i: usize| evidence.map(|e| e.short_mas[i]);
        let long = |i: usize| evidence.map(|e| e.long_mas[i]);

        Self {
            ticker: result.ticker.clone(),
            stage: result.label().to_string(),
            ma_5: short(0),
            ma_8: short(1),
            ma_13: short(2),
            ma_50: long(0),
            ma_55: long(1),
            ma_60: long(2),
            short_slope: evidence.map(|e| e.short_slope),
            long_slope: evidence.map(|e| e.long_slope),
        }
    }
}

/// Options for one batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisOptions {
    pub rule_set: RuleSet,
    pub include_news: bool,
}

/// Everything produced for one batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub rule_set: RuleSet,
    pub results: Vec<ClassificationResult>,
    pub summary: Vec<SummaryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<Vec<NewsSentiment>>,
    pub timestamp: i64,
}
