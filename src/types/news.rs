use serde::{Deserialize, Serialize};

/// Label reported when the search found no articles.
pub const NO_RELEVANT_NEWS: &str = "no relevant news";

/// Article returned by a news search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub url: String,
    /// Unix timestamp in milliseconds, when the provider reports one.
    pub published_at: Option<i64>,
}

/// A scored headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    /// Headline after translation, or the original if translation failed.
    pub title: String,
    pub original_title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<i64>,
}

/// Coarse sentiment derived from the headline score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[serde(rename = "Mixed/unclear")]
    Mixed,
}

impl SentimentLabel {
    /// Create label from an aggregate headline score.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 2 => SentimentLabel::Positive,
            s if s <= -2 => SentimentLabel::Negative,
            _ => SentimentLabel::Mixed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Mixed => "Mixed/unclear",
        }
    }
}

/// Result of scoring one ticker's recent headlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentimentOutcome {
    Scored { score: i32, label: SentimentLabel },
    NoRelevantNews,
    Error { message: String },
}

/// Headline sentiment for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSentiment {
    pub ticker: String,
    pub headlines: Vec<Headline>,
    #[serde(flatten)]
    pub outcome: SentimentOutcome,
}

impl NewsSentiment {
    /// Sentiment label, "no relevant news", or the error message.
    pub fn label(&self) -> &str {
        match &self.outcome {
            SentimentOutcome::Scored { label, .. } => label.label(),
            SentimentOutcome::NoRelevantNews => NO_RELEVANT_NEWS,
            SentimentOutcome::Error { message } => message,
        }
    }

    pub fn score(&self) -> Option<i32> {
        match &self.outcome {
            SentimentOutcome::Scored { score, .. } => Some(*score),
            _ => None,
        }
    }
}
