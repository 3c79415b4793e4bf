//! Headline keyword sentiment.
//!
//! Each headline scores +1 if it mentions a positive keyword, otherwise -1 if
//! it mentions a negative keyword. The ticker's label follows from the sum.

use crate::config::NewsConfig;
use crate::error::AnalysisError;
use crate::sources::{NewsProvider, Translator};
use crate::types::{Article, Headline, NewsSentiment, SentimentLabel, SentimentOutcome};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Keyword sets used to score headlines. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentKeywords {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl SentimentKeywords {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        // An empty keyword would match every headline
        fn normalize<I>(words: I) -> Vec<String>
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            words
                .into_iter()
                .map(Into::into)
                .filter(|w: &String| !w.trim().is_empty())
                .map(|w| w.to_lowercase())
                .collect()
        }

        Self {
            positive: normalize(positive),
            negative: normalize(negative),
        }
    }
}

impl Default for SentimentKeywords {
    fn default() -> Self {
        Self::new(
            ["growth", "beat", "recovery", "optimism", "rally"],
            ["recession", "crisis", "tensions", "decline", "cut"],
        )
    }
}

/// Score one headline: +1, -1 or 0. The positive check wins when both sets match.
pub fn score_headline(headline: &str, keywords: &SentimentKeywords) -> i32 {
    let text = headline.to_lowercase();
    if keywords.positive.iter().any(|w| text.contains(w.as_str())) {
        1
    } else if keywords.negative.iter().any(|w| text.contains(w.as_str())) {
        -1
    } else {
        0
    }
}

/// Sum of headline scores.
pub fn score_headlines<S: AsRef<str>>(headlines: &[S], keywords: &SentimentKeywords) -> i32 {
    headlines
        .iter()
        .map(|h| score_headline(h.as_ref(), keywords))
        .sum()
}

/// Scoring parameters.
#[derive(Debug, Clone)]
pub struct SentimentSettings {
    pub window_days: u32,
    pub max_headlines: usize,
    pub language: String,
    pub translate_target: String,
    pub timeout: Duration,
    pub max_concurrency: usize,
}

impl SentimentSettings {
    pub fn from_config(news: &NewsConfig, timeout: Duration, max_concurrency: usize) -> Self {
        Self {
            window_days: news.window_days,
            max_headlines: news.max_headlines,
            language: news.language.clone(),
            translate_target: news.translate_target.clone(),
            timeout,
            max_concurrency: max_concurrency.max(1),
        }
    }
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self::from_config(&NewsConfig::default(), Duration::from_secs(15), 8)
    }
}

/// Fetches, translates and scores recent headlines per ticker.
pub struct NewsSentimentScorer {
    news: Arc<dyn NewsProvider>,
    translator: Arc<dyn Translator>,
    keywords: SentimentKeywords,
    settings: SentimentSettings,
}

impl NewsSentimentScorer {
    pub fn new(
        news: Arc<dyn NewsProvider>,
        translator: Arc<dyn Translator>,
        keywords: SentimentKeywords,
        settings: SentimentSettings,
    ) -> Self {
        Self {
            news,
            translator,
            keywords,
            settings,
        }
    }

    pub fn keywords(&self) -> &SentimentKeywords {
        &self.keywords
    }

    /// Score one ticker. Search failures become an error outcome for this ticker only.
    pub async fn score_ticker(&self, ticker: &str) -> NewsSentiment {
        let ticker = ticker.trim().to_uppercase();

        let articles = match self.recent_articles(&ticker).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!("News search failed for {}: {}", ticker, e);
                return NewsSentiment {
                    ticker,
                    headlines: Vec::new(),
                    outcome: SentimentOutcome::Error {
                        message: e.to_string(),
                    },
                };
            }
        };

        if articles.is_empty() {
            debug!("No recent news for {}", ticker);
            return NewsSentiment {
                ticker,
                headlines: Vec::new(),
                outcome: SentimentOutcome::NoRelevantNews,
            };
        }

        let mut headlines = Vec::with_capacity(articles.len());
        for article in articles {
            let title = self.translate_or_original(&article.title).await;
            headlines.push(Headline {
                title,
                original_title: article.title,
                url: article.url,
                published_at: article.published_at,
            });
        }

        let titles: Vec<&str> = headlines.iter().map(|h| h.title.as_str()).collect();
        let score = score_headlines(&titles, &self.keywords);
        debug!("{} headlines for {} scored {}", headlines.len(), ticker, score);

        NewsSentiment {
            ticker,
            headlines,
            outcome: SentimentOutcome::Scored {
                score,
                label: SentimentLabel::from_score(score),
            },
        }
    }

    /// Score tickers concurrently, returning results in input order.
    pub async fn score_batch(&self, tickers: &[String]) -> Vec<NewsSentiment> {
        stream::iter(tickers.iter().cloned())
            .map(|ticker| async move { self.score_ticker(&ticker).await })
            .buffered(self.settings.max_concurrency)
            .collect()
            .await
    }

    /// At most `max_headlines` articles within the window, most recent first.
    async fn recent_articles(&self, ticker: &str) -> Result<Vec<Article>, AnalysisError> {
        let from = Utc::now() - chrono::Duration::days(i64::from(self.settings.window_days));

        let mut articles = tokio::time::timeout(
            self.settings.timeout,
            self.news.search(ticker, from, &self.settings.language),
        )
        .await
        .map_err(|_| {
            AnalysisError::external(format!(
                "news search timed out after {}s",
                self.settings.timeout.as_secs()
            ))
        })??;

        // Stable sort keeps provider order for undated articles
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.truncate(self.settings.max_headlines);
        Ok(articles)
    }

    async fn translate_or_original(&self, title: &str) -> String {
        let translated = tokio::time::timeout(
            self.settings.timeout,
            self.translator
                .translate(title, &self.settings.translate_target),
        )
        .await;

        match translated {
            Ok(Ok(text)) if !text.trim().is_empty() => text,
            Ok(Ok(_)) => title.to_string(),
            Ok(Err(e)) => {
                debug!("Translation failed, keeping original headline: {}", e);
                title.to_string()
            }
            Err(_) => {
                debug!("Translation timed out, keeping original headline");
                title.to_string()
            }
        }
    }
}
