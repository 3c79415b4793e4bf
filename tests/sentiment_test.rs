//! Headline sentiment scoring against stub news and translation providers.

mod common;

use common::{StubNews, StubTranslator, START_MS};
use stagewatch::services::{NewsSentimentScorer, SentimentKeywords, SentimentSettings};
use stagewatch::{AnalysisError, Article, SentimentLabel, SentimentOutcome};
use std::sync::Arc;
use std::time::Duration;

fn scorer(news: StubNews, translator: StubTranslator) -> NewsSentimentScorer {
    NewsSentimentScorer::new(
        Arc::new(news),
        Arc::new(translator),
        SentimentKeywords::default(),
        SentimentSettings::default(),
    )
}

#[tokio::test]
async fn test_no_articles_reports_no_relevant_news() {
    let scorer = scorer(StubNews::new(), StubTranslator::new());

    let sentiment = scorer.score_ticker("aapl").await;
    assert_eq!(sentiment.ticker, "AAPL");
    assert_eq!(sentiment.outcome, SentimentOutcome::NoRelevantNews);
    assert_eq!(sentiment.label(), "no relevant news");
    assert!(sentiment.headlines.is_empty());
}

#[tokio::test]
async fn test_two_positive_headlines_are_positive() {
    let news = StubNews::new().with("AAPL", &["Tech rally continues", "Earnings beat forecasts"]);
    let scorer = scorer(news, StubTranslator::new());

    let sentiment = scorer.score_ticker("AAPL").await;
    assert_eq!(
        sentiment.outcome,
        SentimentOutcome::Scored {
            score: 2,
            label: SentimentLabel::Positive
        }
    );
    assert_eq!(sentiment.headlines.len(), 2);
}

#[tokio::test]
async fn test_mixed_headlines() {
    let news = StubNews::new().with(
        "XOM",
        &[
            "Oil slides on recession fears",
            "Refinery output shows recovery",
            "Analysts hold",
        ],
    );
    let scorer = scorer(news, StubTranslator::new());

    let sentiment = scorer.score_ticker("XOM").await;
    assert_eq!(sentiment.score(), Some(0));
    assert_eq!(sentiment.label(), "Mixed/unclear");
}

#[tokio::test]
async fn test_negative_headlines() {
    let news = StubNews::new().with(
        "BA",
        &["Airline orders decline", "Supply crisis deepens"],
    );
    let scorer = scorer(news, StubTranslator::new());

    let sentiment = scorer.score_ticker("BA").await;
    assert_eq!(sentiment.score(), Some(-2));
    assert_eq!(sentiment.label(), "Negative");
}

#[tokio::test]
async fn test_translated_headline_is_scored() {
    let news = StubNews::new().with("SAP", &["Aktien erholen sich kräftig"]);
    let translator = StubTranslator::new().with("Aktien erholen sich kräftig", "Shares stage strong rally");
    let scorer = scorer(news, translator);

    let sentiment = scorer.score_ticker("SAP").await;
    assert_eq!(sentiment.score(), Some(1));
    assert_eq!(sentiment.headlines[0].title, "Shares stage strong rally");
    assert_eq!(sentiment.headlines[0].original_title, "Aktien erholen sich kräftig");
}

#[tokio::test]
async fn test_translation_failure_keeps_original() {
    // No phrase mapping, so every translation fails
    let news = StubNews::new().with("AAPL", &["Markets rally on growth", "Quiet trading day"]);
    let scorer = scorer(news, StubTranslator::new());

    let sentiment = scorer.score_ticker("AAPL").await;
    assert_eq!(sentiment.headlines[0].title, "Markets rally on growth");
    assert_eq!(sentiment.headlines[0].title, sentiment.headlines[0].original_title);
    assert_eq!(sentiment.score(), Some(1));
}

#[tokio::test]
async fn test_at_most_five_most_recent_headlines() {
    let hour = 3_600_000;
    let articles: Vec<Article> = [3, 7, 1, 6, 2, 5, 4]
        .iter()
        .map(|&age| Article {
            title: format!("Headline aged {}h", age),
            url: format!("https://news.example.com/{}", age),
            published_at: Some(START_MS - age * hour),
        })
        .collect();
    let scorer = scorer(
        StubNews::new().with_articles("MSFT", articles),
        StubTranslator::new(),
    );

    let sentiment = scorer.score_ticker("MSFT").await;
    let titles: Vec<&str> = sentiment
        .headlines
        .iter()
        .map(|h| h.title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Headline aged 1h",
            "Headline aged 2h",
            "Headline aged 3h",
            "Headline aged 4h",
            "Headline aged 5h",
        ]
    );
}

#[tokio::test]
async fn test_search_failure_isolated_to_ticker() {
    let news = StubNews::new()
        .with("AAPL", &["Apple rally", "Growth story intact"])
        .failing("TSLA", AnalysisError::external("quota exceeded"));
    let scorer = scorer(news, StubTranslator::new());

    let tickers = vec!["TSLA".to_string(), "AAPL".to_string(), "NVDA".to_string()];
    let results = scorer.score_batch(&tickers).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].ticker, "TSLA");
    assert_eq!(results[0].label(), "Error: quota exceeded");
    assert!(results[0].score().is_none());
    assert_eq!(results[1].label(), "Positive");
    assert_eq!(results[2].label(), "no relevant news");
}

#[tokio::test(start_paused = true)]
async fn test_slow_search_times_out_for_that_ticker() {
    let news = StubNews::new()
        .with("AAPL", &["Apple rally"])
        .delayed(Duration::from_secs(60));
    let scorer = scorer(news, StubTranslator::new());

    let sentiment = scorer.score_ticker("AAPL").await;
    match &sentiment.outcome {
        SentimentOutcome::Error { message } => assert!(message.contains("timed out")),
        other => panic!("expected a timeout error, got {:?}", other),
    }
    assert!(sentiment.headlines.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_translation_keeps_original() {
    let news = StubNews::new().with("SAP", &["Aktien erholen sich"]);
    let translator = StubTranslator::new()
        .with("Aktien erholen sich", "Shares stage a rally")
        .delayed(Duration::from_secs(60));
    let scorer = scorer(news, translator);

    let sentiment = scorer.score_ticker("SAP").await;
    assert_eq!(sentiment.headlines.len(), 1);
    assert_eq!(sentiment.headlines[0].title, sentiment.headlines[0].original_title);
    assert_eq!(sentiment.headlines[0].title, "Aktien erholen sich");
    // Scored on the untranslated text, which has no keywords
    assert_eq!(sentiment.score(), Some(0));
}

#[test]
fn test_custom_keywords() {
    let news = StubNews::new().with("GME", &["To the moon", "Short squeeze"]);
    let scorer = NewsSentimentScorer::new(
        Arc::new(news),
        Arc::new(StubTranslator::new()),
        SentimentKeywords::new(["MOON", "squeeze"], ["dump"]),
        SentimentSettings::default(),
    );

    let sentiment = tokio_test::block_on(scorer.score_ticker("GME"));
    assert_eq!(sentiment.label(), "Positive");
    assert_eq!(scorer.keywords().positive, vec!["moon", "squeeze"]);
}

#[test]
fn test_sentiment_serialization() {
    let news = StubNews::new().with("AAPL", &["Apple rally", "Growth ahead"]);
    let scorer = scorer(news, StubTranslator::new());

    let sentiment = tokio_test::block_on(scorer.score_ticker("AAPL"));
    let json = serde_json::to_value(&sentiment).unwrap();

    assert_eq!(json["ticker"], "AAPL");
    assert_eq!(json["status"], "scored");
    assert_eq!(json["score"], 2);
    assert_eq!(json["label"], "Positive");
    assert_eq!(json["headlines"][0]["originalTitle"], "Apple rally");
}
