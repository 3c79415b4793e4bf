pub mod aggregator;
pub mod cache;
pub mod classifier;
pub mod moving_average;
pub mod sentiment;

pub use aggregator::{parse_tickers, render_summary_table, summary_rows, StageAggregator};
pub use cache::SeriesCache;
pub use classifier::{classify, classify_stage, classify_stage_v2};
pub use moving_average::{rolling_mean, MovingAverageSet, SlopePair};
pub use sentiment::{
    score_headline, score_headlines, NewsSentimentScorer, SentimentKeywords, SentimentSettings,
};
