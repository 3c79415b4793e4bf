//! Stagewatch - moving-average trend stage classification server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use axum::Router;
use config::Config;
use services::{NewsSentimentScorer, SentimentKeywords, SentimentSettings, StageAggregator};
use sources::{
    LibreTranslateClient, NewsApiClient, PassThroughTranslator, Translator, YahooFinanceClient,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub aggregator: Arc<StageAggregator>,
}

impl AppState {
    /// Wire the Yahoo, NewsAPI and translation clients from configuration.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let timeout = config.analysis.request_timeout();

        let prices = Arc::new(YahooFinanceClient::new(timeout)?);

        let news = Arc::new(NewsApiClient::new(
            &config.news.api_url,
            config.news.api_key.clone(),
            timeout,
        )?);
        if config.news.api_key.is_none() {
            info!("NEWS_API_KEY not set, news sentiment will report errors");
        }

        let translator: Arc<dyn Translator> = match &config.news.translate_url {
            Some(url) => {
                info!("Translating headlines via {}", url);
                Arc::new(LibreTranslateClient::new(
                    url,
                    config.news.translate_api_key.clone(),
                    timeout,
                )?)
            }
            None => Arc::new(PassThroughTranslator),
        };

        let scorer = Arc::new(NewsSentimentScorer::new(
            news,
            translator,
            SentimentKeywords::default(),
            SentimentSettings::from_config(
                &config.news,
                timeout,
                config.analysis.max_concurrency,
            ),
        ));

        let aggregator = StageAggregator::new(prices, config.analysis.clone()).with_news(scorer);

        Ok(Self::new(config, aggregator))
    }

    pub fn new(config: Config, aggregator: StageAggregator) -> Self {
        Self {
            config: Arc::new(config),
            aggregator: Arc::new(aggregator),
        }
    }
}

/// Build the router with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Re-export commonly used types
pub use error::{AnalysisError, AppError};
pub use types::*;
