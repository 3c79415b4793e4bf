use crate::types::RuleSet;
use std::env;
use std::time::Duration;

/// Stage analysis configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Price history lookback in calendar days.
    pub lookback_days: u32,
    /// Timeout applied to every external call, in seconds.
    pub request_timeout_secs: u64,
    /// Maximum number of tickers processed concurrently.
    pub max_concurrency: usize,
    /// How long a fetched price series stays cached, in seconds.
    pub price_cache_ttl_secs: u64,
    /// Rule set used when a request does not name one.
    pub default_rule_set: RuleSet,
}

impl AnalysisConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn price_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.price_cache_ttl_secs)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            lookback_days: 90,
            request_timeout_secs: 15,
            max_concurrency: 8,
            price_cache_ttl_secs: 300,
            default_rule_set: RuleSet::FourStage,
        }
    }
}

/// News search and translation configuration.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// NewsAPI key. News requests fail per ticker without one.
    pub api_key: Option<String>,
    /// NewsAPI base URL.
    pub api_url: String,
    /// Recency window for headlines, in days.
    pub window_days: u32,
    /// Maximum headlines scored per ticker.
    pub max_headlines: usize,
    /// Language filter passed to the search.
    pub language: String,
    /// LibreTranslate-compatible endpoint. Headlines pass through untranslated without one.
    pub translate_url: Option<String>,
    pub translate_api_key: Option<String>,
    /// Target language for headline translation.
    pub translate_target: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://newsapi.org/v2".to_string(),
            window_days: 3,
            max_headlines: 5,
            language: "en".to_string(),
            translate_url: None,
            translate_api_key: None,
            translate_target: "en".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    pub analysis: AnalysisConfig,
    pub news: NewsConfig,
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let analysis_defaults = AnalysisConfig::default();
        let news_defaults = NewsConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT").unwrap_or(3001),
            analysis: AnalysisConfig {
                lookback_days: parse_env("LOOKBACK_DAYS")
                    .unwrap_or(analysis_defaults.lookback_days),
                request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS")
                    .unwrap_or(analysis_defaults.request_timeout_secs),
                // A zero fan-out would stall the batch stream
                max_concurrency: parse_env::<usize>("MAX_CONCURRENCY")
                    .filter(|n| *n > 0)
                    .unwrap_or(analysis_defaults.max_concurrency),
                price_cache_ttl_secs: parse_env("PRICE_CACHE_TTL_SECS")
                    .unwrap_or(analysis_defaults.price_cache_ttl_secs),
                default_rule_set: env::var("DEFAULT_RULE_SET")
                    .ok()
                    .and_then(|v| RuleSet::from_str(&v))
                    .unwrap_or(analysis_defaults.default_rule_set),
            },
            news: NewsConfig {
                api_key: env::var("NEWS_API_KEY").ok().filter(|k| !k.is_empty()),
                api_url: env::var("NEWS_API_URL").unwrap_or(news_defaults.api_url),
                window_days: parse_env("NEWS_WINDOW_DAYS").unwrap_or(news_defaults.window_days),
                max_headlines: parse_env("NEWS_MAX_HEADLINES")
                    .unwrap_or(news_defaults.max_headlines),
                language: env::var("NEWS_LANGUAGE").unwrap_or(news_defaults.language),
                translate_url: env::var("TRANSLATE_URL").ok().filter(|u| !u.is_empty()),
                translate_api_key: env::var("TRANSLATE_API_KEY").ok().filter(|k| !k.is_empty()),
                translate_target: env::var("TRANSLATE_TARGET")
                    .unwrap_or(news_defaults.translate_target),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            analysis: AnalysisConfig::default(),
            news: NewsConfig::default(),
        }
    }
}
