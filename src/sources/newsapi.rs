//! NewsAPI client for headline search.

use crate::error::AnalysisError;
use crate::sources::NewsProvider;
use crate::types::Article;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// NewsAPI `/everything` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

/// Keep articles with a title and url, preserving provider order.
fn parse_articles(response: NewsApiResponse) -> Result<Vec<Article>, AnalysisError> {
    if response.status != "ok" {
        return Err(AnalysisError::external(format!(
            "News API error: {} - {}",
            response.code.unwrap_or_else(|| response.status.clone()),
            response.message.unwrap_or_default()
        )));
    }

    Ok(response
        .articles
        .into_iter()
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.trim().is_empty())?;
            Some(Article {
                title,
                url: a.url.unwrap_or_default(),
                published_at: a.published_at.map(|t| t.timestamp_millis()),
            })
        })
        .collect())
}

/// NewsAPI client.
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn search(
        &self,
        query: &str,
        from: DateTime<Utc>,
        language: &str,
    ) -> Result<Vec<Article>, AnalysisError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AnalysisError::external("News API key not configured"))?;

        let url = format!("{}/everything", self.base_url);
        let from = from.format("%Y-%m-%d").to_string();

        debug!("Searching news for {} since {}", query, from);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("language", language),
                ("apiKey", api_key),
            ])
            .send()
            .await?;

        // NewsAPI reports failures as JSON bodies with non-2xx statuses
        let status = response.status();
        let data: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::external(format!("Parse error ({}): {}", status, e)))?;

        parse_articles(data)
    }
}
