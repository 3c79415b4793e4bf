//! Headline translation clients.

use crate::error::AnalysisError;
use crate::sources::Translator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
    error: Option<String>,
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct LibreTranslateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LibreTranslateClient {
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
impl Translator for LibreTranslateClient {
    async fn translate(&self, text: &str, target: &str) -> Result<String, AnalysisError> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response: TranslateResponse = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&request)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| AnalysisError::external(format!("Parse error: {}", e)))?;

        match (response.translated_text, response.error) {
            (Some(text), _) => Ok(text),
            (None, Some(error)) => Err(AnalysisError::external(format!(
                "Translation error: {}",
                error
            ))),
            (None, None) => Err(AnalysisError::external("Empty translation response")),
        }
    }
}

/// Returns text unchanged. Used when no translation endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughTranslator;

#[async_trait]
impl Translator for PassThroughTranslator {
    async fn translate(&self, text: &str, _target: &str) -> Result<String, AnalysisError> {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_request_serialization() {
        let request = TranslateRequest {
            q: "Hausse des marchés",
            source: "auto",
            target: "en",
            format: "text",
            api_key: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"target\":\"en\""));
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn test_translate_response_deserialization() {
        let response: TranslateResponse =
            serde_json::from_str(r#"{"translatedText": "Markets rally"}"#).unwrap();
        assert_eq!(response.translated_text.as_deref(), Some("Markets rally"));

        let response: TranslateResponse =
            serde_json::from_str(r#"{"error": "Invalid API key"}"#).unwrap();
        assert!(response.translated_text.is_none());
        assert_eq!(response.error.as_deref(), Some("Invalid API key"));
    }

    #[tokio::test]
    async fn test_pass_through_translator() {
        let translated = PassThroughTranslator
            .translate("Apple beats estimates", "en")
            .await
            .unwrap();
        assert_eq!(translated, "Apple beats estimates");
    }
}
