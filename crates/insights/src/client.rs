//! Generative-text client speaking the Gemini `generateContent` REST shape.

use crate::SummaryProvider;
use async_trait::async_trait;
use campaign_core::config::InsightsConfig;
use campaign_core::{CampaignError, CampaignResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Text of the first candidate, all parts joined.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    cfg: InsightsConfig,
}

impl GeminiClient {
    pub fn new(cfg: InsightsConfig) -> Self {
        Self {
            client: Client::new(),
            cfg,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.model
        )
    }
}

#[async_trait]
impl SummaryProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> CampaignResult<String> {
        if self.cfg.api_key.is_empty() {
            return Err(CampaignError::Summary("no API key configured".to_string()));
        }

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.cfg.temperature,
                top_p: self.cfg.top_p,
            },
        };

        info!(model = %self.cfg.model, "Requesting campaign summary");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.cfg.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CampaignError::Summary(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| CampaignError::Summary(format!("service returned an error: {e}")))?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CampaignError::Summary(format!("unreadable response: {e}")))?;

        let text = parsed.text();
        debug!(chars = text.len(), "Summary received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                top_p: 0.25,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["temperature"], 0.5);
        assert_eq!(value["generationConfig"]["topP"], 0.25);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Reach "},{"text":"is up."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.text(), "Reach is up.");

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(InsightsConfig {
            base_url: "http://localhost:9000/v1beta/".into(),
            ..InsightsConfig::default()
        });
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }
}
