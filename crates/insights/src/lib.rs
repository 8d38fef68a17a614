//! Executive summaries for planner runs, requested from a generative-text
//! service. A failed or empty request never fails a run; it is replaced
//! by a fixed fallback text.

pub mod client;
pub mod prompt;

use async_trait::async_trait;
use campaign_core::config::InsightsConfig;
use campaign_core::inputs::CampaignInputs;
use campaign_core::{CampaignError, CampaignResult};
use std::sync::Arc;
use tracing::warn;

pub use client::GeminiClient;
pub use prompt::build_prompt;

/// Shown when the service answers with no text.
pub const EMPTY_SUMMARY_TEXT: &str = "Unable to generate insights at this time.";

/// Shown when the request fails for any reason.
pub const FAILED_SUMMARY_TEXT: &str =
    "Error generating AI insights. Please check your inputs and try again.";

/// Text-in, text-out summary service.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, prompt: &str) -> CampaignResult<String>;
}

/// Provider used when summaries are switched off in configuration.
pub struct DisabledSummaries;

#[async_trait]
impl SummaryProvider for DisabledSummaries {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> CampaignResult<String> {
        Err(CampaignError::Summary("summaries are disabled".to_string()))
    }
}

pub fn provider_from_config(cfg: &InsightsConfig) -> Arc<dyn SummaryProvider> {
    if cfg.enabled {
        Arc::new(GeminiClient::new(cfg.clone()))
    } else {
        Arc::new(DisabledSummaries)
    }
}

/// Request a summary for `inputs`, falling back to a fixed text on failure.
pub async fn summarize(provider: &dyn SummaryProvider, inputs: &CampaignInputs) -> String {
    let prompt = build_prompt(inputs);
    match provider.generate(&prompt).await {
        Ok(text) if text.trim().is_empty() => EMPTY_SUMMARY_TEXT.to_string(),
        Ok(text) => text,
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Summary request failed");
            metrics::counter!("insights.summary.failures").increment(1);
            FAILED_SUMMARY_TEXT.to_string()
        }
    }
}
