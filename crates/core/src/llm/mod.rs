//! Short AI-written text: the dashboard insight line and headline explainers.

pub mod gemini;
pub mod prompt;
pub mod text;

use crate::domain::metrics::Metrics;
use crate::provider::{Degraded, Provider, ProviderError};

#[async_trait::async_trait]
pub trait InsightClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Figures fed into the dashboard prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightInput {
    pub monthly_income: f64,
    pub metrics: Metrics,
}

pub async fn dashboard_insight(
    client: Option<&dyn InsightClient>,
    input: &InsightInput,
    infinite_threshold_days: i64,
) -> Degraded<String> {
    let Some(client) = client else {
        return Degraded::not_configured("AI insight");
    };
    let prompt = prompt::dashboard_prompt(input, infinite_threshold_days);
    client.generate_text(&prompt).await.into()
}

pub async fn explain_headline(client: Option<&dyn InsightClient>, headline: &str) -> Degraded<String> {
    let Some(client) = client else {
        return Degraded::not_configured("AI insight");
    };
    let prompt = prompt::headline_prompt(headline);
    client.generate_text(&prompt).await.into()
}
