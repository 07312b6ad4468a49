use crate::config::Settings;
use crate::llm::text::clean_text;
use crate::llm::InsightClient;
use crate::provider::{call_with_retry, Provider, ProviderError, RetryPolicy};
use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let retry = RetryPolicy::from_env("GEMINI");

        // Per-attempt timeout is enforced by the retry wrapper.
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            retry,
        })
    }

    async fn generate_once(&self, req: &GenerateContentRequest) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let res = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(req)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::Gemini, &e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::Gemini, &e))?;
        if !status.is_success() {
            return Err(ProviderError::from_status(Provider::Gemini, status, &body));
        }

        let parsed = serde_json::from_str::<GenerateContentResponse>(&body).map_err(|e| {
            ProviderError::decode(Provider::Gemini, format!("invalid response JSON: {e}"))
        })?;
        let text = Self::response_text(&parsed);
        clean_text(&text)
            .ok_or_else(|| ProviderError::decode(Provider::Gemini, "response contained no text"))
    }

    fn response_text(res: &GenerateContentResponse) -> String {
        res.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl InsightClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };
        call_with_retry(&self.retry, Provider::Gemini, || self.generate_once(&req)).await
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some("hi".to_string()),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"contents": [{"parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "Keep"}, {"inlineData": {}}, {"text": "a buffer."}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(GeminiClient::response_text(&res), "Keep\na buffer.");
    }

    #[test]
    fn empty_candidates_yield_empty_text() {
        let res: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(GeminiClient::response_text(&res), "");
    }
}
