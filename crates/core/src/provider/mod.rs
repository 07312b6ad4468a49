//! Shared plumbing for external collaborators (insight text, translation,
//! speech, news feeds).

pub mod error;
pub mod retry;

pub use error::{ProviderError, ProviderErrorKind};
pub use retry::{call_with_retry, RetryPolicy};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    Gemini,
    GoogleTranslate,
    GoogleTts,
    Rss,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::GoogleTranslate => "google_translate",
            Provider::GoogleTts => "google_tts",
            Provider::Rss => "rss",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an optional enrichment step, as shown to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Degraded<T> {
    Available(T),
    Unavailable { reason: String, retry_later: bool },
}

impl<T> Degraded<T> {
    pub fn not_configured(feature: &str) -> Self {
        Degraded::Unavailable {
            reason: format!("{feature} is not configured"),
            retry_later: false,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Degraded::Available(_))
    }

    pub fn available(self) -> Option<T> {
        match self {
            Degraded::Available(v) => Some(v),
            Degraded::Unavailable { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Degraded<U> {
        match self {
            Degraded::Available(v) => Degraded::Available(f(v)),
            Degraded::Unavailable {
                reason,
                retry_later,
            } => Degraded::Unavailable {
                reason,
                retry_later,
            },
        }
    }
}

impl<T> From<Result<T, ProviderError>> for Degraded<T> {
    fn from(res: Result<T, ProviderError>) -> Self {
        match res {
            Ok(v) => Degraded::Available(v),
            Err(err) => {
                tracing::warn!(provider = %err.provider, error = %err, "collaborator unavailable; degrading");
                Degraded::Unavailable {
                    reason: err.user_message().to_string(),
                    retry_later: err.is_busy(),
                }
            }
        }
    }
}
