use crate::provider::Provider;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Rate limit / resource exhausted. The only transient kind.
    QuotaExceeded,
    Connection,
    Unavailable,
    Timeout,
    /// Retry budget spent on quota errors.
    Busy { attempts: u32 },
    Decode,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::QuotaExceeded => "quota_exceeded",
            ProviderErrorKind::Connection => "connection_error",
            ProviderErrorKind::Unavailable => "unavailable",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::Busy { .. } => "busy",
            ProviderErrorKind::Decode => "decode_error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
    pub detail: String,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind, detail: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            detail: detail.into(),
        }
    }

    pub fn busy(provider: Provider, attempts: u32, detail: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Busy { attempts }, detail)
    }

    pub fn timeout(provider: Provider, after: Duration) -> Self {
        Self::new(
            provider,
            ProviderErrorKind::Timeout,
            format!("no response within {}ms", after.as_millis()),
        )
    }

    pub fn decode(provider: Provider, detail: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Decode, detail)
    }

    pub fn from_reqwest(provider: Provider, err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout
        } else if err.is_decode() {
            ProviderErrorKind::Decode
        } else {
            ProviderErrorKind::Connection
        };
        Self::new(provider, kind, err.to_string())
    }

    /// Maps a non-success HTTP response. 429 and `RESOURCE_EXHAUSTED` bodies
    /// count as quota errors.
    pub fn from_status(provider: Provider, status: reqwest::StatusCode, body: &str) -> Self {
        let kind = if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || body.contains("RESOURCE_EXHAUSTED")
        {
            ProviderErrorKind::QuotaExceeded
        } else {
            ProviderErrorKind::Unavailable
        };
        let snippet: String = body.chars().take(300).collect();
        Self::new(provider, kind, format!("status={status} body={snippet}"))
    }

    pub fn is_transient(&self) -> bool {
        self.kind == ProviderErrorKind::QuotaExceeded
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.kind, ProviderErrorKind::Busy { .. })
    }

    /// Short, non-technical text for the UI.
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::QuotaExceeded | ProviderErrorKind::Busy { .. } => {
                "Service is busy, please try again later."
            }
            ProviderErrorKind::Connection | ProviderErrorKind::Timeout => {
                "Could not reach the service."
            }
            ProviderErrorKind::Unavailable | ProviderErrorKind::Decode => {
                "This feature is currently unavailable."
            }
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error (provider={}): {}",
            self.kind.as_str(),
            self.provider,
            self.detail
        )
    }
}

impl std::error::Error for ProviderError {}
