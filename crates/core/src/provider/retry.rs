use crate::provider::{Provider, ProviderError};
use std::future::Future;
use std::time::Duration;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_DELAY_MS: u64 = 2000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bounded retry with a fixed delay and a per-attempt timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RetryPolicy {
    /// Reads `{PREFIX}_RETRIES`, `{PREFIX}_RETRY_DELAY_MS` and `{PREFIX}_TIMEOUT_SECS`.
    pub fn from_env(prefix: &str) -> Self {
        let read = |suffix: &str| {
            std::env::var(format!("{prefix}_{suffix}"))
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
        };

        let mut out = Self::default();
        if let Some(n) = read("RETRIES") {
            out.max_attempts = n.clamp(1, 10) as u32;
        }
        if let Some(ms) = read("RETRY_DELAY_MS") {
            out.delay = Duration::from_millis(ms);
        }
        if let Some(secs) = read("TIMEOUT_SECS") {
            out.timeout = Duration::from_secs(secs.max(1));
        }
        out
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent. Quota errors are retried after `policy.delay`;
/// exhausting the budget yields a `Busy` error. Every attempt is bounded by
/// `policy.timeout`.
pub async fn call_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    provider: Provider,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let res = match tokio::time::timeout(policy.timeout, op()).await {
            Ok(res) => res,
            Err(_) => Err(ProviderError::timeout(provider, policy.timeout)),
        };

        match res {
            Ok(v) => return Ok(v),
            Err(err) if err.is_transient() => {
                if attempt >= max_attempts {
                    return Err(ProviderError::busy(provider, attempt, err.detail));
                }
                tracing::warn!(
                    %provider,
                    attempt,
                    delay = ?policy.delay,
                    error = %err,
                    "transient provider error; retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
            timeout: Duration::from_secs(5),
        }
    }

    fn quota() -> ProviderError {
        ProviderError::new(Provider::Gemini, ProviderErrorKind::QuotaExceeded, "429")
    }

    #[tokio::test]
    async fn retries_quota_then_succeeds() {
        let calls = AtomicU32::new(0);
        let res = call_with_retry(&fast(), Provider::Gemini, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(quota())
            } else {
                Ok("ok")
            }
        })
        .await;
        assert_eq!(res.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausting_quota_retries_reports_busy() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = call_with_retry(&fast(), Provider::Gemini, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(quota())
        })
        .await;
        let err = res.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Busy { attempts: 3 });
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = call_with_retry(&fast(), Provider::Rss, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::new(
                Provider::Rss,
                ProviderErrorKind::Connection,
                "refused",
            ))
        })
        .await;
        assert_eq!(res.unwrap_err().kind, ProviderErrorKind::Connection);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_attempts_time_out() {
        let policy = RetryPolicy {
            timeout: Duration::from_millis(10),
            ..fast()
        };
        let res = call_with_retry(&policy, Provider::GoogleTts, || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(res.unwrap_err().kind, ProviderErrorKind::Timeout);
    }
}
