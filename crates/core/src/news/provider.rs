use crate::news::rss::parse_items;
use crate::news::{FeedSource, Headline, NewsProvider};
use crate::provider::{call_with_retry, Provider, ProviderError, RetryPolicy};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct HttpRssProvider {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpRssProvider {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut retry = RetryPolicy::from_env("NEWS");
        if std::env::var("NEWS_TIMEOUT_SECS").is_err() {
            retry.timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("livelihood-sentinel/0.1"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/rss+xml, application/xml;q=0.9, */*;q=0.8"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build news http client")?;

        Ok(Self { http, retry })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, ProviderError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::Rss, &e))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(Provider::Rss, &e))?;
        if !status.is_success() {
            return Err(ProviderError::from_status(Provider::Rss, status, &text));
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl NewsProvider for HttpRssProvider {
    async fn fetch_headlines(
        &self,
        feed: &FeedSource,
        limit: usize,
    ) -> Result<Vec<Headline>, ProviderError> {
        let xml = call_with_retry(&self.retry, Provider::Rss, || self.fetch_once(&feed.url)).await?;
        let items = parse_items(&xml, limit);
        tracing::debug!(feed = %feed.name, count = items.len(), "fetched headlines");
        Ok(items)
    }
}
