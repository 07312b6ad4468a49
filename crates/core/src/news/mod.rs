//! Profile-driven news feeds.

pub mod provider;
pub mod rss;

use crate::domain::profile::{Profile, UserType};
use crate::provider::ProviderError;
use serde::{Deserialize, Serialize};

pub const RBI_FEED_URL: &str = "https://www.rbi.org.in/pressreleases_rss.xml";
pub const SEBI_FEED_URL: &str = "https://www.sebi.gov.in/sebirss.xml";
pub const AGMARKNET_URL: &str = "https://agmarknet.gov.in";

const DEFAULT_HEADLINE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Rss,
    /// A page the UI links to; nothing is fetched.
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub kind: FeedKind,
}

impl FeedSource {
    fn rss(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            kind: FeedKind::Rss,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsSection {
    pub source: FeedSource,
    pub headlines: Vec<Headline>,
}

#[derive(Debug, Clone, Default)]
pub struct NewsSettings {
    /// Study stream -> feed URL.
    pub student_feeds: Vec<(String, String)>,
    pub headline_limit: usize,
}

impl NewsSettings {
    /// `STUDENT_NEWS_FEEDS="CSE / Tech=https://...;Law=https://..."`,
    /// `NEWS_HEADLINE_LIMIT` (default 5).
    pub fn from_env() -> Self {
        let student_feeds = std::env::var("STUDENT_NEWS_FEEDS")
            .map(|raw| parse_stream_feeds(&raw))
            .unwrap_or_default();
        let headline_limit = std::env::var("NEWS_HEADLINE_LIMIT")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_HEADLINE_LIMIT);
        Self {
            student_feeds,
            headline_limit,
        }
    }

    fn feed_for_stream(&self, stream: &str) -> Option<&str> {
        self.student_feeds
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(stream.trim()))
            .map(|(_, url)| url.as_str())
    }
}

fn parse_stream_feeds(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|pair| {
            let (stream, url) = pair.split_once('=')?;
            let (stream, url) = (stream.trim(), url.trim());
            (!stream.is_empty() && !url.is_empty()).then(|| (stream.to_string(), url.to_string()))
        })
        .collect()
}

pub fn select_feeds(profile: &Profile, settings: &NewsSettings) -> Vec<FeedSource> {
    match profile.user_type {
        UserType::Standard => {
            let mut feeds = vec![FeedSource::rss("RBI Press Releases", RBI_FEED_URL)];
            if profile.is_investor() {
                feeds.push(FeedSource::rss("SEBI Updates", SEBI_FEED_URL));
            } else {
                feeds.push(FeedSource {
                    name: "Agmarknet Mandi Prices".to_string(),
                    url: AGMARKNET_URL.to_string(),
                    kind: FeedKind::Link,
                });
            }
            feeds
        }
        UserType::Student => {
            let stream_feed = profile
                .study_stream
                .as_deref()
                .and_then(|s| settings.feed_for_stream(s).map(|url| (s, url)));
            match stream_feed {
                Some((stream, url)) => vec![FeedSource::rss(&format!("{} News", stream.trim()), url)],
                None => vec![FeedSource::rss("RBI Press Releases", RBI_FEED_URL)],
            }
        }
    }
}

#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_headlines(
        &self,
        feed: &FeedSource,
        limit: usize,
    ) -> Result<Vec<Headline>, ProviderError>;
}

/// Fetches every RSS feed in order. A failed feed yields an empty section.
pub async fn collect_headlines(
    provider: &dyn NewsProvider,
    feeds: &[FeedSource],
    limit: usize,
) -> Vec<NewsSection> {
    let mut out = Vec::with_capacity(feeds.len());
    for feed in feeds {
        let headlines = match feed.kind {
            FeedKind::Link => Vec::new(),
            FeedKind::Rss => match provider.fetch_headlines(feed, limit).await {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!(feed = %feed.name, url = %feed.url, error = %err, "news feed unavailable");
                    Vec::new()
                }
            },
        };
        out.push(NewsSection {
            source: feed.clone(),
            headlines,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Provider, ProviderErrorKind};

    fn urls(feeds: &[FeedSource]) -> Vec<&str> {
        feeds.iter().map(|f| f.url.as_str()).collect()
    }

    #[test]
    fn standard_non_investor_gets_rbi_and_mandi_link() {
        let p = Profile::default();
        let feeds = select_feeds(&p, &NewsSettings::default());
        assert_eq!(urls(&feeds), vec![RBI_FEED_URL, AGMARKNET_URL]);
        assert_eq!(feeds[1].kind, FeedKind::Link);
    }

    #[test]
    fn investor_gets_sebi() {
        let mut p = Profile::default();
        p.held_assets.insert("Mutual Funds".to_string());
        assert_eq!(
            urls(&select_feeds(&p, &NewsSettings::default())),
            vec![RBI_FEED_URL, SEBI_FEED_URL]
        );
    }

    #[test]
    fn student_stream_feed_with_rbi_fallback() {
        let settings = NewsSettings {
            student_feeds: parse_stream_feeds("CSE / Tech = https://tech.example/rss ; bad"),
            headline_limit: 5,
        };
        let mut p = Profile {
            user_type: UserType::Student,
            study_stream: Some("CSE / Tech".to_string()),
            ..Default::default()
        };
        let feeds = select_feeds(&p, &settings);
        assert_eq!(urls(&feeds), vec!["https://tech.example/rss"]);
        assert_eq!(feeds[0].name, "CSE / Tech News");

        p.study_stream = Some("Law".to_string());
        assert_eq!(urls(&select_feeds(&p, &settings)), vec![RBI_FEED_URL]);
    }

    struct FailingRbi;

    #[async_trait::async_trait]
    impl NewsProvider for FailingRbi {
        async fn fetch_headlines(
            &self,
            feed: &FeedSource,
            _limit: usize,
        ) -> Result<Vec<Headline>, ProviderError> {
            if feed.url == RBI_FEED_URL {
                return Err(ProviderError::new(Provider::Rss, ProviderErrorKind::Timeout, "slow"));
            }
            Ok(vec![Headline {
                title: "SEBI circular".to_string(),
                link: None,
            }])
        }
    }

    #[tokio::test]
    async fn failed_feed_degrades_to_empty_section() {
        let feeds = vec![
            FeedSource::rss("RBI", RBI_FEED_URL),
            FeedSource::rss("SEBI", SEBI_FEED_URL),
        ];
        let sections = collect_headlines(&FailingRbi, &feeds, 5).await;
        assert!(sections[0].headlines.is_empty());
        assert_eq!(sections[1].headlines[0].title, "SEBI circular");
    }
}
