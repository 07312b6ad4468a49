pub mod domain;
pub mod engine;
pub mod llm;
pub mod news;
pub mod provider;
pub mod session;
pub mod storage;
pub mod voice;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_USER_ID: &str = "demo_user";
    pub const DEFAULT_INFINITE_RUNWAY_THRESHOLD_DAYS: i64 = 900;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub gemini_api_key: Option<String>,
        pub google_cloud_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub user_id: String,
        /// Finite runways above this many days are shown as "Infinite".
        pub infinite_runway_threshold_days: i64,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let infinite_runway_threshold_days = match std::env::var("RUNWAY_INFINITE_THRESHOLD_DAYS") {
                Ok(s) => s
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("RUNWAY_INFINITE_THRESHOLD_DAYS is not an integer: {s}"))?,
                Err(_) => DEFAULT_INFINITE_RUNWAY_THRESHOLD_DAYS,
            };

            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
                google_cloud_api_key: std::env::var("GOOGLE_CLOUD_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                user_id: std::env::var("SENTINEL_USER_ID")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
                infinite_runway_threshold_days,
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY is required")
        }

        pub fn require_google_cloud_api_key(&self) -> anyhow::Result<&str> {
            self.google_cloud_api_key
                .as_deref()
                .context("GOOGLE_CLOUD_API_KEY is required")
        }
    }
}
