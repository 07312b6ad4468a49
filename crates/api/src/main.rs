use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel_api::{app_router, AppState};
use sentinel_core::config::Settings;
use sentinel_core::llm::gemini::GeminiClient;
use sentinel_core::news::provider::HttpRssProvider;
use sentinel_core::news::NewsSettings;
use sentinel_core::storage::{PgProfileStore, PgResolvedStore};
use sentinel_core::voice::google::GoogleCloudVoice;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool = connect_pool(&settings).await;
    let state = build_state(&settings, pool);
    let app = app_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, user_id = %settings.user_id, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn connect_pool(settings: &Settings) -> Option<PgPool> {
    match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match sentinel_core::storage::migrate(&pool).await {
                Ok(()) => Some(pool),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    }
}

fn build_state(settings: &Settings, pool: Option<PgPool>) -> AppState {
    let mut state = match pool {
        Some(pool) => AppState::new(
            Arc::new(PgProfileStore::new(pool.clone(), settings.user_id.clone())),
            Arc::new(PgResolvedStore::new(pool, settings.user_id.clone())),
        ),
        None => AppState::degraded(),
    };
    state.infinite_threshold_days = settings.infinite_runway_threshold_days;
    state.news_settings = NewsSettings::from_env();

    match GeminiClient::from_settings(settings) {
        Ok(client) => state.insight = Some(Arc::new(client)),
        Err(e) => tracing::warn!(error = %e, "AI insight disabled"),
    }

    match GoogleCloudVoice::from_settings(settings) {
        Ok(voice) => {
            let voice = Arc::new(voice);
            state.translator = Some(voice.clone());
            state.speech = Some(voice);
        }
        Err(e) => tracing::warn!(error = %e, "translation and speech disabled"),
    }

    match HttpRssProvider::from_env() {
        Ok(news) => state.news = Some(Arc::new(news)),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "news provider disabled");
        }
    }

    state
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
