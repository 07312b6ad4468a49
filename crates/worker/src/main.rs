use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel_core::config::Settings;
use sentinel_core::domain::contract::ProfileDocument;
use sentinel_core::engine::lifecycle::ResolvedSet;
use sentinel_core::llm::gemini::GeminiClient;
use sentinel_core::llm::{dashboard_insight, InsightClient, InsightInput};
use sentinel_core::provider::Degraded;
use sentinel_core::session::Session;
use sentinel_core::storage::snapshots::{publish_alert_snapshot, AlertSnapshot};
use sentinel_core::storage::{lock, PgProfileStore, PgResolvedStore};

#[derive(Debug, Parser)]
#[command(name = "sentinel_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate the stored profile and publish an alert snapshot.
    Scan {
        /// Do everything except writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Ask the insight provider for a one-line summary.
        #[arg(long)]
        with_insight: bool,
    },
    /// Evaluate a profile JSON file offline and print the result.
    Evaluate {
        #[arg(long)]
        profile: PathBuf,
    },
}

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

    let args = Args::parse();
    let res = match args.command {
        Command::Scan {
            dry_run,
            with_insight,
        } => scan(&settings, dry_run, with_insight).await,
        Command::Evaluate { profile } => evaluate(&settings, &profile),
    };

    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "worker run failed");
    }
    res
}

async fn scan(settings: &Settings, dry_run: bool, with_insight: bool) -> anyhow::Result<()> {
    let user_id = settings.user_id.as_str();
    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    sentinel_core::storage::migrate(&pool).await?;

    let acquired = lock::try_acquire_scan_lock(&pool, user_id).await?;
    if !acquired {
        tracing::warn!(user_id, "scan lock not acquired; another scan in progress");
        return Ok(());
    }

    let res = run_scan(settings, &pool, dry_run, with_insight).await;

    if let Err(e) = lock::release_scan_lock(&pool, user_id).await {
        tracing::warn!(user_id, error = %e, "failed to release scan lock");
    }
    res
}

async fn run_scan(
    settings: &Settings,
    pool: &sqlx::PgPool,
    dry_run: bool,
    with_insight: bool,
) -> anyhow::Result<()> {
    let user_id = settings.user_id.as_str();
    let profiles = PgProfileStore::new(pool.clone(), user_id);
    let resolved = PgResolvedStore::new(pool.clone(), user_id);
    let session = Session::load(&profiles, &resolved).await?;

    let metrics = *session.metrics();
    let alerts = session.alerts();

    let insight = if with_insight {
        let client = match GeminiClient::from_settings(settings) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(error = %e, "insight requested but provider not configured");
                None
            }
        };
        let input = InsightInput {
            monthly_income: session.profile().monthly_income,
            metrics,
        };
        match dashboard_insight(
            client.as_ref().map(|c| c as &dyn InsightClient),
            &input,
            settings.infinite_runway_threshold_days,
        )
        .await
        {
            Degraded::Available(text) => Some(text),
            Degraded::Unavailable { reason, .. } => {
                tracing::warn!(%reason, "insight unavailable; publishing without it");
                None
            }
        }
    } else {
        None
    };

    let snapshot = AlertSnapshot::new(
        user_id,
        chrono::Utc::now(),
        metrics,
        alerts,
        insight,
    );

    if dry_run {
        tracing::info!(
            user_id,
            dry_run = true,
            alerts_len = snapshot.alerts.len(),
            risk_score = metrics.risk_score,
            status = metrics.status().label(),
            "deep scan complete (dry-run)"
        );
        return Ok(());
    }

    let snapshot_id = publish_alert_snapshot(pool, &snapshot).await?;
    tracing::info!(
        user_id,
        %snapshot_id,
        alerts_len = snapshot.alerts.len(),
        risk_score = metrics.risk_score,
        "published alert snapshot"
    );
    Ok(())
}

fn evaluate(settings: &Settings, path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("profile file is not valid JSON: {}", path.display()))?;

    let session = Session::new(
        ProfileDocument::from_value(value).to_profile(),
        ResolvedSet::default(),
    );
    let metrics = session.metrics();

    let out = serde_json::json!({
        "metrics": metrics,
        "runway_label": metrics.runway.label(settings.infinite_runway_threshold_days),
        "status": metrics.status(),
        "alerts": session.ranked_alerts(),
        "advice": session.advice(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
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
