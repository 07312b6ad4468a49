use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use sentinel_core::config::DEFAULT_INFINITE_RUNWAY_THRESHOLD_DAYS;
use sentinel_core::domain::advice::AdviceEntry;
use sentinel_core::domain::alert::{Alert, AlertCategory};
use sentinel_core::domain::contract::ProfileDocument;
use sentinel_core::domain::metrics::{DashboardStatus, Metrics};
use sentinel_core::domain::profile::{Profile, UserType, WalletSummary};
use sentinel_core::engine::narration::Language;
use sentinel_core::llm::{dashboard_insight, InsightClient, InsightInput};
use sentinel_core::news::{collect_headlines, select_feeds, NewsProvider, NewsSection, NewsSettings};
use sentinel_core::provider::Degraded;
use sentinel_core::session::Session;
use sentinel_core::storage::{reset_user, ProfileStore, ResolvedStore};
use sentinel_core::voice::{render_briefing, SpeechSynthesizer, Translator};

/// Shared handler state. Missing stores put the API in degraded mode (503);
/// missing collaborators degrade the single feature that needs them.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Option<Arc<dyn ProfileStore>>,
    pub resolved: Option<Arc<dyn ResolvedStore>>,
    pub insight: Option<Arc<dyn InsightClient>>,
    pub translator: Option<Arc<dyn Translator>>,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub news: Option<Arc<dyn NewsProvider>>,
    pub news_settings: NewsSettings,
    pub infinite_threshold_days: i64,
}

impl AppState {
    pub fn new(profiles: Arc<dyn ProfileStore>, resolved: Arc<dyn ResolvedStore>) -> Self {
        Self {
            profiles: Some(profiles),
            resolved: Some(resolved),
            ..Self::degraded()
        }
    }

    /// No stores, no collaborators.
    pub fn degraded() -> Self {
        Self {
            profiles: None,
            resolved: None,
            insight: None,
            translator: None,
            speech: None,
            news: None,
            news_settings: NewsSettings::default(),
            infinite_threshold_days: DEFAULT_INFINITE_RUNWAY_THRESHOLD_DAYS,
        }
    }

    fn stores(&self) -> Result<(&dyn ProfileStore, &dyn ResolvedStore), StatusCode> {
        match (&self.profiles, &self.resolved) {
            (Some(p), Some(r)) => Ok((p.as_ref(), r.as_ref())),
            _ => Err(StatusCode::SERVICE_UNAVAILABLE),
        }
    }

    async fn session(&self) -> Result<Session, StatusCode> {
        let (profiles, resolved) = self.stores()?;
        Session::load(profiles, resolved).await.map_err(store_error)
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/profile",
            get(get_profile)
                .put(put_profile)
                .patch(patch_profile)
                .delete(reset_profile),
        )
        .route("/notes", get(get_note).put(put_note))
        .route("/metrics", get(get_metrics))
        .route("/status", get(get_status))
        .route("/alerts", get(get_alerts))
        .route("/alerts/:id/resolve", post(resolve_alert))
        .route("/alerts/resolved", delete(clear_resolved))
        .route("/advice", get(get_advice))
        .route("/narration/:id", get(get_narration))
        .route("/narration/:id/audio", get(get_narration_audio))
        .route("/insight", get(get_insight))
        .route("/news", get(get_news))
        .route("/wallet/spend", post(wallet_spend))
        .route("/wallet/cash", post(wallet_cash))
        .route("/wallet/new-day", post(wallet_new_day))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn store_error(e: anyhow::Error) -> StatusCode {
    sentry_anyhow::capture_anyhow(&e);
    tracing::error!(error = %e, "profile store unavailable");
    StatusCode::SERVICE_UNAVAILABLE
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_profile(State(state): State<AppState>) -> Result<Json<Profile>, StatusCode> {
    let session = state.session().await?;
    Ok(Json(session.profile().clone()))
}

/// Wholesale replacement from a (loosely typed) setup form.
async fn put_profile(
    State(state): State<AppState>,
    Json(doc): Json<ProfileDocument>,
) -> Result<Json<Profile>, StatusCode> {
    let (profiles, _) = state.stores()?;
    let profile = doc.to_profile();
    profiles.replace_profile(&profile).await.map_err(store_error)?;
    tracing::info!(mode = profile.user_type.as_str(), "profile replaced");
    Ok(Json(profile))
}

async fn patch_profile(
    State(state): State<AppState>,
    Json(patch): Json<ProfileDocument>,
) -> Result<Json<Profile>, StatusCode> {
    let (profiles, _) = state.stores()?;
    profiles.save_profile(&patch).await.map_err(store_error)?;
    let profile = profiles.load_profile().await.map_err(store_error)?;
    Ok(Json(profile))
}

/// Demo reset: empty profile, no resolved alerts.
async fn reset_profile(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    let (profiles, resolved) = state.stores()?;
    reset_user(profiles, resolved).await.map_err(store_error)?;
    tracing::info!("profile reset");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
struct NoteBody {
    #[serde(default)]
    note: String,
}

async fn get_note(State(state): State<AppState>) -> Result<Json<NoteBody>, StatusCode> {
    let session = state.session().await?;
    if session.profile().user_type != UserType::Student {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(NoteBody {
        note: session.profile().student_note.clone().unwrap_or_default(),
    }))
}

/// Saves the student's lending log; an empty note clears it.
async fn put_note(
    State(state): State<AppState>,
    Json(body): Json<NoteBody>,
) -> Result<Json<NoteBody>, StatusCode> {
    let (profiles, _) = state.stores()?;
    let session = state.session().await?;
    if session.profile().user_type != UserType::Student {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut patch = ProfileDocument::new();
    patch.set("student_note", body.note.trim());
    profiles.save_profile(&patch).await.map_err(store_error)?;
    Ok(Json(NoteBody {
        note: body.note.trim().to_string(),
    }))
}

#[derive(Debug, Serialize)]
struct ApiMetrics {
    #[serde(flatten)]
    metrics: Metrics,
    runway_label: String,
    status: DashboardStatus,
}

async fn get_metrics(State(state): State<AppState>) -> Result<Json<ApiMetrics>, StatusCode> {
    let session = state.session().await?;
    let metrics = *session.metrics();
    Ok(Json(ApiMetrics {
        metrics,
        runway_label: metrics.runway.label(state.infinite_threshold_days),
        status: metrics.status(),
    }))
}

#[derive(Debug, Serialize)]
struct ApiStatus {
    status: DashboardStatus,
    label: &'static str,
    color: &'static str,
    risk_score: u8,
    runway_label: String,
    active_alerts: usize,
}

async fn get_status(State(state): State<AppState>) -> Result<Json<ApiStatus>, StatusCode> {
    let session = state.session().await?;
    let metrics = session.metrics();
    let status = metrics.status();
    Ok(Json(ApiStatus {
        status,
        label: status.label(),
        color: status.color(),
        risk_score: metrics.risk_score,
        runway_label: metrics.runway.label(state.infinite_threshold_days),
        active_alerts: session.active_alerts(false).len(),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct AlertsQuery {
    #[serde(default)]
    show_resolved: bool,
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiAlert {
    #[serde(flatten)]
    alert: Alert,
    urgency_label: &'static str,
    urgency_color: &'static str,
    resolved: bool,
}

impl ApiAlert {
    fn new(alert: Alert, session: &Session) -> Self {
        Self {
            urgency_label: alert.urgency_label(),
            urgency_color: alert.urgency_color(),
            resolved: session.is_resolved(&alert.id),
            alert,
        }
    }
}

async fn get_alerts(
    State(state): State<AppState>,
    Query(q): Query<AlertsQuery>,
) -> Result<Json<Vec<ApiAlert>>, StatusCode> {
    let session = state.session().await?;
    let alerts = match q.category.as_deref() {
        Some(raw) => {
            let category = AlertCategory::parse(raw).ok_or(StatusCode::BAD_REQUEST)?;
            let mut alerts = session.alerts_in_category(category);
            if !q.show_resolved {
                alerts.retain(|a| !session.is_resolved(&a.id));
            }
            alerts
        }
        None => session.active_alerts(q.show_resolved),
    };
    Ok(Json(
        alerts
            .into_iter()
            .map(|a| ApiAlert::new(a, &session))
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
struct ResolveResponse {
    id: String,
    newly_resolved: bool,
}

async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResolveResponse>, StatusCode> {
    let (_, resolved) = state.stores()?;
    let mut session = state.session().await?;
    let newly_resolved = session.mark_resolved(&id);
    session
        .persist_resolved(resolved)
        .await
        .map_err(store_error)?;
    Ok(Json(ResolveResponse { id, newly_resolved }))
}

async fn clear_resolved(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    let (_, resolved) = state.stores()?;
    let mut session = state.session().await?;
    session.clear_resolved();
    session
        .persist_resolved(resolved)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct ApiAdvice {
    #[serde(flatten)]
    entry: AdviceEntry,
    badge_color: &'static str,
}

async fn get_advice(State(state): State<AppState>) -> Result<Json<Vec<ApiAdvice>>, StatusCode> {
    let session = state.session().await?;
    Ok(Json(
        session
            .advice()
            .into_iter()
            .map(|entry| ApiAdvice {
                badge_color: entry.level.badge_color(),
                entry,
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
struct ApiNarration {
    id: String,
    script: String,
}

async fn get_narration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiNarration>, StatusCode> {
    let session = state.session().await?;
    let script = session
        .narrate(&id, state.infinite_threshold_days)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ApiNarration { id, script }))
}

#[derive(Debug, Default, Deserialize)]
struct AudioQuery {
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiAudio {
    id: String,
    language: Language,
    text: String,
    translation_fallback: bool,
    audio_mp3_base64: Degraded<String>,
}

async fn get_narration_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<AudioQuery>,
) -> Result<Json<ApiAudio>, StatusCode> {
    let language = match q.lang.as_deref() {
        Some(code) => Language::from_code(code).ok_or(StatusCode::BAD_REQUEST)?,
        None => Language::English,
    };
    let session = state.session().await?;
    let script = session
        .narrate(&id, state.infinite_threshold_days)
        .ok_or(StatusCode::NOT_FOUND)?;

    let rendered = render_briefing(
        &script,
        language,
        state.translator.as_deref(),
        state.speech.as_deref(),
    )
    .await;

    Ok(Json(ApiAudio {
        id,
        language,
        audio_mp3_base64: rendered.audio_base64(),
        text: rendered.text,
        translation_fallback: rendered.translation_fallback,
    }))
}

async fn get_insight(State(state): State<AppState>) -> Result<Json<Degraded<String>>, StatusCode> {
    let session = state.session().await?;
    let input = InsightInput {
        monthly_income: session.profile().monthly_income,
        metrics: *session.metrics(),
    };
    let insight = dashboard_insight(
        state.insight.as_deref(),
        &input,
        state.infinite_threshold_days,
    )
    .await;
    Ok(Json(insight))
}

async fn get_news(State(state): State<AppState>) -> Result<Json<Vec<NewsSection>>, StatusCode> {
    let session = state.session().await?;
    let feeds = select_feeds(session.profile(), &state.news_settings);
    let sections = match state.news.as_deref() {
        Some(provider) => {
            collect_headlines(provider, &feeds, state.news_settings.headline_limit).await
        }
        None => feeds
            .into_iter()
            .map(|source| NewsSection {
                source,
                headlines: Vec::new(),
            })
            .collect(),
    };
    Ok(Json(sections))
}

#[derive(Debug, Deserialize)]
struct AmountBody {
    amount: f64,
}

#[derive(Debug, Clone, Copy)]
enum WalletOp {
    Spend(f64),
    Cash(f64),
    NewDay,
}

async fn wallet_spend(
    State(state): State<AppState>,
    Json(body): Json<AmountBody>,
) -> Result<Json<WalletSummary>, StatusCode> {
    apply_wallet(&state, WalletOp::Spend(body.amount)).await
}

async fn wallet_cash(
    State(state): State<AppState>,
    Json(body): Json<AmountBody>,
) -> Result<Json<WalletSummary>, StatusCode> {
    apply_wallet(&state, WalletOp::Cash(body.amount)).await
}

async fn wallet_new_day(State(state): State<AppState>) -> Result<Json<WalletSummary>, StatusCode> {
    apply_wallet(&state, WalletOp::NewDay).await
}

/// Student-only wallet bookkeeping; only the wallet fields are written back.
async fn apply_wallet(state: &AppState, op: WalletOp) -> Result<Json<WalletSummary>, StatusCode> {
    let (profiles, _) = state.stores()?;
    let mut session = state.session().await?;
    if session.profile().user_type != UserType::Student {
        return Err(StatusCode::BAD_REQUEST);
    }

    let applied = session.update_profile(|p| match op {
        WalletOp::Spend(amount) => p.record_spend(amount),
        WalletOp::Cash(amount) => p.record_cash(amount),
        WalletOp::NewDay => {
            p.start_new_day();
            true
        }
    });
    if !applied {
        return Err(StatusCode::BAD_REQUEST);
    }

    let profile = session.profile();
    let mut patch = ProfileDocument::new();
    patch
        .set("savings_buffer", profile.savings_buffer)
        .set("today_spend", profile.today_spend);
    profiles.save_profile(&patch).await.map_err(store_error)?;

    tracing::debug!(?op, balance = profile.savings_buffer, "wallet updated");
    Ok(Json(profile.wallet_summary()))
}
