use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use sentinel_api::{app_router, AppState};
use sentinel_core::domain::contract::ProfileDocument;
use sentinel_core::storage::{MemoryProfileStore, MemoryResolvedStore};

fn household_doc() -> ProfileDocument {
    ProfileDocument::from_value(json!({
        "user_type": "Standard",
        "monthly_income": 20000,
        "rent": 8000,
        "food": 5000,
        "transport": 2000,
        "utilities": 1500,
        "emi_total": 3000,
        "savings_buffer": 20000
    }))
}

fn router_with(doc: ProfileDocument) -> Router {
    let state = AppState::new(
        Arc::new(MemoryProfileStore::with_document(doc)),
        Arc::new(MemoryResolvedStore::new()),
    );
    app_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(req.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn ids(alerts: &Value) -> Vec<&str> {
    alerts
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn metrics_for_reference_household() {
    let app = router_with(household_doc());
    let (status, body) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["burn"], 19500.0);
    assert_eq!(body["net_savings"], 500.0);
    assert_eq!(body["daily_burn"], 650.0);
    assert_eq!(body["runway"], json!({"days": 30}));
    assert_eq!(body["risk_score"], 50);
    assert_eq!(body["runway_label"], "30 Days");
    assert_eq!(body["status"], "MONITORING_RISKS");
}

#[tokio::test]
async fn resolving_hides_alert_until_cleared() {
    let app = router_with(household_doc());

    let (_, alerts) = send(&app, Method::GET, "/alerts", None).await;
    assert_eq!(ids(&alerts), vec!["fuel_spike", "rate_hike", "inflation"]);
    assert_eq!(alerts[1]["urgency_label"], "Immediate 0–48hrs");

    let (status, body) = send(&app, Method::POST, "/alerts/fuel_spike/resolve", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newly_resolved"], true);

    let (_, alerts) = send(&app, Method::GET, "/alerts", None).await;
    assert_eq!(ids(&alerts), vec!["rate_hike", "inflation"]);

    let (_, alerts) = send(&app, Method::GET, "/alerts?show_resolved=true", None).await;
    assert_eq!(ids(&alerts), vec!["fuel_spike", "rate_hike", "inflation"]);
    assert_eq!(alerts[0]["resolved"], true);

    let (status, _) = send(&app, Method::DELETE, "/alerts/resolved", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, alerts) = send(&app, Method::GET, "/alerts", None).await;
    assert_eq!(alerts.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn category_filter() {
    let app = router_with(household_doc());
    let (_, alerts) = send(&app, Method::GET, "/alerts?category=credit", None).await;
    assert_eq!(ids(&alerts), vec!["rate_hike"]);

    let (status, _) = send(&app, Method::GET, "/alerts?category=weather", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_merges_and_recomputes() {
    let app = router_with(household_doc());
    let (status, profile) = send(
        &app,
        Method::PATCH,
        "/profile",
        Some(json!({"savings_buffer": 3250})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["monthly_income"], 20000.0);

    let (_, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(body["status"], "CRITICAL_THREATS");
    assert_eq!(body["runway_label"], "5 Days");
}

#[tokio::test]
async fn narration_and_degraded_collaborators() {
    let app = router_with(household_doc());

    let (status, body) = send(&app, Method::GET, "/narration/rate_hike", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["script"].as_str().unwrap().contains("This is a warning update."));

    let (status, _) = send(&app, Method::GET, "/narration/farm_inputs", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/narration/rate_hike/audio?lang=hi", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translation_fallback"], true);
    assert_eq!(body["audio_mp3_base64"]["status"], "unavailable");

    let (status, _) = send(&app, Method::GET, "/narration/rate_hike/audio?lang=fr", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/insight", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unavailable");
    assert_eq!(body["data"]["retry_later"], false);
}

#[tokio::test]
async fn news_without_provider_lists_feeds() {
    let app = router_with(household_doc());
    let (status, body) = send(&app, Method::GET, "/news", None).await;
    assert_eq!(status, StatusCode::OK);
    let sections = body.as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["source"]["url"], "https://www.rbi.org.in/pressreleases_rss.xml");
    assert_eq!(sections[1]["source"]["kind"], "link");
}

#[tokio::test]
async fn student_wallet_flow() {
    let doc = ProfileDocument::from_value(json!({
        "user_type": "Student",
        "daily_limit": 200,
        "savings_buffer": 1000,
        "study_stream": "CSE / Tech"
    }));
    let app = router_with(doc);

    let (status, wallet) = send(&app, Method::POST, "/wallet/spend", Some(json!({"amount": 150}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wallet["balance"], 850.0);
    assert_eq!(wallet["safe_to_spend"], 50.0);
    assert_eq!(wallet["over_limit"], false);

    let (status, _) = send(&app, Method::POST, "/wallet/cash", Some(json!({"amount": -5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, wallet) = send(&app, Method::POST, "/wallet/new-day", None).await;
    assert_eq!(wallet["spent_today"], 0.0);
    assert_eq!(wallet["balance"], 850.0);

    let (_, briefing) = send(&app, Method::GET, "/narration/daily_motivation", None).await;
    assert!(briefing["script"].as_str().unwrap().contains("Show me the code"));
}

#[tokio::test]
async fn wallet_overdraft_survives_reload() {
    let doc = ProfileDocument::from_value(json!({
        "user_type": "Student",
        "daily_limit": 200,
        "savings_buffer": 500
    }));
    let app = router_with(doc);

    let (_, wallet) = send(&app, Method::POST, "/wallet/spend", Some(json!({"amount": 600}))).await;
    assert_eq!(wallet["balance"], -100.0);

    let (_, profile) = send(&app, Method::GET, "/profile", None).await;
    assert_eq!(profile["savings_buffer"], -100.0);

    let (_, wallet) = send(&app, Method::POST, "/wallet/cash", Some(json!({"amount": 200}))).await;
    assert_eq!(wallet["balance"], 100.0);
}

#[tokio::test]
async fn student_note_is_saved_and_narrated() {
    let doc = ProfileDocument::from_value(json!({"user_type": "Student", "daily_limit": 200}));
    let app = router_with(doc);

    let (status, _) = send(&app, Method::GET, "/narration/student_note", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/notes",
        Some(json!({"note": "Gave ₹500 to Rahul "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"], "Gave ₹500 to Rahul");

    let (_, body) = send(&app, Method::GET, "/notes", None).await;
    assert_eq!(body["note"], "Gave ₹500 to Rahul");

    let (status, body) = send(&app, Method::GET, "/narration/student_note", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["script"].as_str().unwrap().contains("Gave ₹500 to Rahul."));

    let app = router_with(household_doc());
    let (status, _) = send(&app, Method::PUT, "/notes", Some(json!({"note": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_clears_profile_and_resolved_alerts() {
    let app = router_with(household_doc());
    send(&app, Method::POST, "/alerts/fuel_spike/resolve", None).await;

    let (status, _) = send(&app, Method::DELETE, "/profile", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(body["runway"], "infinite");
    assert_eq!(body["burn"], 0.0);

    let (_, alerts) = send(&app, Method::GET, "/alerts", None).await;
    assert_eq!(ids(&alerts), vec!["inflation"]);

    // Same household again: the previously resolved alert is back.
    send(&app, Method::PUT, "/profile", Some(household_doc().into_value())).await;
    let (_, alerts) = send(&app, Method::GET, "/alerts", None).await;
    assert_eq!(ids(&alerts), vec!["fuel_spike", "rate_hike", "inflation"]);
}

#[tokio::test]
async fn wallet_rejects_standard_profiles() {
    let app = router_with(household_doc());
    let (status, _) = send(&app, Method::POST, "/wallet/new-day", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_stores_return_503() {
    let app = app_router(AppState::degraded());
    let (status, _) = send(&app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/alerts", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
