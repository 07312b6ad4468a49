use crate::domain::alert::Alert;
use crate::domain::metrics::Metrics;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The full generated alert list for one scan, with the metrics it came from.
/// Resolution state is not part of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSnapshot {
    pub id: uuid::Uuid,
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    pub metrics: Metrics,
    pub alerts: Vec<Alert>,
    pub insight: Option<String>,
}

impl AlertSnapshot {
    pub fn new(
        user_id: impl Into<String>,
        generated_at: DateTime<Utc>,
        metrics: Metrics,
        alerts: Vec<Alert>,
        insight: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            user_id: user_id.into(),
            generated_at,
            metrics,
            alerts,
            insight,
        }
    }
}

pub async fn publish_alert_snapshot(
    pool: &sqlx::PgPool,
    snapshot: &AlertSnapshot,
) -> anyhow::Result<uuid::Uuid> {
    let id: uuid::Uuid = sqlx::query_scalar(
        "INSERT INTO alert_snapshots (id, user_id, generated_at, metrics, alerts, insight) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(snapshot.id)
    .bind(&snapshot.user_id)
    .bind(snapshot.generated_at)
    .bind(sqlx::types::Json(&snapshot.metrics))
    .bind(sqlx::types::Json(&snapshot.alerts))
    .bind(&snapshot.insight)
    .fetch_one(pool)
    .await
    .with_context(|| format!("insert alert_snapshots failed (user_id={})", snapshot.user_id))?;
    Ok(id)
}

type SnapshotRow = (
    uuid::Uuid,
    String,
    DateTime<Utc>,
    sqlx::types::Json<Metrics>,
    sqlx::types::Json<Vec<Alert>>,
    Option<String>,
);

pub async fn latest_snapshot(
    pool: &sqlx::PgPool,
    user_id: &str,
) -> anyhow::Result<Option<AlertSnapshot>> {
    let row: Option<SnapshotRow> = sqlx::query_as(
        "SELECT id, user_id, generated_at, metrics, alerts, insight FROM alert_snapshots \
         WHERE user_id = $1 ORDER BY generated_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("load latest alert snapshot failed (user_id={user_id})"))?;

    Ok(row.map(
        |(id, user_id, generated_at, metrics, alerts, insight)| AlertSnapshot {
            id,
            user_id,
            generated_at,
            metrics: metrics.0,
            alerts: alerts.0,
            insight,
        },
    ))
}
