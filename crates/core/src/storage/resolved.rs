use crate::engine::lifecycle::ResolvedSet;
use crate::storage::ResolvedStore;
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct PgResolvedStore {
    pool: sqlx::PgPool,
    user_id: String,
}

impl PgResolvedStore {
    pub fn new(pool: sqlx::PgPool, user_id: impl Into<String>) -> Self {
        Self {
            pool,
            user_id: user_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl ResolvedStore for PgResolvedStore {
    async fn load_resolved_ids(&self) -> anyhow::Result<ResolvedSet> {
        let ids: Option<Vec<String>> =
            sqlx::query_scalar("SELECT alert_ids FROM resolved_alerts WHERE user_id = $1")
                .bind(&self.user_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("load resolved alerts failed (user_id={})", self.user_id))?;
        Ok(ResolvedSet::from_ids(ids.unwrap_or_default()))
    }

    async fn save_resolved_ids(&self, ids: &ResolvedSet) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO resolved_alerts (user_id, alert_ids, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (user_id) DO UPDATE SET alert_ids = EXCLUDED.alert_ids, updated_at = now()",
        )
        .bind(&self.user_id)
        .bind(ids.to_vec())
        .execute(&self.pool)
        .await
        .with_context(|| format!("save resolved alerts failed (user_id={})", self.user_id))?;
        Ok(())
    }
}
