use crate::domain::contract::ProfileDocument;
use crate::domain::profile::Profile;
use crate::storage::ProfileStore;
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct PgProfileStore {
    pool: sqlx::PgPool,
    user_id: String,
}

impl PgProfileStore {
    pub fn new(pool: sqlx::PgPool, user_id: impl Into<String>) -> Self {
        Self {
            pool,
            user_id: user_id.into(),
        }
    }

    pub async fn load_document(&self) -> anyhow::Result<ProfileDocument> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM profiles WHERE user_id = $1")
                .bind(&self.user_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("load profile failed (user_id={})", self.user_id))?;
        Ok(doc.map(ProfileDocument::from_value).unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgProfileStore {
    async fn load_profile(&self) -> anyhow::Result<Profile> {
        Ok(self.load_document().await?.to_profile())
    }

    async fn save_profile(&self, patch: &ProfileDocument) -> anyhow::Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO profiles (user_id, doc, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (user_id) DO UPDATE SET doc = profiles.doc || EXCLUDED.doc, updated_at = now()",
        )
        .bind(&self.user_id)
        .bind(sqlx::types::Json(patch))
        .execute(&self.pool)
        .await
        .with_context(|| format!("merge profile failed (user_id={})", self.user_id))?;
        Ok(())
    }

    async fn replace_profile(&self, profile: &Profile) -> anyhow::Result<()> {
        let doc = ProfileDocument::from_profile(profile);
        sqlx::query(
            "INSERT INTO profiles (user_id, doc, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (user_id) DO UPDATE SET doc = EXCLUDED.doc, updated_at = now()",
        )
        .bind(&self.user_id)
        .bind(sqlx::types::Json(&doc))
        .execute(&self.pool)
        .await
        .with_context(|| format!("replace profile failed (user_id={})", self.user_id))?;
        Ok(())
    }
}
