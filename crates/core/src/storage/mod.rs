//! Persistence: profile documents, resolved alert ids, alert snapshots.

pub mod lock;
pub mod memory;
pub mod profiles;
pub mod resolved;
pub mod snapshots;

use crate::domain::contract::ProfileDocument;
use crate::domain::profile::Profile;
use crate::engine::lifecycle::ResolvedSet;
use anyhow::Context;

pub use memory::{MemoryProfileStore, MemoryResolvedStore};
pub use profiles::PgProfileStore;
pub use resolved::PgResolvedStore;

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// Starts the user over: an empty profile and no resolved alerts.
pub async fn reset_user(
    profiles: &dyn ProfileStore,
    resolved: &dyn ResolvedStore,
) -> anyhow::Result<()> {
    profiles
        .replace_profile(&Profile::default())
        .await
        .context("reset profile")?;
    resolved
        .save_resolved_ids(&ResolvedSet::default())
        .await
        .context("reset resolved alert ids")?;
    Ok(())
}

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// An absent profile loads as the default.
    async fn load_profile(&self) -> anyhow::Result<Profile>;

    /// Merges `patch` into the stored document; last write wins per field.
    async fn save_profile(&self, patch: &ProfileDocument) -> anyhow::Result<()>;

    /// Replaces the stored document wholesale.
    async fn replace_profile(&self, profile: &Profile) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait ResolvedStore: Send + Sync {
    async fn load_resolved_ids(&self) -> anyhow::Result<ResolvedSet>;

    async fn save_resolved_ids(&self, ids: &ResolvedSet) -> anyhow::Result<()>;
}
