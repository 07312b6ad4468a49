//! In-process stores for tests and database-less runs.

use crate::domain::contract::ProfileDocument;
use crate::domain::profile::Profile;
use crate::engine::lifecycle::ResolvedSet;
use crate::storage::{ProfileStore, ResolvedStore};
use std::sync::{Mutex, MutexGuard};

fn guard<T>(m: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    m.lock()
        .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))
}

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    doc: Mutex<ProfileDocument>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: ProfileDocument) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }

    pub fn document(&self) -> anyhow::Result<ProfileDocument> {
        Ok(guard(&self.doc)?.clone())
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load_profile(&self) -> anyhow::Result<Profile> {
        Ok(guard(&self.doc)?.to_profile())
    }

    async fn save_profile(&self, patch: &ProfileDocument) -> anyhow::Result<()> {
        guard(&self.doc)?.merge(patch);
        Ok(())
    }

    async fn replace_profile(&self, profile: &Profile) -> anyhow::Result<()> {
        *guard(&self.doc)? = ProfileDocument::from_profile(profile);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryResolvedStore {
    ids: Mutex<ResolvedSet>,
}

impl MemoryResolvedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(ids: ResolvedSet) -> Self {
        Self {
            ids: Mutex::new(ids),
        }
    }
}

#[async_trait::async_trait]
impl ResolvedStore for MemoryResolvedStore {
    async fn load_resolved_ids(&self) -> anyhow::Result<ResolvedSet> {
        Ok(guard(&self.ids)?.clone())
    }

    async fn save_resolved_ids(&self, ids: &ResolvedSet) -> anyhow::Result<()> {
        *guard(&self.ids)? = ids.clone();
        Ok(())
    }
}
