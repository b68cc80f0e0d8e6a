//! In-memory trail store.
//!
//! Used when no database is configured and by integration tests. Holds every
//! trail behind a single `RwLock`; each operation is atomic per call.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{TrailRepository, TrailRepositoryError};
use crate::domain::{Trail, TrailId};

/// `TrailRepository` backed by a map in process memory.
#[derive(Debug, Default)]
pub struct InMemoryTrailRepository {
    trails: RwLock<BTreeMap<TrailId, Trail>>,
}

impl InMemoryTrailRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored trails.
    pub async fn len(&self) -> usize {
        self.trails.read().await.len()
    }

    /// Whether the store holds no trails.
    pub async fn is_empty(&self) -> bool {
        self.trails.read().await.is_empty()
    }
}

#[async_trait]
impl TrailRepository for InMemoryTrailRepository {
    async fn insert(&self, trail: &Trail) -> Result<(), TrailRepositoryError> {
        let mut trails = self.trails.write().await;
        if trails.contains_key(trail.id()) {
            return Err(TrailRepositoryError::conflict(trail.id().as_str()));
        }
        trails.insert(trail.id().clone(), trail.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TrailId) -> Result<Option<Trail>, TrailRepositoryError> {
        Ok(self.trails.read().await.get(id).cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<Trail>, TrailRepositoryError> {
        let mut trails: Vec<Trail> = self.trails.read().await.values().cloned().collect();
        trails.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(a.id()))
        });
        Ok(trails)
    }

    async fn replace(&self, trail: &Trail) -> Result<bool, TrailRepositoryError> {
        let mut trails = self.trails.write().await;
        match trails.get_mut(trail.id()) {
            Some(slot) => {
                *slot = trail.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &TrailId) -> Result<bool, TrailRepositoryError> {
        Ok(self.trails.write().await.remove(id).is_some())
    }

    async fn ping(&self) -> Result<(), TrailRepositoryError> {
        Ok(())
    }
}
