//! In-memory duel store.

use super::traits::{DuelChange, DuelStore, CHANGE_FEED_CAPACITY};
use crate::duel::Duel;
use crate::error::StoreError;
use crate::protocol::DuelId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// In-process duel store backed by a map
#[derive(Clone)]
pub struct MemoryStore {
    duels: Arc<RwLock<HashMap<DuelId, Duel>>>,
    changes: broadcast::Sender<DuelChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            duels: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    /// Number of stored duels
    pub fn len(&self) -> usize {
        self.duels.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".to_string())
}

#[async_trait]
impl DuelStore for MemoryStore {
    async fn get(&self, id: &DuelId) -> Result<Option<Duel>, StoreError> {
        Ok(self.duels.read().map_err(poisoned)?.get(id).cloned())
    }

    async fn put(&self, duel: &Duel) -> Result<(), StoreError> {
        self.duels
            .write()
            .map_err(poisoned)?
            .insert(duel.id(), duel.clone());

        // No receivers is fine
        let _ = self.changes.send(DuelChange {
            duel_id: duel.id(),
            status: Some(duel.status()),
        });
        Ok(())
    }

    async fn delete(&self, id: &DuelId) -> Result<bool, StoreError> {
        let existed = self.duels.write().map_err(poisoned)?.remove(id).is_some();
        if existed {
            let _ = self.changes.send(DuelChange {
                duel_id: *id,
                status: None,
            });
        }
        Ok(existed)
    }

    async fn list(&self) -> Result<Vec<Duel>, StoreError> {
        Ok(self
            .duels
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<DuelChange> {
        self.changes.subscribe()
    }
}
