//! Persistence collaborator trait definition.

use crate::duel::{Duel, DuelStatus};
use crate::error::StoreError;
use crate::protocol::DuelId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of each store's change feed before slow receivers start lagging
pub const CHANGE_FEED_CAPACITY: usize = 256;

/// Notification that a duel record changed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelChange {
    pub duel_id: DuelId,
    /// New status, or `None` when the record was deleted
    pub status: Option<DuelStatus>,
}

/// Keyed storage for duel snapshots
///
/// Implementations:
/// - MemoryStore for tests and single-process deployments
/// - FileStore for durable storage
///
/// A `put` must be visible to any later `get` of the same key. Nothing is
/// promised across keys.
#[async_trait]
pub trait DuelStore: Send + Sync {
    /// Fetch a duel snapshot
    async fn get(&self, id: &DuelId) -> Result<Option<Duel>, StoreError>;

    /// Replace the stored snapshot atomically
    async fn put(&self, duel: &Duel) -> Result<(), StoreError>;

    /// Remove a duel; returns whether it existed
    async fn delete(&self, id: &DuelId) -> Result<bool, StoreError>;

    /// All stored duels, in no particular order
    async fn list(&self) -> Result<Vec<Duel>, StoreError>;

    /// Subscribe to change notifications. Lagging receivers miss
    /// notifications but can always re-read the record.
    fn subscribe(&self) -> broadcast::Receiver<DuelChange>;

    /// Make every completed `put` durable
    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Lets a registry run over a store chosen at runtime
#[async_trait]
impl<T: DuelStore + ?Sized> DuelStore for Arc<T> {
    async fn get(&self, id: &DuelId) -> Result<Option<Duel>, StoreError> {
        (**self).get(id).await
    }

    async fn put(&self, duel: &Duel) -> Result<(), StoreError> {
        (**self).put(duel).await
    }

    async fn delete(&self, id: &DuelId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn list(&self) -> Result<Vec<Duel>, StoreError> {
        (**self).list().await
    }

    fn subscribe(&self) -> broadcast::Receiver<DuelChange> {
        (**self).subscribe()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        (**self).flush().await
    }
}
