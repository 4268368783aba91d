//! Duel registry: the caller-facing surface of the engine.
//!
//! Each mutating call is a read-modify-write of one duel performed under that
//! duel's own lock, so the two parties can race (for example both committing
//! at once) without either write being lost. Different duels never contend.

use crate::crypto::{Commitment, Secret};
use crate::duel::{Duel, DuelStatus};
use crate::error::{DuelError, StoreError};
use crate::protocol::{DuelId, PartyId};
use crate::store::{DuelChange, DuelStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// Keyed collection of duels over a persistence collaborator
pub struct DuelRegistry<S> {
    store: S,
    locks: Mutex<HashMap<DuelId, Arc<AsyncMutex<()>>>>,
}

impl<S: DuelStore> DuelRegistry<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Change feed of the underlying store
    pub fn subscribe(&self) -> broadcast::Receiver<DuelChange> {
        self.store.subscribe()
    }

    /// Flush the underlying store
    pub async fn flush(&self) -> Result<(), DuelError> {
        Ok(self.store.flush().await?)
    }

    async fn lock(&self, id: &DuelId) -> Result<OwnedMutexGuard<()>, DuelError> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|_| StoreError::Unavailable("registry lock table poisoned".into()))?;
            locks.entry(*id).or_default().clone()
        };
        Ok(lock.lock_owned().await)
    }

    /// Drop a duel's lock entry once nobody holds or awaits it. Call only
    /// after the caller's own guard is gone.
    fn release(&self, id: &DuelId) {
        if let Ok(mut locks) = self.locks.lock() {
            if locks.get(id).is_some_and(|l| Arc::strong_count(l) == 1) {
                locks.remove(id);
            }
        }
    }

    /// Apply a transition to the stored snapshot and persist the result.
    /// Nothing is written when the transition is rejected.
    async fn update<F>(&self, id: &DuelId, op: &'static str, transition: F) -> Result<Duel, DuelError>
    where
        F: FnOnce(&Duel) -> Result<Duel, DuelError>,
    {
        let guard = self.lock(id).await?;
        let result = self.apply(id, op, transition).await;
        drop(guard);
        self.release(id);
        result
    }

    async fn apply<F>(&self, id: &DuelId, op: &'static str, transition: F) -> Result<Duel, DuelError>
    where
        F: FnOnce(&Duel) -> Result<Duel, DuelError>,
    {
        let current = self
            .store
            .get(id)
            .await?
            .ok_or(DuelError::NotFound(*id))?;

        let next = transition(&current).map_err(|e| {
            warn!("Rejected {} on duel {}: {}", op, id, e);
            e
        })?;

        self.store.put(&next).await?;

        if next.status() != current.status() {
            info!(
                "Duel {} {}: {} -> {}",
                id,
                op,
                current.status(),
                next.status()
            );
        } else {
            debug!("Duel {} {} (still {})", id, op, next.status());
        }
        Ok(next)
    }

    // === Operations ===

    pub async fn create_duel(&self, creator: PartyId, stake: u64) -> Result<Duel, DuelError> {
        let duel = Duel::create(creator, stake)?;
        let guard = self.lock(&duel.id()).await?;
        let stored = self.store.put(&duel).await;
        drop(guard);
        self.release(&duel.id());
        stored?;

        info!(
            "Created duel {} by {} with stake {}",
            duel.id(),
            duel.creator(),
            duel.stake()
        );
        Ok(duel)
    }

    pub async fn join_duel(&self, id: &DuelId, opponent: PartyId) -> Result<Duel, DuelError> {
        self.update(id, "join", |duel| duel.join(opponent)).await
    }

    pub async fn submit_commitment(
        &self,
        id: &DuelId,
        party: &PartyId,
        commitment: Commitment,
    ) -> Result<Duel, DuelError> {
        self.update(id, "commit", |duel| duel.submit_commitment(party, commitment))
            .await
    }

    pub async fn submit_reveal(
        &self,
        id: &DuelId,
        party: &PartyId,
        allocation: &[i64],
        secret: Secret,
    ) -> Result<Duel, DuelError> {
        self.update(id, "reveal", |duel| {
            duel.submit_reveal(party, allocation, secret)
        })
        .await
    }

    pub async fn advance_round(&self, id: &DuelId) -> Result<Duel, DuelError> {
        let duel = self
            .update(id, "advance", |duel| duel.reveal_next_round())
            .await?;

        if let Some(round) = duel.revealed_rounds().last() {
            debug!(
                "Duel {} round {}: {} vs {} -> {:?}",
                id, round.round, round.creator_power, round.opponent_power, round.outcome
            );
        }
        if let Some(winner) = duel.winner() {
            info!("Duel {} won by {}", id, winner);
        }
        Ok(duel)
    }

    pub async fn get_duel(&self, id: &DuelId) -> Result<Duel, DuelError> {
        self.store
            .get(id)
            .await?
            .ok_or(DuelError::NotFound(*id))
    }

    /// Duels still waiting for an opponent, most recent first
    pub async fn list_open_duels(&self) -> Result<Vec<Duel>, DuelError> {
        let mut duels: Vec<Duel> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|d| d.status() == DuelStatus::Waiting)
            .collect();
        sort_recent_first(&mut duels);
        Ok(duels)
    }

    /// Duels a party created or joined, most recent first
    pub async fn list_duels_for(&self, party: &PartyId) -> Result<Vec<Duel>, DuelError> {
        let mut duels: Vec<Duel> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|d| d.is_participant(party))
            .collect();
        sort_recent_first(&mut duels);
        Ok(duels)
    }

    /// Administrative removal of a duel record
    pub async fn delete_duel(&self, id: &DuelId) -> Result<(), DuelError> {
        let guard = self.lock(id).await?;
        let existed = self.store.delete(id).await;
        drop(guard);
        self.release(id);

        if existed? {
            info!("Deleted duel {}", id);
            Ok(())
        } else {
            Err(DuelError::NotFound(*id))
        }
    }
}

/// Newest first; equal timestamps fall back to id order so listings are stable
fn sort_recent_first(duels: &mut [Duel]) {
    duels.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    });
}
