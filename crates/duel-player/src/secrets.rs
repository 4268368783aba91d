//! Client-side secret store.
//!
//! The service only ever sees commitments; the allocation and secret behind
//! each one stay here until the party reveals. A duel may hold several
//! candidate openings while a commit is being retried. Whichever one the
//! service accepted is the one revealed.

use duel_core::duel::TOTAL_BUDGET;
use duel_core::{commit, generate_secret, Allocation, Commitment, DuelId, Secret};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// What a party needs to open its commitment later
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingReveal {
    pub allocation: Allocation,
    pub secret: Secret,
    pub commitment: Commitment,
}

/// Per-party mapping from duel to the candidate openings of its commitment
#[derive(Clone, Default)]
pub struct SecretStore {
    entries: Arc<RwLock<HashMap<DuelId, Vec<PendingReveal>>>>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opening to publish for `allocation` in this duel.
    ///
    /// Retrying the same allocation reuses its secret, so a commitment the
    /// service accepted without the caller hearing back stays openable. A
    /// different allocation gets a fresh secret alongside the earlier ones.
    pub fn prepare(&self, duel_id: DuelId, allocation: Allocation) -> PendingReveal {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let candidates = entries.entry(duel_id).or_default();
        if let Some(existing) = candidates.iter().find(|p| p.allocation == allocation) {
            return existing.clone();
        }

        let secret = generate_secret();
        let commitment = commit(&allocation, &secret);
        let pending = PendingReveal {
            allocation,
            secret,
            commitment,
        };
        candidates.push(pending.clone());
        pending
    }

    /// Keep only the opening of `commitment`, the one the service holds
    pub fn confirm(&self, duel_id: &DuelId, commitment: &Commitment) -> Option<PendingReveal> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let candidates = entries.get_mut(duel_id)?;
        let accepted = candidates
            .iter()
            .find(|p| p.commitment == *commitment)?
            .clone();
        *candidates = vec![accepted.clone()];
        Some(accepted)
    }

    /// The opening for a duel, if exactly one candidate is left
    pub fn get(&self, duel_id: &DuelId) -> Option<PendingReveal> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        match entries.get(duel_id).map(Vec::as_slice) {
            Some([only]) => Some(only.clone()),
            _ => None,
        }
    }

    /// Forget a duel's secrets once they are no longer needed
    pub fn remove(&self, duel_id: &DuelId) -> bool {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(duel_id)
            .is_some()
    }
}

/// A split of the budget drawn uniformly from all valid splits
pub fn random_allocation() -> Allocation {
    let mut rng = rand::thread_rng();
    loop {
        let first = rng.gen_range(0..=TOTAL_BUDGET);
        let second = rng.gen_range(0..=TOTAL_BUDGET);
        if first + second > TOTAL_BUDGET {
            continue;
        }
        if let Ok(allocation) = Allocation::new([first, second, TOTAL_BUDGET - first - second]) {
            return allocation;
        }
    }
}
