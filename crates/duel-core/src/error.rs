//! Error types for duel operations.

use crate::duel::DuelStatus;
use crate::protocol::{DuelId, PartyId, Side};
use thiserror::Error;

/// Allocation rule violations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvalidAllocation {
    #[error("allocation must have exactly 3 entries, got {0}")]
    WrongLength(usize),

    #[error("round {index} power {value} is outside 0..=10")]
    OutOfRange { index: usize, value: i64 },

    #[error("allocation sums to {0}, expected 10")]
    BudgetMismatch(i64),
}

/// Errors from the persistence collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt duel record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from duel operations
#[derive(Debug, Error)]
pub enum DuelError {
    #[error("Duel not found: {0}")]
    NotFound(DuelId),

    #[error("Stake must be greater than zero")]
    InvalidStake,

    #[error("Duel already has an opponent")]
    AlreadyJoined,

    #[error("Creator cannot join their own duel")]
    SelfJoin,

    #[error("{0} is not a participant in this duel")]
    NotAParticipant(PartyId),

    #[error("Operation not allowed while duel is {actual:?} (requires {expected:?})")]
    WrongPhase {
        expected: DuelStatus,
        actual: DuelStatus,
    },

    #[error("The {0} has already committed")]
    DuplicateCommitment(Side),

    #[error("The {0} has already revealed")]
    DuplicateReveal(Side),

    #[error("Reveal does not match the stored commitment")]
    CommitmentVerificationFailed,

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(#[from] InvalidAllocation),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DuelError {
    /// Only infrastructure failures are worth retrying unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, DuelError::Store(_))
    }

    /// Stable machine-readable kind for wire responses
    pub fn kind(&self) -> &'static str {
        match self {
            DuelError::NotFound(_) => "not_found",
            DuelError::InvalidStake => "invalid_stake",
            DuelError::AlreadyJoined => "already_joined",
            DuelError::SelfJoin => "self_join",
            DuelError::NotAParticipant(_) => "not_a_participant",
            DuelError::WrongPhase { .. } => "wrong_phase",
            DuelError::DuplicateCommitment(_) => "duplicate_commitment",
            DuelError::DuplicateReveal(_) => "duplicate_reveal",
            DuelError::CommitmentVerificationFailed => "commitment_verification_failed",
            DuelError::InvalidAllocation(InvalidAllocation::WrongLength(_)) => {
                "invalid_allocation.wrong_length"
            }
            DuelError::InvalidAllocation(InvalidAllocation::OutOfRange { .. }) => {
                "invalid_allocation.out_of_range"
            }
            DuelError::InvalidAllocation(InvalidAllocation::BudgetMismatch(_)) => {
                "invalid_allocation.budget_mismatch"
            }
            DuelError::Store(_) => "store_unavailable",
        }
    }
}
