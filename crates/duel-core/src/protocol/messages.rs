//! Wire messages exchanged between duel clients and the duel service.

use crate::crypto::{Commitment, Secret};
use crate::duel::Duel;
use crate::protocol::PartyId;
use serde::{Deserialize, Serialize};

/// Open a new duel
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateDuelRequest {
    pub creator: PartyId,
    pub stake: u64,
}

/// Take the opponent seat of an open duel
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JoinDuelRequest {
    pub opponent: PartyId,
}

/// Commit phase: hash of the party's hidden allocation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitMessage {
    pub party: PartyId,
    pub commitment: Commitment,
}

/// Reveal phase: the opening of a prior commitment.
///
/// The allocation travels unvalidated so that malformed input is reported
/// with the precise validation rule it breaks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevealMessage {
    pub party: PartyId,
    pub allocation: Vec<i64>,
    pub secret: Secret,
}

/// Listing of duel snapshots
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuelList {
    pub duels: Vec<Duel>,
}

/// Error body returned for any rejected call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable kind, e.g. `duplicate_commitment`
    pub error: String,
    pub message: String,
    pub retryable: bool,
}
