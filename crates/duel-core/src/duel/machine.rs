//! The duel aggregate and its lifecycle.
//!
//! Every transition takes a snapshot by reference and returns a new one, so
//! a rejected call can never leave a half-applied record behind.

use super::allocation::{self, Allocation, ROUNDS};
use super::resolver::{self, RoundResult, Verdict};
use crate::crypto::{Commitment, Secret};
use crate::error::DuelError;
use crate::protocol::{DuelId, PartyId, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a duel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelStatus {
    /// Created, waiting for an opponent
    Waiting,
    /// Both seats taken, collecting commitments
    Committing,
    /// Both committed, collecting reveals
    Revealing,
    /// Both revealed, rounds resolved one at a time
    Showdown,
    /// All rounds resolved, winner set
    Completed,
}

impl fmt::Display for DuelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DuelStatus::Waiting => "waiting",
            DuelStatus::Committing => "committing",
            DuelStatus::Revealing => "revealing",
            DuelStatus::Showdown => "showdown",
            DuelStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// An accepted opening of a commitment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub allocation: Allocation,
    pub secret: Secret,
}

/// A single two-party duel
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Duel {
    id: DuelId,
    creator: PartyId,
    opponent: Option<PartyId>,
    stake: u64,
    creator_commit: Option<Commitment>,
    opponent_commit: Option<Commitment>,
    creator_reveal: Option<Reveal>,
    opponent_reveal: Option<Reveal>,
    /// Next round to resolve during showdown; 4 once all three are done
    current_round: u8,
    revealed_rounds: Vec<RoundResult>,
    winner: Option<PartyId>,
    verdict: Option<Verdict>,
    status: DuelStatus,
    created_at: DateTime<Utc>,
}

impl Duel {
    /// Open a new duel waiting for an opponent
    pub fn create(creator: PartyId, stake: u64) -> Result<Self, DuelError> {
        Self::create_at(creator, stake, Utc::now())
    }

    /// Open a new duel with an explicit creation time
    pub fn create_at(
        creator: PartyId,
        stake: u64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DuelError> {
        if stake == 0 {
            return Err(DuelError::InvalidStake);
        }

        Ok(Self {
            id: DuelId::new(),
            creator,
            opponent: None,
            stake,
            creator_commit: None,
            opponent_commit: None,
            creator_reveal: None,
            opponent_reveal: None,
            current_round: 0,
            revealed_rounds: Vec::new(),
            winner: None,
            verdict: None,
            status: DuelStatus::Waiting,
            created_at,
        })
    }

    // === Accessors ===

    pub fn id(&self) -> DuelId {
        self.id
    }

    pub fn creator(&self) -> &PartyId {
        &self.creator
    }

    pub fn opponent(&self) -> Option<&PartyId> {
        self.opponent.as_ref()
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    pub fn status(&self) -> DuelStatus {
        self.status
    }

    pub fn current_round(&self) -> u8 {
        self.current_round
    }

    pub fn revealed_rounds(&self) -> &[RoundResult] {
        &self.revealed_rounds
    }

    pub fn winner(&self) -> Option<&PartyId> {
        self.winner.as_ref()
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn party(&self, side: Side) -> Option<&PartyId> {
        match side {
            Side::Creator => Some(&self.creator),
            Side::Opponent => self.opponent.as_ref(),
        }
    }

    pub fn commitment(&self, side: Side) -> Option<&Commitment> {
        match side {
            Side::Creator => self.creator_commit.as_ref(),
            Side::Opponent => self.opponent_commit.as_ref(),
        }
    }

    pub fn reveal(&self, side: Side) -> Option<&Reveal> {
        match side {
            Side::Creator => self.creator_reveal.as_ref(),
            Side::Opponent => self.opponent_reveal.as_ref(),
        }
    }

    pub fn is_participant(&self, party: &PartyId) -> bool {
        self.side_of(party).is_ok()
    }

    /// Which seat a party occupies
    pub fn side_of(&self, party: &PartyId) -> Result<Side, DuelError> {
        if *party == self.creator {
            Ok(Side::Creator)
        } else if self.opponent.as_ref() == Some(party) {
            Ok(Side::Opponent)
        } else {
            Err(DuelError::NotAParticipant(party.clone()))
        }
    }

    fn require_phase(&self, expected: DuelStatus) -> Result<(), DuelError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DuelError::WrongPhase {
                expected,
                actual: self.status,
            })
        }
    }

    // === Transitions ===

    /// Waiting -> Committing
    pub fn join(&self, opponent: PartyId) -> Result<Self, DuelError> {
        if self.opponent.is_some() {
            return Err(DuelError::AlreadyJoined);
        }
        if opponent == self.creator {
            return Err(DuelError::SelfJoin);
        }
        self.require_phase(DuelStatus::Waiting)?;

        let mut next = self.clone();
        next.opponent = Some(opponent);
        next.status = DuelStatus::Committing;
        Ok(next)
    }

    /// Record a party's commitment; Committing -> Revealing once both are in
    pub fn submit_commitment(
        &self,
        party: &PartyId,
        commitment: Commitment,
    ) -> Result<Self, DuelError> {
        let side = self.side_of(party)?;
        if self.commitment(side).is_some() {
            return Err(DuelError::DuplicateCommitment(side));
        }
        self.require_phase(DuelStatus::Committing)?;

        let mut next = self.clone();
        match side {
            Side::Creator => next.creator_commit = Some(commitment),
            Side::Opponent => next.opponent_commit = Some(commitment),
        }
        if next.creator_commit.is_some() && next.opponent_commit.is_some() {
            next.status = DuelStatus::Revealing;
        }
        Ok(next)
    }

    /// Open a party's commitment; Revealing -> Showdown once both are in
    pub fn submit_reveal(
        &self,
        party: &PartyId,
        powers: &[i64],
        secret: Secret,
    ) -> Result<Self, DuelError> {
        let side = self.side_of(party)?;
        if self.reveal(side).is_some() {
            return Err(DuelError::DuplicateReveal(side));
        }
        self.require_phase(DuelStatus::Revealing)?;

        let stored = *self.commitment(side).ok_or(DuelError::WrongPhase {
            expected: DuelStatus::Revealing,
            actual: self.status,
        })?;

        // A commitment says nothing about the budget rule
        let allocation = allocation::validate(powers)?;
        if !stored.verify(&allocation, &secret) {
            return Err(DuelError::CommitmentVerificationFailed);
        }

        let mut next = self.clone();
        let reveal = Reveal { allocation, secret };
        match side {
            Side::Creator => next.creator_reveal = Some(reveal),
            Side::Opponent => next.opponent_reveal = Some(reveal),
        }
        if next.creator_reveal.is_some() && next.opponent_reveal.is_some() {
            next.status = DuelStatus::Showdown;
            next.current_round = 1;
        }
        Ok(next)
    }

    /// Resolve the next round; Showdown -> Completed after the third
    pub fn reveal_next_round(&self) -> Result<Self, DuelError> {
        self.require_phase(DuelStatus::Showdown)?;

        let (creator, opponent) = match (&self.creator_reveal, &self.opponent_reveal) {
            (Some(c), Some(o)) => (c, o),
            _ => {
                return Err(DuelError::WrongPhase {
                    expected: DuelStatus::Showdown,
                    actual: DuelStatus::Revealing,
                })
            }
        };

        let round = self.current_round;
        if round < 1 || usize::from(round) > ROUNDS {
            return Err(DuelError::WrongPhase {
                expected: DuelStatus::Showdown,
                actual: DuelStatus::Completed,
            });
        }

        let index = usize::from(round) - 1;
        let result = RoundResult::resolve(
            round,
            creator.allocation.round(index),
            opponent.allocation.round(index),
        );

        let mut next = self.clone();
        next.revealed_rounds.push(result);
        next.current_round += 1;

        if usize::from(next.current_round) > ROUNDS {
            let verdict = resolver::decide(
                &next.id,
                &next.revealed_rounds,
                &creator.secret,
                &opponent.secret,
            );
            next.winner = next.party(verdict.winner).cloned();
            next.verdict = Some(verdict);
            next.status = DuelStatus::Completed;
        }
        Ok(next)
    }
}
