//! Round-by-round resolution and the overall verdict.

use crate::crypto::Secret;
use crate::protocol::{DuelId, Side};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain separator for the final tie-break digest.
const TIEBREAK_DOMAIN: &[u8] = b"DUEL_TIEBREAK_V1";

/// Who took a single round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Creator,
    Opponent,
    Tie,
}

impl RoundOutcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            RoundOutcome::Creator => Some(Side::Creator),
            RoundOutcome::Opponent => Some(Side::Opponent),
            RoundOutcome::Tie => None,
        }
    }
}

/// One resolved round, as appended to a duel's history
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 1-based round number
    pub round: u8,
    pub creator_power: u32,
    pub opponent_power: u32,
    pub outcome: RoundOutcome,
}

impl RoundResult {
    pub fn resolve(round: u8, creator_power: u32, opponent_power: u32) -> Self {
        Self {
            round,
            creator_power,
            opponent_power,
            outcome: resolve_round(creator_power, opponent_power),
        }
    }
}

/// Higher power takes the round; equal power credits nobody.
pub fn resolve_round(creator_power: u32, opponent_power: u32) -> RoundOutcome {
    if creator_power > opponent_power {
        RoundOutcome::Creator
    } else if opponent_power > creator_power {
        RoundOutcome::Opponent
    } else {
        RoundOutcome::Tie
    }
}

/// Which rule settled the duel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Strictly more rounds won
    RoundsWon,
    /// Equal rounds, more power spent in the rounds each side won
    WinningPower,
    /// Still level: parity of a digest over both revealed secrets
    SecretDigest,
}

/// Final outcome of a duel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: Side,
    pub creator_rounds: u8,
    pub opponent_rounds: u8,
    pub decided_by: TieBreak,
}

/// Decide the duel from its resolved rounds.
///
/// Every step is a pure function of the revealed data, so anyone holding the
/// reveals can recompute the same winner.
pub fn decide(
    duel_id: &DuelId,
    rounds: &[RoundResult],
    creator_secret: &Secret,
    opponent_secret: &Secret,
) -> Verdict {
    let mut creator_rounds = 0u8;
    let mut opponent_rounds = 0u8;
    let mut creator_power = 0u32;
    let mut opponent_power = 0u32;

    for round in rounds {
        match round.outcome {
            RoundOutcome::Creator => {
                creator_rounds += 1;
                creator_power += round.creator_power;
            }
            RoundOutcome::Opponent => {
                opponent_rounds += 1;
                opponent_power += round.opponent_power;
            }
            RoundOutcome::Tie => {}
        }
    }

    let (winner, decided_by) = if creator_rounds != opponent_rounds {
        let winner = if creator_rounds > opponent_rounds {
            Side::Creator
        } else {
            Side::Opponent
        };
        (winner, TieBreak::RoundsWon)
    } else if creator_power != opponent_power {
        let winner = if creator_power > opponent_power {
            Side::Creator
        } else {
            Side::Opponent
        };
        (winner, TieBreak::WinningPower)
    } else {
        (
            secret_digest_winner(duel_id, creator_secret, opponent_secret),
            TieBreak::SecretDigest,
        )
    };

    Verdict {
        winner,
        creator_rounds,
        opponent_rounds,
        decided_by,
    }
}

/// Neither party can steer this: both secrets were fixed at commit time.
fn secret_digest_winner(duel_id: &DuelId, creator: &Secret, opponent: &Secret) -> Side {
    let mut hasher = Sha256::new();
    hasher.update(TIEBREAK_DOMAIN);
    hasher.update(duel_id.as_bytes());
    for secret in [creator, opponent] {
        hasher.update((secret.as_bytes().len() as u32).to_be_bytes());
        hasher.update(secret.as_bytes());
    }
    let digest: [u8; 32] = hasher.finalize().into();

    if digest[0] % 2 == 0 {
        Side::Creator
    } else {
        Side::Opponent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rounds(creator: [u32; 3], opponent: [u32; 3]) -> Vec<RoundResult> {
        (0..3)
            .map(|i| RoundResult::resolve(i as u8 + 1, creator[i], opponent[i]))
            .collect()
    }

    #[test]
    fn test_round_outcomes() {
        assert_eq!(resolve_round(6, 4), RoundOutcome::Creator);
        assert_eq!(resolve_round(2, 3), RoundOutcome::Opponent);
        assert_eq!(resolve_round(5, 5), RoundOutcome::Tie);
        assert_eq!(resolve_round(0, 0), RoundOutcome::Tie);
    }

    #[test]
    fn test_majority_of_rounds_wins() {
        let history = rounds([7, 2, 1], [3, 3, 4]);
        let outcomes: Vec<_> = history.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                RoundOutcome::Creator,
                RoundOutcome::Opponent,
                RoundOutcome::Opponent
            ]
        );

        let verdict = decide(
            &DuelId::new(),
            &history,
            &Secret::new("a"),
            &Secret::new("b"),
        );
        assert_eq!(verdict.winner, Side::Opponent);
        assert_eq!((verdict.creator_rounds, verdict.opponent_rounds), (1, 2));
        assert_eq!(verdict.decided_by, TieBreak::RoundsWon);
    }

    #[test]
    fn test_equal_rounds_falls_back_to_winning_power() {
        // creator takes round 1 with 8, opponent takes round 2 with 6
        let history = rounds([8, 1, 1], [2, 6, 2]);
        let verdict = decide(
            &DuelId::new(),
            &history,
            &Secret::new("a"),
            &Secret::new("b"),
        );

        assert_eq!(verdict.creator_rounds, 1);
        assert_eq!(verdict.opponent_rounds, 1);
        assert_eq!(verdict.winner, Side::Creator);
        assert_eq!(verdict.decided_by, TieBreak::WinningPower);
    }

    #[test]
    fn test_full_tie_is_reproducible() {
        let duel_id = DuelId::new();
        let history = rounds([5, 5, 0], [5, 0, 5]);
        let s1 = Secret::new("creator-secret");
        let s2 = Secret::new("opponent-secret");

        let first = decide(&duel_id, &history, &s1, &s2);
        let second = decide(&duel_id, &history, &s1, &s2);

        assert_eq!(first, second);
        assert_eq!(first.decided_by, TieBreak::SecretDigest);
    }

    #[test]
    fn test_all_ties_resolved_by_digest() {
        let history = rounds([4, 3, 3], [4, 3, 3]);
        let verdict = decide(
            &DuelId::new(),
            &history,
            &Secret::generate(),
            &Secret::generate(),
        );

        assert_eq!((verdict.creator_rounds, verdict.opponent_rounds), (0, 0));
        assert_eq!(verdict.decided_by, TieBreak::SecretDigest);
    }

    #[test]
    fn test_digest_tiebreak_reaches_both_sides() {
        // Over many duel ids the parity must land on each side at least once
        let history = rounds([5, 5, 0], [5, 0, 5]);
        let s1 = Secret::new("x");
        let s2 = Secret::new("y");
        let winners: Vec<Side> = (0..64)
            .map(|_| decide(&DuelId::new(), &history, &s1, &s2).winner)
            .collect();

        assert!(winners.contains(&Side::Creator));
        assert!(winners.contains(&Side::Opponent));
    }
}
