//! Duel rules: allocation budget, round resolution and the state machine.

pub mod allocation;
mod machine;
pub mod resolver;

pub use allocation::{validate, Allocation, MAX_ROUND_POWER, ROUNDS, TOTAL_BUDGET};
pub use machine::{Duel, DuelStatus, Reveal};
pub use resolver::{decide, resolve_round, RoundOutcome, RoundResult, TieBreak, Verdict};
