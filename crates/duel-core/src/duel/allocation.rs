//! Allocation validation: three rounds, one fixed budget.

use crate::error::InvalidAllocation;
use serde::{Deserialize, Serialize};

/// Number of rounds in a duel
pub const ROUNDS: usize = 3;

/// Power every party must spend across all rounds
pub const TOTAL_BUDGET: u32 = 10;

/// Most power a single round may receive
pub const MAX_ROUND_POWER: u32 = 10;

/// A validated split of the budget across the three rounds.
///
/// Only constructible through [`validate`], so holding one proves the
/// budget rule holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u32>")]
pub struct Allocation([u32; ROUNDS]);

impl Allocation {
    pub fn new(powers: [u32; ROUNDS]) -> Result<Self, InvalidAllocation> {
        let raw: Vec<i64> = powers.iter().map(|p| i64::from(*p)).collect();
        validate(&raw)
    }

    pub fn powers(&self) -> [u32; ROUNDS] {
        self.0
    }

    /// Power assigned to a zero-based round
    pub fn round(&self, index: usize) -> u32 {
        self.0[index]
    }
}

impl TryFrom<Vec<i64>> for Allocation {
    type Error = InvalidAllocation;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        validate(&values)
    }
}

impl From<Allocation> for Vec<u32> {
    fn from(allocation: Allocation) -> Self {
        allocation.0.to_vec()
    }
}

/// Check the budget rule and return the typed allocation.
///
/// Rules are checked in order: length, range, budget.
pub fn validate(values: &[i64]) -> Result<Allocation, InvalidAllocation> {
    if values.len() != ROUNDS {
        return Err(InvalidAllocation::WrongLength(values.len()));
    }

    if let Some((index, &value)) = values
        .iter()
        .enumerate()
        .find(|(_, v)| **v < 0 || **v > i64::from(MAX_ROUND_POWER))
    {
        return Err(InvalidAllocation::OutOfRange { index, value });
    }

    let sum: i64 = values.iter().sum();
    if sum != i64::from(TOTAL_BUDGET) {
        return Err(InvalidAllocation::BudgetMismatch(sum));
    }

    let mut powers = [0u32; ROUNDS];
    for (slot, value) in powers.iter_mut().zip(values) {
        *slot = *value as u32;
    }
    Ok(Allocation(powers))
}
