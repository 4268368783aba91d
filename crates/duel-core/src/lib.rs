//! Duel Core Library
//!
//! This crate provides the commit-reveal duel engine: two parties each split
//! a fixed budget across three rounds, commit to the split with a hash, and
//! later reveal it for verification and round-by-round scoring.

pub mod crypto;
pub mod duel;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod store;

pub use crypto::{commit, generate_secret, verify, Commitment, Secret};
pub use duel::{Allocation, Duel, DuelStatus, RoundOutcome, RoundResult, TieBreak, Verdict};
pub use error::{DuelError, InvalidAllocation, StoreError};
pub use protocol::{DuelId, PartyId, Side};
pub use registry::DuelRegistry;
pub use store::{DuelChange, DuelStore, FileStore, MemoryStore};
