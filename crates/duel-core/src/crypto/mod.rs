//! Cryptographic primitives for the duel protocol.
//!
//! A party commits to its allocation with `Commitment = H(allocation || secret)`
//! and later discloses both so anyone can recompute the hash.

mod commitment;

pub use commitment::{commit, generate_secret, verify, Commitment, Secret, SECRET_BYTES};
