//! Duel Player Library
//!
//! Client side of the duel protocol: keeps each commitment's secret locally
//! until reveal time and talks to the duel service over HTTP.

mod client;
mod secrets;

pub use client::{ClientError, DuelClient, DEFAULT_POLL_INTERVAL};
pub use secrets::{random_allocation, PendingReveal, SecretStore};
