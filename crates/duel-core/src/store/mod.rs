//! Duel persistence.
//!
//! The registry talks to storage only through [`DuelStore`], so the in-memory
//! map used in tests and the durable file store are interchangeable.

mod file;
mod memory;
mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{DuelChange, DuelStore, CHANGE_FEED_CAPACITY};
