//! Protocol types and messages.

mod messages;
mod types;

pub use messages::{
    CommitMessage, CreateDuelRequest, DuelList, ErrorBody, JoinDuelRequest, RevealMessage,
};
pub use types::{DuelId, PartyId, Side};
