//! Secret and Commitment for the commit-reveal scheme.

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::duel::allocation::Allocation;

/// Domain separator for allocation commitments.
const COMMIT_DOMAIN: &[u8] = b"DUEL_COMMIT_V1";

/// Bytes of entropy drawn for a generated secret.
pub const SECRET_BYTES: usize = 32;

/// Per-commitment secret, kept by the committing party until reveal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Generate a fresh 256-bit secret, hex encoded (64 characters).
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a caller-provided secret
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "Secret({}..)", prefix)
    }
}

/// Commitment = SHA256(domain || allocation || len(secret) || secret)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment([u8; 32]);

impl Commitment {
    /// Bind an allocation to a secret
    pub fn new(allocation: &Allocation, secret: &Secret) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(COMMIT_DOMAIN);
        for power in allocation.powers() {
            hasher.update(power.to_be_bytes());
        }
        hasher.update((secret.as_bytes().len() as u32).to_be_bytes());
        hasher.update(secret.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Verify that the given allocation and secret produce this commitment
    pub fn verify(&self, allocation: &Allocation, secret: &Secret) -> bool {
        *self == Self::new(allocation, secret)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Commitment {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        hex::encode(self.0).serialize(s)
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let hex_str = String::deserialize(d)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Produce a fresh secret for a new commitment
pub fn generate_secret() -> Secret {
    Secret::generate()
}

/// Commit to an allocation under a secret
pub fn commit(allocation: &Allocation, secret: &Secret) -> Commitment {
    Commitment::new(allocation, secret)
}

/// Check a disclosed (allocation, secret) pair against a stored commitment
pub fn verify(allocation: &Allocation, secret: &Secret, commitment: &Commitment) -> bool {
    commitment.verify(allocation, secret)
}
