//! HTTP client for the duel service.

use crate::secrets::{PendingReveal, SecretStore};
use duel_core::protocol::{
    CommitMessage, CreateDuelRequest, DuelList, ErrorBody, JoinDuelRequest, RevealMessage,
};
use duel_core::{Allocation, Duel, DuelId, PartyId};
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// How often snapshots are re-fetched while waiting on the counterpart
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service rejected request ({status}): {} - {}", .body.error, .body.message)]
    Rejected { status: u16, body: ErrorBody },

    #[error("No stored secret for duel {0}")]
    NoSecret(DuelId),

    #[error("Timed out waiting on duel {0}")]
    Timeout(DuelId),
}

impl ClientError {
    /// Machine-readable rejection kind, if the service rejected the call
    pub fn kind(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { body, .. } => Some(&body.error),
            _ => None,
        }
    }
}

/// One party's connection to the duel service
pub struct DuelClient {
    http: Client,
    base_url: String,
    party: PartyId,
    secrets: SecretStore,
    poll_interval: Duration,
}

impl DuelClient {
    pub fn new(base_url: impl Into<String>, party: PartyId) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            party,
            secrets: SecretStore::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn party(&self) -> &PartyId {
        &self.party
    }

    pub fn secrets(&self) -> &SecretStore {
        &self.secrets
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Duel, ClientError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        decode(resp).await
    }

    // === Operations ===

    pub async fn create_duel(&self, stake: u64) -> Result<Duel, ClientError> {
        let duel = self
            .post(
                "/api/duels",
                &CreateDuelRequest {
                    creator: self.party.clone(),
                    stake,
                },
            )
            .await?;
        info!("{} created duel {}", self.party, duel.id());
        Ok(duel)
    }

    pub async fn join_duel(&self, duel_id: &DuelId) -> Result<Duel, ClientError> {
        let duel = self
            .post(
                &format!("/api/duels/{}/join", duel_id),
                &JoinDuelRequest {
                    opponent: self.party.clone(),
                },
            )
            .await?;
        info!("{} joined duel {}", self.party, duel_id);
        Ok(duel)
    }

    /// Commit to `allocation`; the secret stays in the local store.
    ///
    /// Safe to retry after a failure, with the same or another allocation:
    /// the opening kept for reveal is the one the service accepted.
    pub async fn commit(
        &self,
        duel_id: &DuelId,
        allocation: Allocation,
    ) -> Result<Duel, ClientError> {
        let pending = self.secrets.prepare(*duel_id, allocation);
        let duel = self
            .post(
                &format!("/api/duels/{}/commit", duel_id),
                &CommitMessage {
                    party: self.party.clone(),
                    commitment: pending.commitment,
                },
            )
            .await?;
        self.secrets.confirm(duel_id, &pending.commitment);
        info!("{} committed in duel {}", self.party, duel_id);
        Ok(duel)
    }

    /// The opening of the commitment the service holds for this party
    async fn accepted_opening(&self, duel_id: &DuelId) -> Result<PendingReveal, ClientError> {
        if let Some(pending) = self.secrets.get(duel_id) {
            return Ok(pending);
        }

        let duel = self.get_duel(duel_id).await?;
        duel.side_of(&self.party)
            .ok()
            .and_then(|side| duel.commitment(side).copied())
            .and_then(|commitment| self.secrets.confirm(duel_id, &commitment))
            .ok_or(ClientError::NoSecret(*duel_id))
    }

    /// Reveal the allocation and secret behind this party's commitment
    pub async fn reveal(&self, duel_id: &DuelId) -> Result<Duel, ClientError> {
        let pending = self.accepted_opening(duel_id).await?;

        let duel = self
            .post(
                &format!("/api/duels/{}/reveal", duel_id),
                &RevealMessage {
                    party: self.party.clone(),
                    allocation: pending
                        .allocation
                        .powers()
                        .iter()
                        .map(|p| i64::from(*p))
                        .collect(),
                    secret: pending.secret,
                },
            )
            .await?;
        info!(
            "{} revealed {:?} in duel {}",
            self.party,
            pending.allocation.powers(),
            duel_id
        );
        Ok(duel)
    }

    pub async fn advance_round(&self, duel_id: &DuelId) -> Result<Duel, ClientError> {
        let resp = self
            .http
            .post(self.url(&format!("/api/duels/{}/advance", duel_id)))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn get_duel(&self, duel_id: &DuelId) -> Result<Duel, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/duels/{}", duel_id)))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_open_duels(&self) -> Result<Vec<Duel>, ClientError> {
        let resp = self.http.get(self.url("/api/duels/open")).send().await?;
        Ok(decode::<DuelList>(resp).await?.duels)
    }

    pub async fn list_my_duels(&self) -> Result<Vec<Duel>, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/parties/{}/duels", self.party)))
            .send()
            .await?;
        Ok(decode::<DuelList>(resp).await?.duels)
    }

    /// Poll a duel until `done` holds for its snapshot or `timeout` passes
    pub async fn wait_until<F>(
        &self,
        duel_id: &DuelId,
        timeout: Duration,
        done: F,
    ) -> Result<Duel, ClientError>
    where
        F: Fn(&Duel) -> bool,
    {
        let start = Instant::now();
        loop {
            let duel = self.get_duel(duel_id).await?;
            if done(&duel) {
                return Ok(duel);
            }
            if start.elapsed() >= timeout {
                return Err(ClientError::Timeout(*duel_id));
            }
            debug!("Duel {} still {}, polling again", duel_id, duel.status());
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await?;
    let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or(ErrorBody {
        error: "unknown".to_string(),
        message: text,
        retryable: status.is_server_error(),
    });
    Err(ClientError::Rejected {
        status: status.as_u16(),
        body,
    })
}
