//! Duel Player demo
//!
//! Plays one scripted duel between two local parties against a running
//! duel service, then prints the round-by-round result.

use anyhow::Context;
use duel_core::{DuelStatus, PartyId};
use duel_player::{random_allocation, DuelClient, DEFAULT_POLL_INTERVAL};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const WAIT_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_url =
        std::env::var("DUEL_SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let poll_interval = match std::env::var("DUEL_POLL_MS") {
        Ok(raw) => Duration::from_millis(
            raw.parse()
                .with_context(|| format!("DUEL_POLL_MS must be milliseconds, got {:?}", raw))?,
        ),
        Err(_) => DEFAULT_POLL_INTERVAL,
    };
    info!("Playing against {}", server_url);

    let alice = DuelClient::new(&server_url, PartyId::from("alice")).with_poll_interval(poll_interval);
    let bob = DuelClient::new(&server_url, PartyId::from("bob")).with_poll_interval(poll_interval);

    let duel = alice.create_duel(100).await?;
    let id = duel.id();

    let open = bob.list_open_duels().await?;
    anyhow::ensure!(
        open.iter().any(|d| d.id() == id),
        "duel {} missing from open list",
        id
    );
    bob.join_duel(&id).await?;

    let (a, b) = tokio::join!(
        alice.commit(&id, random_allocation()),
        bob.commit(&id, random_allocation())
    );
    a?;
    b?;
    alice
        .wait_until(&id, WAIT_TIMEOUT, |d| d.status() == DuelStatus::Revealing)
        .await?;

    let (a, b) = tokio::join!(alice.reveal(&id), bob.reveal(&id));
    a?;
    b?;
    let mut duel = alice
        .wait_until(&id, WAIT_TIMEOUT, |d| d.status() == DuelStatus::Showdown)
        .await?;

    while duel.status() == DuelStatus::Showdown {
        duel = alice.advance_round(&id).await?;
        if let Some(round) = duel.revealed_rounds().last() {
            info!(
                "Round {}: alice {} vs bob {} -> {:?}",
                round.round, round.creator_power, round.opponent_power, round.outcome
            );
        }
    }

    let verdict = duel.verdict().context("completed duel has no verdict")?;
    info!(
        "Winner: {} ({} rounds to {}, decided by {:?})",
        duel.winner().map(|w| w.as_str()).unwrap_or("?"),
        verdict.creator_rounds,
        verdict.opponent_rounds,
        verdict.decided_by
    );

    alice.secrets().remove(&id);
    bob.secrets().remove(&id);
    Ok(())
}
