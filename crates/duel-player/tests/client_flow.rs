//! Integration tests for the duel client against an in-process service.

use duel_core::{Allocation, DuelRegistry, DuelStatus, DuelStore, MemoryStore, PartyId, Side};
use duel_player::{ClientError, DuelClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Serve a fresh registry on an ephemeral port
async fn spawn_service() -> String {
    let store: Arc<dyn DuelStore> = Arc::new(MemoryStore::new());
    let app = duel_server::create_router(Arc::new(DuelRegistry::new(store)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(url: &str, name: &str) -> DuelClient {
    DuelClient::new(url, PartyId::from(name)).with_poll_interval(Duration::from_millis(20))
}

#[tokio::test]
async fn test_two_clients_play_to_completion() {
    let url = spawn_service().await;
    let a = client(&url, "A");
    let b = client(&url, "B");

    let id = a.create_duel(100).await.unwrap().id();
    assert_eq!(b.list_open_duels().await.unwrap().len(), 1);
    b.join_duel(&id).await.unwrap();

    a.commit(&id, Allocation::new([6, 2, 2]).unwrap()).await.unwrap();
    b.commit(&id, Allocation::new([4, 3, 3]).unwrap()).await.unwrap();

    let duel = a
        .wait_until(&id, Duration::from_secs(5), |d| {
            d.status() == DuelStatus::Revealing
        })
        .await
        .unwrap();
    assert_eq!(duel.status(), DuelStatus::Revealing);

    a.reveal(&id).await.unwrap();
    b.reveal(&id).await.unwrap();

    let mut duel = b.get_duel(&id).await.unwrap();
    while duel.status() == DuelStatus::Showdown {
        duel = b.advance_round(&id).await.unwrap();
    }

    assert_eq!(duel.status(), DuelStatus::Completed);
    assert_eq!(duel.winner(), Some(&PartyId::from("B")));
    assert_eq!(a.list_my_duels().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reveal_without_secret_fails_locally() {
    let url = spawn_service().await;
    let a = client(&url, "A");
    let id = a.create_duel(1).await.unwrap().id();

    assert!(matches!(
        a.reveal(&id).await,
        Err(ClientError::NoSecret(_))
    ));
}

#[tokio::test]
async fn test_rejections_carry_error_kind() {
    let url = spawn_service().await;
    let a = client(&url, "A");
    let id = a.create_duel(1).await.unwrap().id();

    let err = a.join_duel(&id).await.unwrap_err();
    assert_eq!(err.kind(), Some("self_join"));
}

#[tokio::test]
async fn test_wait_until_times_out() {
    let url = spawn_service().await;
    let a = client(&url, "A");
    let id = a.create_duel(1).await.unwrap().id();

    let err = a
        .wait_until(&id, Duration::from_millis(60), |d| {
            d.status() == DuelStatus::Completed
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));
}

#[tokio::test]
async fn test_commit_retry_with_new_allocation_reveals_it() {
    let url = spawn_service().await;
    let a = client(&url, "A");
    let b = client(&url, "B");
    let id = a.create_duel(10).await.unwrap().id();

    // No opponent yet, so the first attempt is turned away
    let err = a
        .commit(&id, Allocation::new([5, 3, 2]).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some("wrong_phase"));

    b.join_duel(&id).await.unwrap();
    a.commit(&id, Allocation::new([1, 1, 8]).unwrap()).await.unwrap();
    b.commit(&id, Allocation::new([4, 3, 3]).unwrap()).await.unwrap();

    let duel = a.reveal(&id).await.unwrap();
    let revealed = duel.reveal(Side::Creator).unwrap();
    assert_eq!(revealed.allocation, Allocation::new([1, 1, 8]).unwrap());
}

#[tokio::test]
async fn test_rejected_recommit_keeps_accepted_opening() {
    let url = spawn_service().await;
    let a = client(&url, "A");
    let b = client(&url, "B");
    let id = a.create_duel(10).await.unwrap().id();
    b.join_duel(&id).await.unwrap();

    a.commit(&id, Allocation::new([6, 2, 2]).unwrap()).await.unwrap();
    let err = a
        .commit(&id, Allocation::new([2, 2, 6]).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some("duplicate_commitment"));
    b.commit(&id, Allocation::new([4, 3, 3]).unwrap()).await.unwrap();

    let duel = a.reveal(&id).await.unwrap();
    let revealed = duel.reveal(Side::Creator).unwrap();
    assert_eq!(revealed.allocation, Allocation::new([6, 2, 2]).unwrap());
}
