//! HTTP API handlers.

use axum::{extract::State, http::StatusCode, Json};
use duel_core::protocol::{
    CommitMessage, CreateDuelRequest, DuelList, JoinDuelRequest, RevealMessage,
};
use duel_core::{Duel, DuelId, PartyId};

use crate::error::{AppError, AppJson, AppPath};
use crate::SharedRegistry;

type ApiResult<T> = Result<T, AppError>;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn create_duel(
    State(registry): State<SharedRegistry>,
    AppJson(req): AppJson<CreateDuelRequest>,
) -> ApiResult<(StatusCode, Json<Duel>)> {
    let duel = registry.create_duel(req.creator, req.stake).await?;
    Ok((StatusCode::CREATED, Json(duel)))
}

pub async fn list_open_duels(State(registry): State<SharedRegistry>) -> ApiResult<Json<DuelList>> {
    let duels = registry.list_open_duels().await?;
    Ok(Json(DuelList { duels }))
}

pub async fn list_duels_for(
    State(registry): State<SharedRegistry>,
    AppPath(party): AppPath<String>,
) -> ApiResult<Json<DuelList>> {
    let duels = registry.list_duels_for(&PartyId::new(party)).await?;
    Ok(Json(DuelList { duels }))
}

pub async fn get_duel(
    State(registry): State<SharedRegistry>,
    AppPath(duel_id): AppPath<DuelId>,
) -> ApiResult<Json<Duel>> {
    Ok(Json(registry.get_duel(&duel_id).await?))
}

pub async fn delete_duel(
    State(registry): State<SharedRegistry>,
    AppPath(duel_id): AppPath<DuelId>,
) -> ApiResult<StatusCode> {
    registry.delete_duel(&duel_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn join_duel(
    State(registry): State<SharedRegistry>,
    AppPath(duel_id): AppPath<DuelId>,
    AppJson(req): AppJson<JoinDuelRequest>,
) -> ApiResult<Json<Duel>> {
    Ok(Json(registry.join_duel(&duel_id, req.opponent).await?))
}

pub async fn submit_commitment(
    State(registry): State<SharedRegistry>,
    AppPath(duel_id): AppPath<DuelId>,
    AppJson(req): AppJson<CommitMessage>,
) -> ApiResult<Json<Duel>> {
    let duel = registry
        .submit_commitment(&duel_id, &req.party, req.commitment)
        .await?;
    Ok(Json(duel))
}

pub async fn submit_reveal(
    State(registry): State<SharedRegistry>,
    AppPath(duel_id): AppPath<DuelId>,
    AppJson(req): AppJson<RevealMessage>,
) -> ApiResult<Json<Duel>> {
    let duel = registry
        .submit_reveal(&duel_id, &req.party, &req.allocation, req.secret)
        .await?;
    Ok(Json(duel))
}

pub async fn advance_round(
    State(registry): State<SharedRegistry>,
    AppPath(duel_id): AppPath<DuelId>,
) -> ApiResult<Json<Duel>> {
    Ok(Json(registry.advance_round(&duel_id).await?))
}
