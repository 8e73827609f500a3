//! Participant resolution, roster and invite endpoints.

use api_types::invite::{ParticipantResolve, ParticipantView, RosterResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, participant_to_api, server::ServerState, user};

pub async fn resolve(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<ParticipantResolve>,
) -> Result<(StatusCode, Json<api_types::ParticipantRef>), ServerError> {
    let participant = state
        .engine
        .resolve_or_create_participant(
            &trip_id,
            &payload.email,
            payload.guest_name.as_deref(),
            payload.guest_avatar.as_deref(),
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(participant_to_api(&participant))))
}

pub async fn roster(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<RosterResponse>, ServerError> {
    let roster = state.engine.trip_roster(&trip_id, &user.username).await?;

    Ok(Json(RosterResponse {
        participants: roster
            .into_iter()
            .map(|p| ParticipantView {
                participant: participant_to_api(&p.reference),
                email: p.email,
                display_name: p.display_name,
                avatar: p.avatar,
                is_guest: p.is_guest,
            })
            .collect(),
    }))
}

pub async fn accept(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.accept_invite(&trip_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reject(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.reject_invite(&trip_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
