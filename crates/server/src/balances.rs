//! Settlement snapshot endpoint.

use api_types::balance::{BalanceView, BalancesResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, participant_to_api, server::ServerState, user};

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state.engine.trip_balances(&trip_id, &user.username).await?;

    Ok(Json(BalancesResponse {
        balances: balances
            .into_iter()
            .map(|entry| BalanceView {
                participant: participant_to_api(&entry.participant),
                paid_minor: entry.line.paid.cents(),
                owed_minor: entry.line.owed.cents(),
                balance_minor: entry.line.balance.cents(),
            })
            .collect(),
    }))
}
