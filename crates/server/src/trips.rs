//! Trip lifecycle endpoints.

use api_types::trip::{
    TripArchive, TripDestination, TripListResponse, TripNew, TripRename, TripShare, TripView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, currency_from_api, currency_to_api, server::ServerState, user};

fn trip_view(trip: engine::Trip) -> TripView {
    TripView {
        id: trip.id,
        name: trip.name,
        destination: trip.destination,
        owner_id: trip.owner_id,
        start_date: trip.start_date,
        end_date: trip.end_date,
        currency: currency_to_api(trip.currency),
        archived: trip.archived,
        shared: trip.shared,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TripNew>,
) -> Result<(StatusCode, Json<TripView>), ServerError> {
    let trip = state
        .engine
        .create_trip(
            engine::NewTrip {
                name: payload.name,
                destination: payload.destination,
                start_date: payload.start_date,
                end_date: payload.end_date,
                currency: payload.currency.map(currency_from_api),
            },
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(trip_view(trip))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<TripListResponse>, ServerError> {
    let trips = state.engine.list_trips(&user.username).await?;
    Ok(Json(TripListResponse {
        trips: trips.into_iter().map(trip_view).collect(),
    }))
}

pub async fn itinerary(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<api_types::itinerary::ItineraryResponse>, ServerError> {
    let snapshot = state.engine.trip_itinerary(&trip_id, &user.username).await?;
    Ok(Json(api_types::itinerary::ItineraryResponse {
        trip: trip_view(snapshot.trip),
        days: snapshot.days.into_iter().map(crate::itinerary::day_view).collect(),
    }))
}

pub async fn rename(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<TripRename>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .rename_trip(&trip_id, &payload.name, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn destination(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<TripDestination>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_destination(&trip_id, payload.destination.as_deref(), &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn archive(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<TripArchive>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .archive_trip(&trip_id, payload.archived, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn share(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<TripShare>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_trip_shared(&trip_id, payload.shared, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_trip(&trip_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
