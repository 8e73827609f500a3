use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{balances, expenses, invites, itinerary, trips, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // A missing header is 401, not the extractor's 400.
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/trips", post(trips::create).get(trips::list))
        .route("/trips/{trip_id}", get(trips::itinerary).delete(trips::remove))
        .route("/trips/{trip_id}/name", patch(trips::rename))
        .route("/trips/{trip_id}/destination", patch(trips::destination))
        .route("/trips/{trip_id}/archive", patch(trips::archive))
        .route("/trips/{trip_id}/share", patch(trips::share))
        .route("/trips/{trip_id}/dates", post(itinerary::set_dates))
        .route("/trips/{trip_id}/conflicts", get(itinerary::conflicts))
        .route("/trips/{trip_id}/days", post(itinerary::add_day))
        .route("/days/{day_id}", delete(itinerary::remove_day))
        .route("/days/{day_id}/details", patch(itinerary::day_details))
        .route(
            "/days/{day_id}/notes",
            post(itinerary::add_note).get(itinerary::list_notes),
        )
        .route(
            "/days/{day_id}/checklist",
            post(itinerary::add_checklist_item).get(itinerary::list_checklist),
        )
        .route(
            "/checklist/{item_id}",
            patch(itinerary::set_checklist_done),
        )
        .route(
            "/trips/{trip_id}/participants",
            post(invites::resolve).get(invites::roster),
        )
        .route("/trips/{trip_id}/invite/accept", post(invites::accept))
        .route("/trips/{trip_id}/invite/reject", post(invites::reject))
        .route(
            "/trips/{trip_id}/expenses",
            post(expenses::create).get(expenses::list_for_trip),
        )
        .route("/days/{day_id}/expenses", get(expenses::list_for_day))
        .route("/days/{day_id}/expenses/order", post(expenses::reorder))
        .route(
            "/expenses/{expense_id}",
            patch(expenses::update).delete(expenses::remove),
        )
        .route("/trips/{trip_id}/balances", get(balances::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
