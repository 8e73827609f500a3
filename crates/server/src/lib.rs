use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod balances;
mod expenses;
mod invites;
mod itinerary;
mod server;
mod trips;
mod user;

pub mod types {
    pub mod trip {
        pub use api_types::trip::{
            TripArchive, TripDestination, TripListResponse, TripNew, TripRename, TripShare,
            TripView,
        };
    }

    pub mod itinerary {
        pub use api_types::itinerary::{
            ChecklistItemDone, ChecklistItemNew, ChecklistItemView, ConflictReportResponse,
            ContentKind, DatesSet, DayConflictView, DayDetails, DayView, ItineraryResponse,
            NoteNew, NoteView,
        };
    }

    pub mod invite {
        pub use api_types::invite::{ParticipantResolve, ParticipantView, RosterResponse};
    }

    pub mod expense {
        pub use api_types::expense::{
            AllocationEntry, ExpenseCreated, ExpenseListResponse, ExpenseNew, ExpenseReorder,
            ExpenseUpdate, ExpenseView,
        };
    }

    pub mod balance {
        pub use api_types::balance::{BalanceView, BalancesResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidAllocation(_)
        | EngineError::InvalidDateRange(_)
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

fn currency_to_api(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Npr => api_types::Currency::Npr,
    }
}

fn currency_from_api(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Npr => engine::Currency::Npr,
    }
}

fn participant_to_api(participant: &engine::ParticipantRef) -> api_types::ParticipantRef {
    match participant {
        engine::ParticipantRef::Member { user_id } => api_types::ParticipantRef {
            kind: "member".to_string(),
            id: user_id.clone(),
        },
        engine::ParticipantRef::Guest { invite_id } => api_types::ParticipantRef {
            kind: "guest".to_string(),
            id: invite_id.to_string(),
        },
    }
}

fn participant_from_api(
    participant: &api_types::ParticipantRef,
) -> Result<engine::ParticipantRef, ServerError> {
    match participant.kind.as_str() {
        "member" => Ok(engine::ParticipantRef::Member {
            user_id: participant.id.clone(),
        }),
        "guest" => {
            let invite_id = uuid::Uuid::parse_str(&participant.id)
                .map_err(|_| ServerError::Generic("invalid guest id".to_string()))?;
            Ok(engine::ParticipantRef::Guest { invite_id })
        }
        other => Err(ServerError::Generic(format!(
            "invalid participant kind: {other}"
        ))),
    }
}
