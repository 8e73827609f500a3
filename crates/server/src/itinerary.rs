//! Itinerary endpoints: date reconciliation, the conflict advisory and day
//! content.

use api_types::itinerary::{
    ChecklistItemDone, ChecklistItemNew, ChecklistItemView, ConflictReportResponse, ContentKind,
    DatesSet, DayConflictView, DayDetails, DayView, NoteNew, NoteView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

pub(crate) fn day_view(day: engine::ItineraryDay) -> DayView {
    DayView {
        id: day.id,
        day_number: day.day_number,
        date: day.date,
        title: day.title,
        location: day.location,
    }
}

fn content_kind(kind: engine::ContentKind) -> ContentKind {
    match kind {
        engine::ContentKind::Notes => ContentKind::Notes,
        engine::ContentKind::Checklists => ContentKind::Checklists,
        engine::ContentKind::Expenses => ContentKind::Expenses,
        engine::ContentKind::Details => ContentKind::Details,
    }
}

pub async fn set_dates(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<DatesSet>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_trip_dates(&trip_id, payload.start_date, payload.end_date, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn conflicts(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Query(payload): Query<DatesSet>,
) -> Result<Json<ConflictReportResponse>, ServerError> {
    let report = state
        .engine
        .check_date_conflicts(&trip_id, payload.start_date, payload.end_date, &user.username)
        .await?;

    Ok(Json(ConflictReportResponse {
        has_conflicts: report.has_conflicts,
        affected_days: report
            .affected_days
            .into_iter()
            .map(|day| DayConflictView {
                day_id: day.day_id,
                day_number: day.day_number,
                date: day.date,
                content: day.content.into_iter().map(content_kind).collect(),
            })
            .collect(),
    }))
}

pub async fn add_day(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<(StatusCode, Json<DayView>), ServerError> {
    let day = state.engine.add_day(&trip_id, &user.username).await?;
    Ok((StatusCode::CREATED, Json(day_view(day))))
}

pub async fn remove_day(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(day_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_itinerary_day(day_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn day_details(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(day_id): Path<Uuid>,
    Json(payload): Json<DayDetails>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_day_details(
            day_id,
            payload.title.as_deref(),
            payload.location.as_deref(),
            &user.username,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_note(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(day_id): Path<Uuid>,
    Json(payload): Json<NoteNew>,
) -> Result<(StatusCode, Json<NoteView>), ServerError> {
    let note = state
        .engine
        .add_note(day_id, &payload.body, &user.username)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(NoteView {
            id: note.id,
            body: note.body,
            created_at: note.created_at.fixed_offset(),
        }),
    ))
}

pub async fn list_notes(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(day_id): Path<Uuid>,
) -> Result<Json<Vec<NoteView>>, ServerError> {
    let notes = state.engine.list_day_notes(day_id, &user.username).await?;
    Ok(Json(
        notes
            .into_iter()
            .map(|note| NoteView {
                id: note.id,
                body: note.body,
                created_at: note.created_at.fixed_offset(),
            })
            .collect(),
    ))
}

pub async fn add_checklist_item(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(day_id): Path<Uuid>,
    Json(payload): Json<ChecklistItemNew>,
) -> Result<(StatusCode, Json<ChecklistItemView>), ServerError> {
    let item = state
        .engine
        .add_checklist_item(day_id, &payload.label, &user.username)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ChecklistItemView {
            id: item.id,
            label: item.label,
            done: item.done,
        }),
    ))
}

pub async fn list_checklist(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(day_id): Path<Uuid>,
) -> Result<Json<Vec<ChecklistItemView>>, ServerError> {
    let items = state
        .engine
        .list_day_checklist(day_id, &user.username)
        .await?;
    Ok(Json(
        items
            .into_iter()
            .map(|item| ChecklistItemView {
                id: item.id,
                label: item.label,
                done: item.done,
            })
            .collect(),
    ))
}

pub async fn set_checklist_done(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ChecklistItemDone>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_checklist_item_done(item_id, payload.done, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
