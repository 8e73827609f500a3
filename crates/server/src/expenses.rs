//! Expense ledger endpoints.

use api_types::expense::{
    AllocationEntry, ExpenseCreated, ExpenseListResponse, ExpenseNew, ExpenseReorder,
    ExpenseUpdate, ExpenseView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, participant_from_api, participant_to_api, server::ServerState, user};

fn allocations_from_api(
    entries: &[AllocationEntry],
) -> Result<Vec<engine::Allocation>, ServerError> {
    entries
        .iter()
        .map(|entry| {
            Ok(engine::Allocation::new(
                participant_from_api(&entry.participant)?,
                engine::MoneyCents::new(entry.amount_minor),
            ))
        })
        .collect()
}

fn allocations_to_api(allocations: &[engine::Allocation]) -> Vec<AllocationEntry> {
    allocations
        .iter()
        .map(|allocation| AllocationEntry {
            participant: participant_to_api(&allocation.participant),
            amount_minor: allocation.amount.cents(),
        })
        .collect()
}

fn expense_view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        day_id: expense.day_id,
        amount_minor: expense.amount.cents(),
        description: expense.description,
        category: expense.category,
        occurred_at: expense.occurred_at.fixed_offset(),
        display_order: expense.display_order,
        created_by: expense.created_by,
        deleted: expense.deleted_at.is_some(),
        payers: allocations_to_api(&expense.payers),
        splits: allocations_to_api(&expense.splits),
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let expense = state
        .engine
        .create_expense(
            &trip_id,
            payload.day_id,
            engine::NewExpense {
                amount: engine::MoneyCents::new(payload.amount_minor),
                description: payload.description,
                category: payload.category,
                occurred_at: payload.occurred_at.map(|t| t.to_utc()),
                payers: allocations_from_api(&payload.payers)?,
                splits: allocations_from_api(&payload.splits)?,
                dont_split: payload.dont_split,
            },
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ExpenseCreated { id: expense.id })))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let payers = payload
        .payers
        .as_deref()
        .map(allocations_from_api)
        .transpose()?;
    let splits = payload
        .splits
        .as_deref()
        .map(allocations_from_api)
        .transpose()?;

    let expense = state
        .engine
        .update_expense(
            expense_id,
            engine::UpdateExpense {
                amount: payload.amount_minor.map(engine::MoneyCents::new),
                description: payload.description,
                category: payload.category.map(Some),
                occurred_at: payload.occurred_at.map(|t| t.to_utc()),
                payers,
                splits,
                dont_split: payload.dont_split,
            },
            &user.username,
        )
        .await?;

    Ok(Json(expense_view(expense)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .soft_delete_expense(expense_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct TripExpenseQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

pub async fn list_for_trip(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Query(query): Query<TripExpenseQuery>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state
        .engine
        .list_trip_expenses(&trip_id, query.include_deleted, &user.username)
        .await?;
    Ok(Json(ExpenseListResponse {
        expenses: expenses.into_iter().map(expense_view).collect(),
    }))
}

pub async fn list_for_day(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(day_id): Path<Uuid>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state
        .engine
        .list_day_expenses(day_id, &user.username)
        .await?;
    Ok(Json(ExpenseListResponse {
        expenses: expenses.into_iter().map(expense_view).collect(),
    }))
}

pub async fn reorder(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(day_id): Path<Uuid>,
    Json(payload): Json<ExpenseReorder>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .reorder_day_expenses(day_id, &payload.ordered_ids, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
