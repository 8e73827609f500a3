use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Allocation, AllocationSide, EngineError, Expense, MoneyCents, ParticipantRef, ResultEngine,
    allocations, expenses,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

/// Parameters for [`Engine::create_expense`].
///
/// Empty `payers` defaults to the acting participant paying the full amount;
/// empty `splits` defaults to an equal split across the current roster.
/// `dont_split` forces the splits to mirror the payers exactly (a personal
/// expense recorded for bookkeeping, neutral for settlement).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: MoneyCents,
    pub description: String,
    pub category: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub payers: Vec<Allocation>,
    pub splits: Vec<Allocation>,
    pub dont_split: bool,
}

/// Parameters for [`Engine::update_expense`].
///
/// `payers`/`splits`, when present, replace the stored sets wholesale. The
/// final state is re-validated as a whole: payer and split sums must both
/// equal the (possibly updated) amount.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateExpense {
    pub amount: Option<MoneyCents>,
    pub description: Option<String>,
    pub category: Option<Option<String>>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub payers: Option<Vec<Allocation>>,
    pub splits: Option<Vec<Allocation>>,
    pub dont_split: bool,
}

impl Engine {
    /// Records an expense on an itinerary day, together with both of its
    /// allocation sets, in one transaction.
    pub async fn create_expense(
        &self,
        trip_id: &str,
        day_id: Uuid,
        new_expense: NewExpense,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        let description = normalize_required_text(&new_expense.description, "description")?;

        with_tx!(self, |db_tx| {
            let (day, trip) = self.require_day(&db_tx, day_id, user_id).await?;
            if day.trip_id != trip_id {
                return Err(EngineError::KeyNotFound(
                    "itinerary day not exists".to_string(),
                ));
            }

            let mut expense = Expense::new(
                trip.id.clone(),
                day_id,
                new_expense.amount,
                description,
                normalize_optional_text(new_expense.category.as_deref()),
                new_expense.occurred_at.unwrap_or_else(Utc::now),
                user_id.to_string(),
            )?;
            expense.display_order = self.next_display_order(&db_tx, day_id).await?;

            let payers = if new_expense.payers.is_empty() {
                vec![Allocation::new(
                    ParticipantRef::Member {
                        user_id: user_id.to_string(),
                    },
                    expense.amount,
                )]
            } else {
                new_expense.payers
            };

            let splits = if new_expense.dont_split {
                payers.clone()
            } else if new_expense.splits.is_empty() {
                let roster = self.roster_in_tx(&db_tx, &trip).await?;
                equal_split(
                    expense.amount,
                    &roster
                        .iter()
                        .map(|p| p.reference.clone())
                        .collect::<Vec<_>>(),
                )?
            } else {
                new_expense.splits
            };

            validate_allocations(&payers, expense.amount, "payer")?;
            validate_allocations(&splits, expense.amount, "split")?;

            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            for allocation in &payers {
                allocations::active_model(expense.id, AllocationSide::Payer, allocation)
                    .insert(&db_tx)
                    .await?;
            }
            for allocation in &splits {
                allocations::active_model(expense.id, AllocationSide::Split, allocation)
                    .insert(&db_tx)
                    .await?;
            }

            expense.payers = payers;
            expense.splits = splits;
            Ok(expense)
        })
    }

    /// Edits an expense. Metadata changes and the wholesale replacement of
    /// both allocation sets commit or roll back together; a reader can never
    /// observe the expense with missing allocations.
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        update: UpdateExpense,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let (model, _trip) = self.require_expense(&db_tx, expense_id, user_id).await?;
            if model.deleted_at.is_some() {
                return Err(EngineError::KeyNotFound("expense not exists".to_string()));
            }

            let mut expense = Expense::try_from(model)?;
            let (stored_payers, stored_splits) =
                self.load_allocations(&db_tx, expense_id).await?;

            if let Some(amount) = update.amount {
                if !amount.is_positive() {
                    return Err(EngineError::InvalidAmount(
                        "expense amount must be > 0".to_string(),
                    ));
                }
                expense.amount = amount;
            }
            if let Some(description) = update.description {
                expense.description = normalize_required_text(&description, "description")?;
            }
            if let Some(category) = update.category {
                expense.category = normalize_optional_text(category.as_deref());
            }
            if let Some(occurred_at) = update.occurred_at {
                expense.occurred_at = occurred_at;
            }

            let payers = update.payers.unwrap_or(stored_payers);
            let splits = if update.dont_split {
                payers.clone()
            } else {
                update.splits.unwrap_or(stored_splits)
            };

            validate_allocations(&payers, expense.amount, "payer")?;
            validate_allocations(&splits, expense.amount, "split")?;

            // Wholesale replace: drop both stored sets, reinsert the final
            // ones. Never patched incrementally.
            allocations::Entity::delete_many()
                .filter(allocations::Column::ExpenseId.eq(expense_id.to_string()))
                .exec(&db_tx)
                .await?;
            for allocation in &payers {
                allocations::active_model(expense_id, AllocationSide::Payer, allocation)
                    .insert(&db_tx)
                    .await?;
            }
            for allocation in &splits {
                allocations::active_model(expense_id, AllocationSide::Split, allocation)
                    .insert(&db_tx)
                    .await?;
            }

            let model = expenses::ActiveModel {
                id: ActiveValue::Set(expense_id.to_string()),
                amount_minor: ActiveValue::Set(expense.amount.cents()),
                description: ActiveValue::Set(expense.description.clone()),
                category: ActiveValue::Set(expense.category.clone()),
                occurred_at: ActiveValue::Set(expense.occurred_at),
                ..Default::default()
            };
            model.update(&db_tx).await?;

            expense.payers = payers;
            expense.splits = splits;
            Ok(expense)
        })
    }

    /// Soft-deletes an expense: hidden from listings and balances, row
    /// retained. Idempotent.
    pub async fn soft_delete_expense(&self, expense_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (model, _trip) = self.require_expense(&db_tx, expense_id, user_id).await?;
            if model.deleted_at.is_some() {
                return Ok(());
            }
            let active = expenses::ActiveModel {
                id: ActiveValue::Set(expense_id.to_string()),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Lists a trip's expenses with their allocations, newest first.
    pub async fn list_trip_expenses(
        &self,
        trip_id: &str,
        include_deleted: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_trip_member(&db_tx, trip_id, user_id).await?;

            let mut query = expenses::Entity::find()
                .filter(expenses::Column::TripId.eq(trip_id.to_string()))
                .order_by_desc(expenses::Column::OccurredAt);
            if !include_deleted {
                query = query.filter(expenses::Column::DeletedAt.is_null());
            }
            let models = query.all(&db_tx).await?;
            self.assemble_expenses(&db_tx, models).await
        })
    }

    /// Lists one day's non-deleted expenses in manual display order.
    pub async fn list_day_expenses(
        &self,
        day_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_day(&db_tx, day_id, user_id).await?;

            let models = expenses::Entity::find()
                .filter(expenses::Column::DayId.eq(day_id.to_string()))
                .filter(expenses::Column::DeletedAt.is_null())
                .order_by_asc(expenses::Column::DisplayOrder)
                .all(&db_tx)
                .await?;
            self.assemble_expenses(&db_tx, models).await
        })
    }

    /// Rewrites the manual ordering of a day's expenses. `ordered_ids` must
    /// be exactly the day's current non-deleted expenses.
    pub async fn reorder_day_expenses(
        &self,
        day_id: Uuid,
        ordered_ids: &[Uuid],
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_day(&db_tx, day_id, user_id).await?;

            let current: Vec<String> = expenses::Entity::find()
                .filter(expenses::Column::DayId.eq(day_id.to_string()))
                .filter(expenses::Column::DeletedAt.is_null())
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.id)
                .collect();

            if current.len() != ordered_ids.len()
                || !ordered_ids
                    .iter()
                    .all(|id| current.contains(&id.to_string()))
            {
                return Err(EngineError::InvalidId(
                    "ordering must cover exactly the day's expenses".to_string(),
                ));
            }

            for (index, id) in ordered_ids.iter().enumerate() {
                let order = i32::try_from(index)
                    .map_err(|_| EngineError::InvalidId("ordering too long".to_string()))?;
                let active = expenses::ActiveModel {
                    id: ActiveValue::Set(id.to_string()),
                    display_order: ActiveValue::Set(order),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }
            Ok(())
        })
    }

    async fn next_display_order(
        &self,
        db_tx: &DatabaseTransaction,
        day_id: Uuid,
    ) -> ResultEngine<i32> {
        let last = expenses::Entity::find()
            .filter(expenses::Column::DayId.eq(day_id.to_string()))
            .order_by_desc(expenses::Column::DisplayOrder)
            .limit(1)
            .one(db_tx)
            .await?;
        Ok(last.map_or(0, |m| m.display_order + 1))
    }

    pub(super) async fn load_allocations(
        &self,
        db_tx: &DatabaseTransaction,
        expense_id: Uuid,
    ) -> ResultEngine<(Vec<Allocation>, Vec<Allocation>)> {
        let rows = allocations::Entity::find()
            .filter(allocations::Column::ExpenseId.eq(expense_id.to_string()))
            .all(db_tx)
            .await?;

        let mut payers = Vec::new();
        let mut splits = Vec::new();
        for row in &rows {
            let allocation = Allocation::try_from(row)?;
            match row.side_parsed()? {
                AllocationSide::Payer => payers.push(allocation),
                AllocationSide::Split => splits.push(allocation),
            }
        }
        Ok((payers, splits))
    }

    pub(super) async fn assemble_expenses(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<expenses::Model>,
    ) -> ResultEngine<Vec<Expense>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let rows = allocations::Entity::find()
            .filter(allocations::Column::ExpenseId.is_in(ids))
            .all(db_tx)
            .await?;

        let mut by_expense: HashMap<String, (Vec<Allocation>, Vec<Allocation>)> = HashMap::new();
        for row in &rows {
            let allocation = Allocation::try_from(row)?;
            let entry = by_expense.entry(row.expense_id.clone()).or_default();
            match row.side_parsed()? {
                AllocationSide::Payer => entry.0.push(allocation),
                AllocationSide::Split => entry.1.push(allocation),
            }
        }

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let key = model.id.clone();
            let mut expense = Expense::try_from(model)?;
            if let Some((payers, splits)) = by_expense.remove(&key) {
                expense.payers = payers;
                expense.splits = splits;
            }
            out.push(expense);
        }
        Ok(out)
    }
}

/// Splits `amount` evenly across `participants`, distributing the remainder
/// cents one by one from the front so the parts always sum to `amount`
/// exactly.
pub(super) fn equal_split(
    amount: MoneyCents,
    participants: &[ParticipantRef],
) -> ResultEngine<Vec<Allocation>> {
    let count = i64::try_from(participants.len())
        .map_err(|_| EngineError::InvalidAllocation("roster too large".to_string()))?;
    if count == 0 {
        return Err(EngineError::InvalidAllocation(
            "cannot split across an empty roster".to_string(),
        ));
    }

    let base = amount.cents() / count;
    let remainder = amount.cents() % count;

    Ok(participants
        .iter()
        .enumerate()
        .map(|(index, participant)| {
            let extra = i64::from((index as i64) < remainder);
            Allocation::new(participant.clone(), MoneyCents::new(base + extra))
        })
        .collect())
}

fn validate_allocations(
    allocations: &[Allocation],
    total: MoneyCents,
    label: &str,
) -> ResultEngine<()> {
    if allocations.is_empty() {
        return Err(EngineError::InvalidAllocation(format!(
            "{label} set must not be empty"
        )));
    }
    let mut sum = MoneyCents::ZERO;
    for allocation in allocations {
        if !allocation.amount.is_positive() {
            return Err(EngineError::InvalidAllocation(format!(
                "{label} amounts must be > 0"
            )));
        }
        sum = sum
            .checked_add(allocation.amount)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
    }
    if sum != total {
        return Err(EngineError::InvalidAllocation(format!(
            "{label} amounts sum to {sum}, expected {total}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(user_id: &str) -> ParticipantRef {
        ParticipantRef::Member {
            user_id: user_id.to_string(),
        }
    }

    #[test]
    fn equal_split_distributes_remainder_from_the_front() {
        let roster = [member("a"), member("b"), member("c")];
        let parts = equal_split(MoneyCents::new(100), &roster).unwrap();

        let cents: Vec<i64> = parts.iter().map(|a| a.amount.cents()).collect();
        assert_eq!(cents, vec![34, 33, 33]);
        let sum: MoneyCents = parts.iter().map(|a| a.amount).sum();
        assert_eq!(sum, MoneyCents::new(100));
    }

    #[test]
    fn equal_split_exact_division() {
        let roster = [member("a"), member("b")];
        let parts = equal_split(MoneyCents::new(9000), &roster).unwrap();
        assert!(parts.iter().all(|a| a.amount.cents() == 4500));
    }

    #[test]
    fn equal_split_empty_roster_is_rejected() {
        assert!(equal_split(MoneyCents::new(100), &[]).is_err());
    }

    #[test]
    fn allocations_must_sum_to_total() {
        let set = vec![
            Allocation::new(member("a"), MoneyCents::new(50)),
            Allocation::new(member("b"), MoneyCents::new(40)),
        ];
        assert!(validate_allocations(&set, MoneyCents::new(90), "payer").is_ok());
        assert!(validate_allocations(&set, MoneyCents::new(100), "payer").is_err());
    }

    #[test]
    fn empty_or_nonpositive_allocations_are_rejected() {
        assert!(validate_allocations(&[], MoneyCents::new(10), "split").is_err());
        let set = vec![Allocation::new(member("a"), MoneyCents::new(0))];
        assert!(validate_allocations(&set, MoneyCents::ZERO, "split").is_err());
    }
}
