use chrono::{Days, NaiveDate};
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, Statement,
    TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ItineraryDay, ResultEngine, checklist_items, expenses, itinerary_days, notes,
    reconcile::{self, DaySnapshot, ReconcilePlan},
    trips,
    util::parse_uuid,
};

use super::{Engine, trips::resolve_range, with_tx};

/// What a would-be-deleted day carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Notes,
    Checklists,
    Expenses,
    Details,
}

/// One day the proposed date change would destroy, with its content summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayConflict {
    pub day_id: Uuid,
    pub day_number: i32,
    pub date: Option<NaiveDate>,
    pub content: Vec<ContentKind>,
}

/// Advisory result of [`Engine::check_date_conflicts`].
///
/// `has_conflicts` is true only when a doomed day actually carries content;
/// deleting empty placeholder days is not worth a warning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub affected_days: Vec<DayConflict>,
}

impl Engine {
    /// Reports, without mutating anything, which itinerary days the proposed
    /// date range would delete and what content they carry.
    ///
    /// Advisory only. The itinerary can change between this call and
    /// [`Engine::set_trip_dates`], which re-derives its own plan and operates
    /// on whatever rows exist at that point.
    pub async fn check_date_conflicts(
        &self,
        trip_id: &str,
        new_start: NaiveDate,
        new_end: Option<NaiveDate>,
        user_id: &str,
    ) -> ResultEngine<ConflictReport> {
        let (start, end) = required_range(new_start, new_end)?;

        with_tx!(self, |db_tx| {
            self.require_trip_member(&db_tx, trip_id, user_id).await?;

            let days = load_days(&db_tx, trip_id).await?;
            let plan = reconcile::plan(&snapshots(&days)?, start, end)?;

            let mut affected_days = Vec::new();
            for day in &days {
                let day_id = parse_uuid(&day.id, "itinerary day id")?;
                if !plan.deleted.contains(&day_id) {
                    continue;
                }
                affected_days.push(DayConflict {
                    day_id,
                    day_number: day.day_number,
                    date: day.date,
                    content: self.day_content(&db_tx, day).await?,
                });
            }

            Ok(ConflictReport {
                has_conflicts: affected_days.iter().any(|d| !d.content.is_empty()),
                affected_days,
            })
        })
    }

    /// Changes the trip's date range and reconciles its day set to match,
    /// all in one transaction (owner only).
    ///
    /// Dropped days cascade their notes, checklist items, allocations and
    /// expenses before the day row. Kept days are renumbered in place, their
    /// dates untouched. New dates get empty days.
    pub async fn set_trip_dates(
        &self,
        trip_id: &str,
        new_start: NaiveDate,
        new_end: Option<NaiveDate>,
        user_id: &str,
    ) -> ResultEngine<ReconcilePlan> {
        let (start, end) = required_range(new_start, new_end)?;

        with_tx!(self, |db_tx| {
            self.require_trip_owner(&db_tx, trip_id, user_id).await?;

            let days = load_days(&db_tx, trip_id).await?;
            let plan = reconcile::plan(&snapshots(&days)?, start, end)?;
            self.apply_plan(&db_tx, trip_id, &plan).await?;

            let trip_update = trips::ActiveModel {
                id: ActiveValue::Set(trip_id.to_string()),
                start_date: ActiveValue::Set(Some(start)),
                end_date: ActiveValue::Set(Some(end)),
                ..Default::default()
            };
            trip_update.update(&db_tx).await?;

            Ok(plan)
        })
    }

    /// Appends one day at the end of the trip by extending `end_date`
    /// (owner only). Pure extension: never deletes existing content.
    pub async fn add_day(&self, trip_id: &str, user_id: &str) -> ResultEngine<ItineraryDay> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            let (Some(start), Some(end)) = (trip.start_date, trip.end_date) else {
                return Err(EngineError::InvalidDateRange(
                    "trip has no date range to extend".to_string(),
                ));
            };
            let new_end = end
                .checked_add_days(Days::new(1))
                .ok_or_else(|| EngineError::InvalidDateRange("date overflow".to_string()))?;

            let days = load_days(&db_tx, trip_id).await?;
            let plan = reconcile::plan(&snapshots(&days)?, start, new_end)?;
            debug_assert!(plan.is_pure_extension());
            self.apply_plan(&db_tx, trip_id, &plan).await?;

            let trip_update = trips::ActiveModel {
                id: ActiveValue::Set(trip_id.to_string()),
                end_date: ActiveValue::Set(Some(new_end)),
                ..Default::default()
            };
            trip_update.update(&db_tx).await?;

            let appended = itinerary_days::Entity::find()
                .filter(itinerary_days::Column::TripId.eq(trip_id.to_string()))
                .filter(itinerary_days::Column::Date.eq(new_end))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("itinerary day not exists".to_string())
                })?;
            ItineraryDay::try_from(appended)
        })
    }

    /// Removes one day and everything on it, then closes the gap: every
    /// later day moves up one `day_number` and one calendar day, and the
    /// trip's `end_date` shrinks by one (owner only).
    pub async fn delete_itinerary_day(&self, day_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (day, trip) = self.require_day(&db_tx, day_id, user_id).await?;
            if trip.owner_id != user_id {
                return Err(EngineError::Forbidden(
                    "only the trip owner can delete itinerary days".to_string(),
                ));
            }

            self.delete_day_cascade(&db_tx, &day.id).await?;

            let later = itinerary_days::Entity::find()
                .filter(itinerary_days::Column::TripId.eq(trip.id.clone()))
                .filter(itinerary_days::Column::DayNumber.gt(day.day_number))
                .order_by_asc(itinerary_days::Column::DayNumber)
                .all(&db_tx)
                .await?;
            for model in later {
                let shifted = match model.date {
                    None => None,
                    Some(date) => Some(date.checked_sub_days(Days::new(1)).ok_or_else(|| {
                        EngineError::InvalidDateRange("date underflow".to_string())
                    })?),
                };
                let update = itinerary_days::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    day_number: ActiveValue::Set(model.day_number - 1),
                    date: ActiveValue::Set(shifted),
                    ..Default::default()
                };
                update.update(&db_tx).await?;
            }

            if let Some(end) = trip.end_date {
                let remaining = itinerary_days::Entity::find()
                    .filter(itinerary_days::Column::TripId.eq(trip.id.clone()))
                    .count(&db_tx)
                    .await?;
                let new_end = (remaining > 0)
                    .then(|| end.checked_sub_days(Days::new(1)))
                    .flatten();
                let trip_update = trips::ActiveModel {
                    id: ActiveValue::Set(trip.id.clone()),
                    start_date: ActiveValue::Set(trip.start_date.filter(|_| remaining > 0)),
                    end_date: ActiveValue::Set(new_end),
                    ..Default::default()
                };
                trip_update.update(&db_tx).await?;
            }

            Ok(())
        })
    }

    async fn apply_plan(
        &self,
        db_tx: &DatabaseTransaction,
        trip_id: &str,
        plan: &ReconcilePlan,
    ) -> ResultEngine<()> {
        for doomed in &plan.deleted {
            self.delete_day_cascade(db_tx, &doomed.to_string()).await?;
        }
        for kept in &plan.kept {
            let update = itinerary_days::ActiveModel {
                id: ActiveValue::Set(kept.day_id.to_string()),
                day_number: ActiveValue::Set(kept.new_day_number),
                ..Default::default()
            };
            update.update(db_tx).await?;
        }
        for created in &plan.created {
            let day = ItineraryDay::new(trip_id.to_string(), created.day_number, Some(created.date));
            itinerary_days::ActiveModel::from(&day).insert(db_tx).await?;
        }
        Ok(())
    }

    /// Ordered hard delete of one day and its dependents: allocations,
    /// expenses, notes, checklist items, then the day row.
    async fn delete_day_cascade(
        &self,
        db_tx: &DatabaseTransaction,
        day_id: &str,
    ) -> ResultEngine<()> {
        let backend = self.database.get_database_backend();

        db_tx
            .execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM allocations WHERE expense_id IN (SELECT id FROM expenses WHERE day_id = ?);",
                vec![day_id.into()],
            ))
            .await?;
        for table in ["expenses", "notes", "checklist_items"] {
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    format!("DELETE FROM {table} WHERE day_id = ?;"),
                    vec![day_id.into()],
                ))
                .await?;
        }
        db_tx
            .execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM itinerary_days WHERE id = ?;",
                vec![day_id.into()],
            ))
            .await?;
        Ok(())
    }

    async fn day_content(
        &self,
        db_tx: &DatabaseTransaction,
        day: &itinerary_days::Model,
    ) -> ResultEngine<Vec<ContentKind>> {
        let mut content = Vec::new();

        let note_count = notes::Entity::find()
            .filter(notes::Column::DayId.eq(day.id.clone()))
            .count(db_tx)
            .await?;
        if note_count > 0 {
            content.push(ContentKind::Notes);
        }

        let checklist_count = checklist_items::Entity::find()
            .filter(checklist_items::Column::DayId.eq(day.id.clone()))
            .count(db_tx)
            .await?;
        if checklist_count > 0 {
            content.push(ContentKind::Checklists);
        }

        let expense_count = expenses::Entity::find()
            .filter(expenses::Column::DayId.eq(day.id.clone()))
            .filter(expenses::Column::DeletedAt.is_null())
            .count(db_tx)
            .await?;
        if expense_count > 0 {
            content.push(ContentKind::Expenses);
        }

        let day = ItineraryDay::try_from(day.clone())?;
        if day.has_details() {
            content.push(ContentKind::Details);
        }

        Ok(content)
    }
}

fn required_range(start: NaiveDate, end: Option<NaiveDate>) -> ResultEngine<(NaiveDate, NaiveDate)> {
    match resolve_range(Some(start), end)? {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(EngineError::InvalidDateRange(
            "start date is required".to_string(),
        )),
    }
}

async fn load_days(
    db_tx: &DatabaseTransaction,
    trip_id: &str,
) -> ResultEngine<Vec<itinerary_days::Model>> {
    Ok(itinerary_days::Entity::find()
        .filter(itinerary_days::Column::TripId.eq(trip_id.to_string()))
        .order_by_asc(itinerary_days::Column::DayNumber)
        .all(db_tx)
        .await?)
}

fn snapshots(days: &[itinerary_days::Model]) -> ResultEngine<Vec<DaySnapshot>> {
    days.iter()
        .map(|day| {
            Ok(DaySnapshot {
                id: parse_uuid(&day.id, "itinerary day id")?,
                date: day.date,
            })
        })
        .collect()
}
