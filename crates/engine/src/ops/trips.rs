use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    Currency, EngineError, InviteStatus, ItineraryDay, ResultEngine, Trip, itinerary_days,
    reconcile, trip_invites, trips, util::normalize_email,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

/// Parameters for [`Engine::create_trip`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewTrip {
    pub name: String,
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// Omitted with a start date present means a single-day trip.
    pub end_date: Option<NaiveDate>,
    pub currency: Option<Currency>,
}

/// A trip with its itinerary days ordered by `day_number`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripItinerary {
    pub trip: Trip,
    pub days: Vec<ItineraryDay>,
}

impl Engine {
    /// Creates a trip and seeds one itinerary day per date of its range.
    pub async fn create_trip(&self, new_trip: NewTrip, user_id: &str) -> ResultEngine<Trip> {
        let name = normalize_required_text(&new_trip.name, "trip name")?;
        let (start, end) = resolve_range(new_trip.start_date, new_trip.end_date)?;

        let mut trip = Trip::new(
            name,
            normalize_optional_text(new_trip.destination.as_deref()),
            user_id,
        );
        trip.currency = new_trip.currency.unwrap_or_default();
        trip.start_date = start;
        trip.end_date = end;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let trip_entry: trips::ActiveModel = (&trip).into();
            trip_entry.insert(&db_tx).await?;

            if let (Some(start), Some(end)) = (trip.start_date, trip.end_date) {
                let plan = reconcile::plan(&[], start, end)?;
                for created in &plan.created {
                    let day =
                        ItineraryDay::new(trip.id.clone(), created.day_number, Some(created.date));
                    itinerary_days::ActiveModel::from(&day).insert(&db_tx).await?;
                }
            }

            Ok(trip.clone())
        })
    }

    /// Renames a trip (owner only).
    pub async fn rename_trip(&self, trip_id: &str, name: &str, user_id: &str) -> ResultEngine<()> {
        let name = normalize_required_text(name, "trip name")?;
        with_tx!(self, |db_tx| {
            self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            let model = trips::ActiveModel {
                id: ActiveValue::Set(trip_id.to_string()),
                name: ActiveValue::Set(name),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Updates the destination (owner only).
    pub async fn set_destination(
        &self,
        trip_id: &str,
        destination: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            let model = trips::ActiveModel {
                id: ActiveValue::Set(trip_id.to_string()),
                destination: ActiveValue::Set(normalize_optional_text(destination)),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Toggles the archive flag (owner only).
    pub async fn archive_trip(
        &self,
        trip_id: &str,
        archived: bool,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            let model = trips::ActiveModel {
                id: ActiveValue::Set(trip_id.to_string()),
                archived: ActiveValue::Set(archived),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Toggles the public-share flag (owner only).
    pub async fn set_trip_shared(
        &self,
        trip_id: &str,
        shared: bool,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            let model = trips::ActiveModel {
                id: ActiveValue::Set(trip_id.to_string()),
                shared: ActiveValue::Set(shared),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes a trip and everything it owns (owner only).
    ///
    /// The cascade is explicit and ordered so it also holds on backends
    /// without `ON DELETE CASCADE` everywhere: allocations, expenses, notes,
    /// checklist items, days, invites, then the trip row, all in one
    /// transaction.
    pub async fn delete_trip(&self, trip_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let trip_model = self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            let trip_db_id = trip_model.id;

            let backend = self.database.get_database_backend();

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM allocations WHERE expense_id IN (SELECT id FROM expenses WHERE trip_id = ?);",
                    vec![trip_db_id.clone().into()],
                ))
                .await?;

            for table in ["expenses", "notes", "checklist_items", "itinerary_days", "trip_invites"] {
                db_tx
                    .execute(Statement::from_sql_and_values(
                        backend,
                        format!("DELETE FROM {table} WHERE trip_id = ?;"),
                        vec![trip_db_id.clone().into()],
                    ))
                    .await?;
            }

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM trips WHERE id = ?;",
                    vec![trip_db_id.into()],
                ))
                .await?;

            Ok(())
        })
    }

    /// Returns the trip and its days ordered by `day_number`.
    pub async fn trip_itinerary(&self, trip_id: &str, user_id: &str) -> ResultEngine<TripItinerary> {
        with_tx!(self, |db_tx| {
            let trip_model = self.require_trip_member(&db_tx, trip_id, user_id).await?;
            let day_models = itinerary_days::Entity::find()
                .filter(itinerary_days::Column::TripId.eq(trip_model.id.clone()))
                .order_by_asc(itinerary_days::Column::DayNumber)
                .all(&db_tx)
                .await?;

            let trip = Trip::try_from(trip_model)?;
            let days = day_models
                .into_iter()
                .map(ItineraryDay::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TripItinerary { trip, days })
        })
    }

    /// Lists trips the user owns or was invited to (rejected invites excluded).
    pub async fn list_trips(&self, user_id: &str) -> ResultEngine<Vec<Trip>> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let email = normalize_email(&user.email)?;

            let mut models = trips::Entity::find()
                .filter(trips::Column::OwnerId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;

            let invites = trip_invites::Entity::find()
                .filter(trip_invites::Column::Email.eq(email))
                .filter(trip_invites::Column::Status.ne(InviteStatus::Rejected.as_str()))
                .all(&db_tx)
                .await?;
            for invite in invites {
                if models.iter().any(|t| t.id == invite.trip_id) {
                    continue;
                }
                if let Some(trip) = self.find_trip_by_id(&db_tx, &invite.trip_id).await? {
                    models.push(trip);
                }
            }

            models
                .into_iter()
                .map(Trip::try_from)
                .collect::<Result<Vec<_>, _>>()
        })
    }
}

pub(super) fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ResultEngine<(Option<NaiveDate>, Option<NaiveDate>)> {
    match (start, end) {
        (None, None) => Ok((None, None)),
        // An omitted end date means a single-day trip.
        (Some(start), None) => Ok((Some(start), Some(start))),
        (None, Some(_)) => Err(EngineError::InvalidDateRange(
            "end date without start date".to_string(),
        )),
        (Some(start), Some(end)) => {
            if end < start {
                return Err(EngineError::InvalidDateRange(format!(
                    "end date {end} is before start date {start}"
                )));
            }
            Ok((Some(start), Some(end)))
        }
    }
}
