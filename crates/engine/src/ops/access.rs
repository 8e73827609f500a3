use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, InviteStatus, ResultEngine, expenses, itinerary_days, trip_invites, trips, users,
    util::normalize_email,
};

use super::Engine;

impl Engine {
    pub(super) async fn find_trip_by_id(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
    ) -> ResultEngine<Option<trips::Model>> {
        trips::Entity::find_by_id(trip_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Only the trip creator may change trip-level state (rename, dates,
    /// archive, share, delete).
    pub(super) async fn require_trip_owner(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<trips::Model> {
        let model = self
            .find_trip_by_id(db, trip_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("trip not exists".to_string()))?;
        if model.owner_id != user_id {
            return Err(EngineError::Forbidden(
                "only the trip creator may do this".to_string(),
            ));
        }
        Ok(model)
    }

    /// The pending/accepted invite row matching this user's email, if any.
    pub(super) async fn invite_for_user(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
        user: &users::Model,
    ) -> ResultEngine<Option<trip_invites::Model>> {
        let email = normalize_email(&user.email)?;
        let row = trip_invites::Entity::find()
            .filter(trip_invites::Column::TripId.eq(trip_id.to_string()))
            .filter(trip_invites::Column::Email.eq(email))
            .one(db)
            .await?;
        Ok(row.filter(|m| m.status != InviteStatus::Rejected.as_str()))
    }

    /// The creator plus any pending/accepted invitee may read and write trip
    /// content (itinerary days, notes, checklists, expenses).
    pub(super) async fn require_trip_member(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<trips::Model> {
        let model = self
            .find_trip_by_id(db, trip_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("trip not exists".to_string()))?;
        if model.owner_id == user_id {
            return Ok(model);
        }
        let user = self.require_user(db, user_id).await?;
        if self.invite_for_user(db, trip_id, &user).await?.is_none() {
            return Err(EngineError::Forbidden(
                "not a participant of this trip".to_string(),
            ));
        }
        Ok(model)
    }

    /// Loads a day together with its trip after a membership check.
    pub(super) async fn require_day(
        &self,
        db: &DatabaseTransaction,
        day_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(itinerary_days::Model, trips::Model)> {
        let day = itinerary_days::Entity::find_by_id(day_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("itinerary day not exists".to_string()))?;
        let trip = self.require_trip_member(db, &day.trip_id, user_id).await?;
        Ok((day, trip))
    }

    /// Loads an expense after a membership check on its trip.
    pub(super) async fn require_expense(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(expenses::Model, trips::Model)> {
        let expense = expenses::Entity::find_by_id(expense_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        let trip = self
            .require_trip_member(db, &expense.trip_id, user_id)
            .await?;
        Ok((expense, trip))
    }
}
