//! Itinerary days.
//!
//! Within a trip, `day_number` is 1-based, dense and contiguous, increasing
//! in lockstep with `date`. For a trip with a concrete date range the set of
//! day dates is exactly the calendar dates in `[start_date, end_date]`.
//! A day with `date = NULL` only occurs transiently and is unconditionally
//! removable by reconciliation.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub id: Uuid,
    pub trip_id: String,
    pub day_number: i32,
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    pub location: Option<String>,
}

impl ItineraryDay {
    pub fn new(trip_id: String, day_number: i32, date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            day_number,
            date,
            title: None,
            location: None,
        }
    }

    /// True when the day carries user-entered header content.
    #[must_use]
    pub fn has_details(&self) -> bool {
        let non_blank = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());
        non_blank(&self.title) || non_blank(&self.location)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "itinerary_days")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub day_number: i32,
    pub date: Option<Date>,
    pub title: Option<String>,
    pub location: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trips::Entity",
        from = "Column::TripId",
        to = "super::trips::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Trips,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::notes::Entity")]
    Notes,
    #[sea_orm(has_many = "super::checklist_items::Entity")]
    ChecklistItems,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ItineraryDay> for ActiveModel {
    fn from(day: &ItineraryDay) -> Self {
        Self {
            id: ActiveValue::Set(day.id.to_string()),
            trip_id: ActiveValue::Set(day.trip_id.clone()),
            day_number: ActiveValue::Set(day.day_number),
            date: ActiveValue::Set(day.date),
            title: ActiveValue::Set(day.title.clone()),
            location: ActiveValue::Set(day.location.clone()),
        }
    }
}

impl TryFrom<Model> for ItineraryDay {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid itinerary day id".to_string()))?,
            trip_id: model.trip_id,
            day_number: model.day_number,
            date: model.date,
            title: model.title,
            location: model.location,
        })
    }
}
