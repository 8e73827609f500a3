//! Trip container.
//!
//! A `Trip` owns its itinerary days, expenses and invites. The date range is
//! nullable: a trip without dates has no itinerary days yet.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub name: String,
    pub destination: Option<String>,
    pub owner_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub currency: Currency,
    pub archived: bool,
    pub shared: bool,
}

impl Trip {
    pub fn new(name: String, destination: Option<String>, owner_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            destination,
            owner_id: owner_id.to_string(),
            start_date: None,
            end_date: None,
            currency: Currency::default(),
            archived: false,
            shared: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub destination: Option<String>,
    pub owner_id: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub currency: String,
    pub archived: bool,
    pub shared: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::itinerary_days::Entity")]
    ItineraryDays,
    #[sea_orm(has_many = "super::trip_invites::Entity")]
    TripInvites,
}

impl Related<super::itinerary_days::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItineraryDays.def()
    }
}

impl Related<super::trip_invites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TripInvites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Trip> for ActiveModel {
    fn from(trip: &Trip) -> Self {
        Self {
            id: ActiveValue::Set(trip.id.clone()),
            name: ActiveValue::Set(trip.name.clone()),
            destination: ActiveValue::Set(trip.destination.clone()),
            owner_id: ActiveValue::Set(trip.owner_id.clone()),
            start_date: ActiveValue::Set(trip.start_date),
            end_date: ActiveValue::Set(trip.end_date),
            currency: ActiveValue::Set(trip.currency.code().to_string()),
            archived: ActiveValue::Set(trip.archived),
            shared: ActiveValue::Set(trip.shared),
        }
    }
}

impl TryFrom<Model> for Trip {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            destination: model.destination,
            owner_id: model.owner_id,
            start_date: model.start_date,
            end_date: model.end_date,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
            archived: model.archived,
            shared: model.shared,
        })
    }
}
