//! Free-text notes attached to an itinerary day.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub trip_id: String,
    pub day_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub day_id: String,
    pub body: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::itinerary_days::Entity",
        from = "Column::DayId",
        to = "super::itinerary_days::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ItineraryDays,
}

impl Related<super::itinerary_days::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItineraryDays.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Note> for ActiveModel {
    fn from(note: &Note) -> Self {
        Self {
            id: ActiveValue::Set(note.id.to_string()),
            trip_id: ActiveValue::Set(note.trip_id.clone()),
            day_id: ActiveValue::Set(note.day_id.to_string()),
            body: ActiveValue::Set(note.body.clone()),
            created_at: ActiveValue::Set(note.created_at),
        }
    }
}

impl TryFrom<Model> for Note {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid note id".to_string()))?,
            trip_id: model.trip_id,
            day_id: Uuid::parse_str(&model.day_id)
                .map_err(|_| EngineError::InvalidId("invalid itinerary day id".to_string()))?,
            body: model.body,
            created_at: model.created_at,
        })
    }
}
