//! Checklist items attached to an itinerary day.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub trip_id: String,
    pub day_id: Uuid,
    pub label: String,
    pub done: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "checklist_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub day_id: String,
    pub label: String,
    pub done: bool,
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

impl From<&ChecklistItem> for ActiveModel {
    fn from(item: &ChecklistItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            trip_id: ActiveValue::Set(item.trip_id.clone()),
            day_id: ActiveValue::Set(item.day_id.to_string()),
            label: ActiveValue::Set(item.label.clone()),
            done: ActiveValue::Set(item.done),
        }
    }
}

impl TryFrom<Model> for ChecklistItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid checklist item id".to_string()))?,
            trip_id: model.trip_id,
            day_id: Uuid::parse_str(&model.day_id)
                .map_err(|_| EngineError::InvalidId("invalid itinerary day id".to_string()))?,
            label: model.label,
            done: model.done,
        })
    }
}
