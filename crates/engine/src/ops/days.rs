use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ChecklistItem, EngineError, Note, ResultEngine, checklist_items, itinerary_days, notes,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Sets a day's free-text header (title and location). Blank values
    /// clear the field.
    pub async fn set_day_details(
        &self,
        day_id: Uuid,
        title: Option<&str>,
        location: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_day(&db_tx, day_id, user_id).await?;
            let model = itinerary_days::ActiveModel {
                id: ActiveValue::Set(day_id.to_string()),
                title: ActiveValue::Set(normalize_optional_text(title)),
                location: ActiveValue::Set(normalize_optional_text(location)),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn add_note(&self, day_id: Uuid, body: &str, user_id: &str) -> ResultEngine<Note> {
        let body = normalize_required_text(body, "note body")?;
        with_tx!(self, |db_tx| {
            let (day, _trip) = self.require_day(&db_tx, day_id, user_id).await?;
            let note = Note {
                id: Uuid::new_v4(),
                trip_id: day.trip_id,
                day_id,
                body,
                created_at: Utc::now(),
            };
            notes::ActiveModel::from(&note).insert(&db_tx).await?;
            Ok(note)
        })
    }

    pub async fn add_checklist_item(
        &self,
        day_id: Uuid,
        label: &str,
        user_id: &str,
    ) -> ResultEngine<ChecklistItem> {
        let label = normalize_required_text(label, "checklist label")?;
        with_tx!(self, |db_tx| {
            let (day, _trip) = self.require_day(&db_tx, day_id, user_id).await?;
            let item = ChecklistItem {
                id: Uuid::new_v4(),
                trip_id: day.trip_id,
                day_id,
                label,
                done: false,
            };
            checklist_items::ActiveModel::from(&item).insert(&db_tx).await?;
            Ok(item)
        })
    }

    /// Ticks or unticks a checklist item.
    pub async fn set_checklist_item_done(
        &self,
        item_id: Uuid,
        done: bool,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let item = checklist_items::Entity::find_by_id(item_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("checklist item not exists".to_string())
                })?;
            self.require_trip_member(&db_tx, &item.trip_id, user_id).await?;

            let model = checklist_items::ActiveModel {
                id: ActiveValue::Set(item_id.to_string()),
                done: ActiveValue::Set(done),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Lists a day's notes, oldest first.
    pub async fn list_day_notes(&self, day_id: Uuid, user_id: &str) -> ResultEngine<Vec<Note>> {
        with_tx!(self, |db_tx| {
            self.require_day(&db_tx, day_id, user_id).await?;
            notes::Entity::find()
                .filter(notes::Column::DayId.eq(day_id.to_string()))
                .order_by_asc(notes::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Note::try_from)
                .collect()
        })
    }

    /// Lists a day's checklist, open items before done ones.
    pub async fn list_day_checklist(
        &self,
        day_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<ChecklistItem>> {
        with_tx!(self, |db_tx| {
            self.require_day(&db_tx, day_id, user_id).await?;
            checklist_items::Entity::find()
                .filter(checklist_items::Column::DayId.eq(day_id.to_string()))
                .order_by_asc(checklist_items::Column::Done)
                .order_by_asc(checklist_items::Column::Label)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ChecklistItem::try_from)
                .collect()
        })
    }
}
