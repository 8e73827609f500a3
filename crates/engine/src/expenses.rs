//! Trip expenses.
//!
//! An `Expense` is a trip-scoped transaction that belongs to exactly one
//! itinerary day. It carries two allocation sets (payers and splits) which
//! are created together with the row and replaced wholesale on edit, never
//! patched incrementally. Soft delete hides an expense from listings and
//! balances but retains the row.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Allocation, EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub trip_id: String,
    pub day_id: Uuid,
    pub amount: MoneyCents,
    pub description: String,
    pub category: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub display_order: i32,
    pub created_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub payers: Vec<Allocation>,
    pub splits: Vec<Allocation>,
}

impl Expense {
    pub fn new(
        trip_id: String,
        day_id: Uuid,
        amount: MoneyCents,
        description: String,
        category: Option<String>,
        occurred_at: DateTime<Utc>,
        created_by: String,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            trip_id,
            day_id,
            amount,
            description,
            category,
            occurred_at,
            display_order: 0,
            created_by,
            deleted_at: None,
            payers: Vec::new(),
            splits: Vec::new(),
        })
    }

    /// True when the expense is hidden from listings and balances.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub day_id: String,
    pub amount_minor: i64,
    pub description: String,
    pub category: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub display_order: i32,
    pub created_by: String,
    pub deleted_at: Option<DateTimeUtc>,
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
    #[sea_orm(has_many = "super::allocations::Entity")]
    Allocations,
}

impl Related<super::itinerary_days::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItineraryDays.def()
    }
}

impl Related<super::allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            trip_id: ActiveValue::Set(expense.trip_id.clone()),
            day_id: ActiveValue::Set(expense.day_id.to_string()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            description: ActiveValue::Set(expense.description.clone()),
            category: ActiveValue::Set(expense.category.clone()),
            occurred_at: ActiveValue::Set(expense.occurred_at),
            display_order: ActiveValue::Set(expense.display_order),
            created_by: ActiveValue::Set(expense.created_by.clone()),
            deleted_at: ActiveValue::Set(expense.deleted_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()))?,
            trip_id: model.trip_id,
            day_id: Uuid::parse_str(&model.day_id)
                .map_err(|_| EngineError::InvalidId("invalid itinerary day id".to_string()))?,
            amount: MoneyCents::new(model.amount_minor),
            description: model.description,
            category: model.category,
            occurred_at: model.occurred_at,
            display_order: model.display_order,
            created_by: model.created_by,
            deleted_at: model.deleted_at,
            payers: Vec::new(),
            splits: Vec::new(),
        })
    }
}
