//! Expense allocations.
//!
//! An [`Allocation`] attributes part of an expense to one participant, on one
//! of two sides:
//!
//! - `payer`: how much of the expense that participant physically paid
//! - `split`: how much of the cost is attributed to that participant
//!
//! Amounts are stored as positive integer **minor units** (cents). The two
//! sides are independent sets; each is expected to sum to the expense total,
//! which the write ops validate before inserting.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ParticipantRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationSide {
    Payer,
    Split,
}

impl AllocationSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payer => "payer",
            Self::Split => "split",
        }
    }
}

impl TryFrom<&str> for AllocationSide {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "payer" => Ok(Self::Payer),
            "split" => Ok(Self::Split),
            other => Err(EngineError::InvalidAllocation(format!(
                "invalid allocation side: {other}"
            ))),
        }
    }
}

/// One participant's share on one side of an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub participant: ParticipantRef,
    pub amount: MoneyCents,
}

impl Allocation {
    pub fn new(participant: ParticipantRef, amount: MoneyCents) -> Self {
        Self {
            participant,
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub side: String,
    pub participant_kind: String,
    pub participant_id: String,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn side_parsed(&self) -> Result<AllocationSide, EngineError> {
        AllocationSide::try_from(self.side.as_str())
    }
}

pub(crate) fn active_model(
    expense_id: Uuid,
    side: AllocationSide,
    allocation: &Allocation,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        expense_id: ActiveValue::Set(expense_id.to_string()),
        side: ActiveValue::Set(side.as_str().to_string()),
        participant_kind: ActiveValue::Set(allocation.participant.kind().as_str().to_string()),
        participant_id: ActiveValue::Set(allocation.participant.id_string()),
        amount_minor: ActiveValue::Set(allocation.amount.cents()),
    }
}

impl TryFrom<&Model> for Allocation {
    type Error = EngineError;

    fn try_from(model: &Model) -> Result<Self, Self::Error> {
        Ok(Self {
            participant: ParticipantRef::from_stored(
                &model.participant_kind,
                &model.participant_id,
            )?,
            amount: MoneyCents::new(model.amount_minor),
        })
    }
}
