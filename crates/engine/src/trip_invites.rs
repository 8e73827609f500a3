//! Trip invites.
//!
//! One invite per (trip, normalized email). An invite whose email matches no
//! registered user doubles as the **shadow participant** record for that
//! guest: allocations can reference it before the person ever signs up.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InviteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for InviteStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidId(format!(
                "invalid invite status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripInvite {
    pub id: Uuid,
    pub trip_id: String,
    pub email: String,
    pub status: InviteStatus,
    pub guest_name: Option<String>,
    pub guest_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TripInvite {
    pub fn new(trip_id: String, email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            email,
            status: InviteStatus::Pending,
            guest_name: None,
            guest_avatar: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trip_invites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub email: String,
    pub status: String,
    pub guest_name: Option<String>,
    pub guest_avatar: Option<String>,
    pub created_at: DateTimeUtc,
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
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TripInvite> for ActiveModel {
    fn from(invite: &TripInvite) -> Self {
        Self {
            id: ActiveValue::Set(invite.id.to_string()),
            trip_id: ActiveValue::Set(invite.trip_id.clone()),
            email: ActiveValue::Set(invite.email.clone()),
            status: ActiveValue::Set(invite.status.as_str().to_string()),
            guest_name: ActiveValue::Set(invite.guest_name.clone()),
            guest_avatar: ActiveValue::Set(invite.guest_avatar.clone()),
            created_at: ActiveValue::Set(invite.created_at),
        }
    }
}

impl TryFrom<Model> for TripInvite {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid invite id".to_string()))?,
            trip_id: model.trip_id,
            email: model.email,
            status: InviteStatus::try_from(model.status.as_str())?,
            guest_name: model.guest_name,
            guest_avatar: model.guest_avatar,
            created_at: model.created_at,
        })
    }
}
