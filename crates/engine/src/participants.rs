//! Participant identity.
//!
//! A participant in a trip is either a **member** (a registered `users` row)
//! or a **guest** (a `trip_invites` row whose email has no account yet, also
//! called a shadow participant). Allocations reference participants through
//! [`ParticipantRef`], a tagged (kind, id) pair, so there is exactly one
//! place that knows how to tell the two apart.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ParticipantKind {
    Member,
    Guest,
}

impl ParticipantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Guest => "guest",
        }
    }
}

impl TryFrom<&str> for ParticipantKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "member" => Ok(Self::Member),
            "guest" => Ok(Self::Guest),
            other => Err(EngineError::InvalidAllocation(format!(
                "invalid participant kind: {other}"
            ))),
        }
    }
}

/// Tagged reference to a participant, as stored on allocation rows.
///
/// Members are keyed by username, guests by the id of their invite row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipantRef {
    Member { user_id: String },
    Guest { invite_id: Uuid },
}

impl ParticipantRef {
    pub(crate) fn kind(&self) -> ParticipantKind {
        match self {
            Self::Member { .. } => ParticipantKind::Member,
            Self::Guest { .. } => ParticipantKind::Guest,
        }
    }

    pub(crate) fn id_string(&self) -> String {
        match self {
            Self::Member { user_id } => user_id.clone(),
            Self::Guest { invite_id } => invite_id.to_string(),
        }
    }

    pub(crate) fn from_stored(kind: &str, id: &str) -> Result<Self, EngineError> {
        match ParticipantKind::try_from(kind)? {
            ParticipantKind::Member => Ok(Self::Member {
                user_id: id.to_string(),
            }),
            ParticipantKind::Guest => Ok(Self::Guest {
                invite_id: Uuid::parse_str(id)
                    .map_err(|_| EngineError::InvalidId("invalid invite id".to_string()))?,
            }),
        }
    }
}

/// Resolved participant identity: the reference plus its display surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub reference: ParticipantRef,
    pub email: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub is_guest: bool,
}

impl Participant {
    #[must_use]
    pub fn id(&self) -> &ParticipantRef {
        &self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_roundtrip() {
        let member = ParticipantRef::Member {
            user_id: "alice".to_string(),
        };
        let restored =
            ParticipantRef::from_stored(member.kind().as_str(), &member.id_string()).unwrap();
        assert_eq!(member, restored);

        let guest = ParticipantRef::Guest {
            invite_id: Uuid::new_v4(),
        };
        let restored =
            ParticipantRef::from_stored(guest.kind().as_str(), &guest.id_string()).unwrap();
        assert_eq!(guest, restored);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(ParticipantRef::from_stored("robot", "x").is_err());
    }
}
