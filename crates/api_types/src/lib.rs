use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Npr,
}

/// A participant reference as it travels over the wire.
///
/// `kind` is `member` (id = username) or `guest` (id = invite record UUID).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRef {
    pub kind: String,
    pub id: String,
}

pub mod trip {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripNew {
        pub name: String,
        pub destination: Option<String>,
        /// ISO 8601 calendar date.
        pub start_date: Option<NaiveDate>,
        /// Omitted with a start date present means a single-day trip.
        pub end_date: Option<NaiveDate>,
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripView {
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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripDestination {
        pub destination: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripArchive {
        pub archived: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripShare {
        pub shared: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripListResponse {
        pub trips: Vec<TripView>,
    }
}

pub mod itinerary {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DayView {
        pub id: Uuid,
        pub day_number: i32,
        pub date: Option<NaiveDate>,
        pub title: Option<String>,
        pub location: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItineraryResponse {
        pub trip: trip::TripView,
        pub days: Vec<DayView>,
    }

    /// Request body for changing a trip's date range.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DatesSet {
        pub start_date: NaiveDate,
        /// Omitted means a single-day trip.
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DayDetails {
        pub title: Option<String>,
        pub location: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoteNew {
        pub body: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoteView {
        pub id: Uuid,
        pub body: String,
        /// RFC3339 timestamp, including timezone offset.
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChecklistItemNew {
        pub label: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChecklistItemDone {
        pub done: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChecklistItemView {
        pub id: Uuid,
        pub label: String,
        pub done: bool,
    }

    /// What a would-be-deleted day carries, as reported by the conflict
    /// advisory endpoint.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ContentKind {
        Notes,
        Checklists,
        Expenses,
        Details,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DayConflictView {
        pub day_id: Uuid,
        pub day_number: i32,
        pub date: Option<NaiveDate>,
        pub content: Vec<ContentKind>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConflictReportResponse {
        pub has_conflicts: bool,
        pub affected_days: Vec<DayConflictView>,
    }
}

pub mod invite {
    use super::*;

    /// Request body for resolving a participant by email, creating the
    /// invite if none exists yet. Idempotent.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantResolve {
        pub email: String,
        pub guest_name: Option<String>,
        pub guest_avatar: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantView {
        pub participant: ParticipantRef,
        pub email: String,
        pub display_name: String,
        pub avatar: Option<String>,
        pub is_guest: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RosterResponse {
        pub participants: Vec<ParticipantView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationEntry {
        pub participant: ParticipantRef,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub day_id: Uuid,
        /// Must be > 0.
        pub amount_minor: i64,
        pub description: String,
        pub category: Option<String>,
        /// RFC3339 timestamp; defaults to now when omitted.
        pub occurred_at: Option<DateTime<FixedOffset>>,
        /// Empty means the acting participant paid the full amount.
        #[serde(default)]
        pub payers: Vec<AllocationEntry>,
        /// Empty means an equal split across the roster.
        #[serde(default)]
        pub splits: Vec<AllocationEntry>,
        /// Personal expense: splits mirror payers, neutral for settlement.
        #[serde(default)]
        pub dont_split: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub amount_minor: Option<i64>,
        pub description: Option<String>,
        /// A blank string clears the category.
        pub category: Option<String>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub payers: Option<Vec<AllocationEntry>>,
        pub splits: Option<Vec<AllocationEntry>>,
        #[serde(default)]
        pub dont_split: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub day_id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        pub category: Option<String>,
        pub occurred_at: DateTime<FixedOffset>,
        pub display_order: i32,
        pub created_by: String,
        pub deleted: bool,
        pub payers: Vec<AllocationEntry>,
        pub splits: Vec<AllocationEntry>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseReorder {
        pub ordered_ids: Vec<Uuid>,
    }
}

pub mod balance {
    use super::*;

    /// One roster entry's settlement position. Positive `balance_minor`
    /// means the group owes this participant.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub participant: ParticipantRef,
        pub paid_minor: i64,
        pub owed_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<BalanceView>,
    }
}
