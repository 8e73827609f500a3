//! Trip expense ledger and itinerary engine.
//!
//! The engine owns the relational schema (sea-orm entities), the pure cores
//! ([`balance`] and [`reconcile`]) and every operation the outer surfaces
//! call: trip lifecycle, participant resolution, the expense ledger and
//! itinerary date reconciliation.

pub use allocations::{Allocation, AllocationSide};
pub use balance::{BalanceLine, compute_balances};
pub use checklist_items::ChecklistItem;
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::Expense;
pub use itinerary_days::ItineraryDay;
pub use money::MoneyCents;
pub use notes::Note;
pub use notify::{InviteNotification, InviteNotifier, LogNotifier, NotifyError};
pub use ops::{
    ConflictReport, ContentKind, DayConflict, Engine, EngineBuilder, NewExpense, NewTrip,
    TripBalance, TripItinerary, UpdateExpense,
};
pub use participants::{Participant, ParticipantRef};
pub use reconcile::{CreatedDay, DaySnapshot, KeptDay, ReconcilePlan};
pub use trip_invites::{InviteStatus, TripInvite};
pub use trips::Trip;

mod allocations;
pub mod balance;
mod checklist_items;
mod currency;
mod error;
mod expenses;
mod itinerary_days;
mod money;
mod notes;
mod notify;
mod ops;
mod participants;
pub mod reconcile;
mod trip_invites;
mod trips;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
