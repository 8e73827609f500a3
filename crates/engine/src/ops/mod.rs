use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{EngineError, InviteNotifier, LogNotifier, ResultEngine};

mod access;
mod balances;
mod days;
mod expenses;
mod itinerary;
mod participants;
mod trips;

pub use balances::TripBalance;
pub use expenses::{NewExpense, UpdateExpense};
pub use itinerary::{ConflictReport, ContentKind, DayConflict};
pub use trips::{NewTrip, TripItinerary};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn InviteNotifier>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidId(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Arc<dyn InviteNotifier>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            notifier: Arc::new(LogNotifier),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the invitation notifier (defaults to [`LogNotifier`]).
    pub fn notifier(mut self, notifier: Arc<dyn InviteNotifier>) -> EngineBuilder {
        self.notifier = notifier;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            notifier: self.notifier,
        })
    }
}
