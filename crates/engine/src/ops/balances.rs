use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{
    ResultEngine,
    balance::{self, BalanceLine},
    expenses,
    participants::ParticipantRef,
};

use super::{Engine, with_tx};

/// One roster entry with its settlement position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripBalance {
    pub participant: ParticipantRef,
    pub line: BalanceLine,
}

impl Engine {
    /// Computes the trip's settlement snapshot from all live expenses.
    ///
    /// Returns one entry per roster participant plus entries for any
    /// allocation referring to someone no longer on the roster, ordered by
    /// participant id for stable output. The lines always sum to zero.
    pub async fn trip_balances(
        &self,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<TripBalance>> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_member(&db_tx, trip_id, user_id).await?;

            let roster: Vec<ParticipantRef> = self
                .roster_in_tx(&db_tx, &trip)
                .await?
                .into_iter()
                .map(|p| p.reference)
                .collect();

            let models = expenses::Entity::find()
                .filter(expenses::Column::TripId.eq(trip_id.to_string()))
                .filter(expenses::Column::DeletedAt.is_null())
                .all(&db_tx)
                .await?;
            let expenses = self.assemble_expenses(&db_tx, models).await?;

            let mut lines: Vec<TripBalance> = balance::compute_balances(&expenses, &roster)
                .into_iter()
                .map(|(participant, line)| TripBalance { participant, line })
                .collect();
            lines.sort_by(|a, b| a.participant.id_string().cmp(&b.participant.id_string()));
            Ok(lines)
        })
    }
}
