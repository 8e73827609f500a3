//! Settle-up balance computation.
//!
//! Pure and deterministic: given a ledger snapshot and the trip roster it
//! produces one [`BalanceLine`] per participant. Sign convention: positive
//! balance = the group owes that participant, negative = they owe the group.
//!
//! Whenever every expense's payer allocations sum to its total and its split
//! allocations do too, the balances sum to zero across the roster.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Expense, MoneyCents, ParticipantRef};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLine {
    pub paid: MoneyCents,
    pub owed: MoneyCents,
    pub balance: MoneyCents,
}

/// Computes per-participant net balances over `expenses`.
///
/// Every roster participant appears in the output, zero-activity ones with
/// an all-zero line. Allocations referencing a participant outside `roster`
/// (point-in-time roster capture means this can happen after someone is
/// removed) still get a line, so the zero-sum property holds regardless.
/// Soft-deleted expenses are skipped.
#[must_use]
pub fn compute_balances(
    expenses: &[Expense],
    roster: &[ParticipantRef],
) -> HashMap<ParticipantRef, BalanceLine> {
    let mut lines: HashMap<ParticipantRef, BalanceLine> = roster
        .iter()
        .map(|participant| (participant.clone(), BalanceLine::default()))
        .collect();

    for expense in expenses {
        if expense.is_deleted() {
            continue;
        }
        for allocation in &expense.payers {
            let line = lines.entry(allocation.participant.clone()).or_default();
            line.paid += allocation.amount;
        }
        for allocation in &expense.splits {
            let line = lines.entry(allocation.participant.clone()).or_default();
            line.owed += allocation.amount;
        }
    }

    for line in lines.values_mut() {
        line.balance = line.paid - line.owed;
    }
    lines
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::{Allocation, Expense};

    fn member(user_id: &str) -> ParticipantRef {
        ParticipantRef::Member {
            user_id: user_id.to_string(),
        }
    }

    fn expense(amount: i64, payers: Vec<(ParticipantRef, i64)>, splits: Vec<(ParticipantRef, i64)>) -> Expense {
        let mut e = Expense::new(
            "trip".to_string(),
            Uuid::new_v4(),
            MoneyCents::new(amount),
            "dinner".to_string(),
            None,
            Utc::now(),
            "alice".to_string(),
        )
        .unwrap();
        e.payers = payers
            .into_iter()
            .map(|(p, cents)| Allocation::new(p, MoneyCents::new(cents)))
            .collect();
        e.splits = splits
            .into_iter()
            .map(|(p, cents)| Allocation::new(p, MoneyCents::new(cents)))
            .collect();
        e
    }

    #[test]
    fn worked_example_sums_to_zero() {
        // A pays 90, split 45/45: A = +45, B = -45.
        let a = member("a");
        let b = member("b");
        let expenses = vec![expense(
            9000,
            vec![(a.clone(), 9000)],
            vec![(a.clone(), 4500), (b.clone(), 4500)],
        )];

        let balances = compute_balances(&expenses, &[a.clone(), b.clone()]);
        assert_eq!(balances[&a].balance, MoneyCents::new(4500));
        assert_eq!(balances[&b].balance, MoneyCents::new(-4500));

        let total: MoneyCents = balances.values().map(|l| l.balance).sum();
        assert!(total.is_zero());
    }

    #[test]
    fn zero_activity_roster_members_get_zero_lines() {
        let a = member("a");
        let idle = member("idle");
        let expenses = vec![expense(100, vec![(a.clone(), 100)], vec![(a.clone(), 100)])];

        let balances = compute_balances(&expenses, &[a, idle.clone()]);
        assert_eq!(balances[&idle], BalanceLine::default());
    }

    #[test]
    fn personal_expense_is_settlement_neutral() {
        // Splits mirror payers: nobody else's balance moves.
        let a = member("a");
        let b = member("b");
        let roster = [a.clone(), b.clone()];

        let shared = expense(
            6000,
            vec![(a.clone(), 6000)],
            vec![(a.clone(), 3000), (b.clone(), 3000)],
        );
        let before = compute_balances(std::slice::from_ref(&shared), &roster);

        let personal = expense(2500, vec![(a.clone(), 2500)], vec![(a.clone(), 2500)]);
        let after = compute_balances(&[shared, personal], &roster);

        assert_eq!(before[&b], after[&b]);
        assert_eq!(
            after[&a].balance - before[&a].balance,
            MoneyCents::ZERO
        );
    }

    #[test]
    fn soft_deleted_expenses_are_ignored() {
        let a = member("a");
        let b = member("b");
        let mut e = expense(
            1000,
            vec![(a.clone(), 1000)],
            vec![(b.clone(), 1000)],
        );
        e.deleted_at = Some(Utc::now());

        let balances = compute_balances(&[e], &[a.clone(), b.clone()]);
        assert_eq!(balances[&a], BalanceLine::default());
        assert_eq!(balances[&b], BalanceLine::default());
    }

    #[test]
    fn multi_payer_multi_split() {
        let a = member("a");
        let b = member("b");
        let c = member("c");
        let expenses = vec![expense(
            9000,
            vec![(a.clone(), 6000), (b.clone(), 3000)],
            vec![(a.clone(), 3000), (b.clone(), 3000), (c.clone(), 3000)],
        )];
        let balances = compute_balances(&expenses, &[a.clone(), b.clone(), c.clone()]);
        assert_eq!(balances[&a].balance, MoneyCents::new(3000));
        assert_eq!(balances[&b].balance, MoneyCents::ZERO);
        assert_eq!(balances[&c].balance, MoneyCents::new(-3000));
        let total: MoneyCents = balances.values().map(|l| l.balance).sum();
        assert!(total.is_zero());
    }
}
