//! Itinerary reconciliation planner.
//!
//! Pure classification of one trip's day set against a new date range:
//! every calendar date in the new inclusive range gets a 1-based
//! `day_number` in date order; an existing day whose date survives is
//! **kept** under its new number, everything else (including dateless days)
//! is **deleted**, and dates with no existing day are **created**.
//!
//! The planner never touches the database; callers apply the plan inside a
//! transaction and must re-derive it at apply time rather than trusting an
//! earlier advisory run.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Hard cap on itinerary length, to reject accidental year-spanning ranges.
pub const MAX_TRIP_DAYS: usize = 366;

/// Minimal view of an existing day, as the planner needs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaySnapshot {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeptDay {
    pub day_id: Uuid,
    pub new_day_number: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDay {
    pub date: NaiveDate,
    pub day_number: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    pub kept: Vec<KeptDay>,
    pub deleted: Vec<Uuid>,
    pub created: Vec<CreatedDay>,
}

impl ReconcilePlan {
    /// True when applying the plan would not delete any existing day.
    #[must_use]
    pub fn is_pure_extension(&self) -> bool {
        self.deleted.is_empty()
    }
}

/// Every calendar date in `[start, end]` inclusive, in order.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> ResultEngine<Vec<NaiveDate>> {
    if end < start {
        return Err(EngineError::InvalidDateRange(format!(
            "end date {end} is before start date {start}"
        )));
    }
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        if dates.len() >= MAX_TRIP_DAYS {
            return Err(EngineError::InvalidDateRange(format!(
                "trip longer than {MAX_TRIP_DAYS} days"
            )));
        }
        dates.push(current);
        current = current
            .checked_add_days(Days::new(1))
            .ok_or_else(|| EngineError::InvalidDateRange("date overflow".to_string()))?;
    }
    Ok(dates)
}

/// Classifies `days` against the new `[new_start, new_end]` range.
///
/// `kept` and `created` come out ordered by `day_number`; together they cover
/// every date of the new range exactly once. Should the input carry two days
/// with the same date (an invariant violation upstream), the first one wins
/// and the duplicate is scheduled for deletion.
pub fn plan(
    days: &[DaySnapshot],
    new_start: NaiveDate,
    new_end: NaiveDate,
) -> ResultEngine<ReconcilePlan> {
    let new_dates = date_range(new_start, new_end)?;

    let mut by_date: HashMap<NaiveDate, Uuid> = HashMap::with_capacity(days.len());
    let mut deleted = Vec::new();
    for day in days {
        match day.date {
            None => deleted.push(day.id),
            Some(date) => {
                if by_date.contains_key(&date) {
                    deleted.push(day.id);
                } else {
                    by_date.insert(date, day.id);
                }
            }
        }
    }

    let mut kept = Vec::new();
    let mut created = Vec::new();
    for (index, date) in new_dates.iter().enumerate() {
        let day_number = i32::try_from(index + 1)
            .map_err(|_| EngineError::InvalidDateRange("trip too long".to_string()))?;
        match by_date.remove(date) {
            Some(day_id) => kept.push(KeptDay {
                day_id,
                new_day_number: day_number,
            }),
            None => created.push(CreatedDay {
                date: *date,
                day_number,
            }),
        }
    }

    // Whatever did not match a new date gets dropped.
    deleted.extend(by_date.into_values());

    Ok(ReconcilePlan {
        kept,
        deleted,
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(dates: &[Option<NaiveDate>]) -> Vec<DaySnapshot> {
        dates
            .iter()
            .map(|d| DaySnapshot {
                id: Uuid::new_v4(),
                date: *d,
            })
            .collect()
    }

    #[test]
    fn covers_every_date_of_the_new_range() {
        let days = snapshot(&[Some(date(2026, 1, 1)), Some(date(2026, 1, 2))]);
        let plan = plan(&days, date(2026, 1, 1), date(2026, 1, 4)).unwrap();

        assert_eq!(plan.kept.len(), 2);
        assert_eq!(plan.deleted.len(), 0);
        assert_eq!(
            plan.created,
            vec![
                CreatedDay {
                    date: date(2026, 1, 3),
                    day_number: 3
                },
                CreatedDay {
                    date: date(2026, 1, 4),
                    day_number: 4
                },
            ]
        );
        let numbers: Vec<i32> = plan.kept.iter().map(|k| k.new_day_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn pure_extension_never_deletes() {
        let days = snapshot(&[
            Some(date(2026, 3, 10)),
            Some(date(2026, 3, 11)),
            Some(date(2026, 3, 12)),
        ]);
        let plan = plan(&days, date(2026, 3, 10), date(2026, 3, 14)).unwrap();
        assert!(plan.is_pure_extension());
        assert_eq!(plan.kept.len(), 3);
        assert_eq!(plan.created.len(), 2);
    }

    #[test]
    fn shrink_drops_days_outside_the_range() {
        let days = snapshot(&[
            Some(date(2026, 1, 1)),
            Some(date(2026, 1, 2)),
            Some(date(2026, 1, 3)),
        ]);
        let plan = plan(&days, date(2026, 1, 1), date(2026, 1, 2)).unwrap();
        assert_eq!(plan.kept.len(), 2);
        assert_eq!(plan.deleted, vec![days[2].id]);
        assert!(plan.created.is_empty());
    }

    #[test]
    fn shift_renumbers_kept_days() {
        let days = snapshot(&[Some(date(2026, 1, 1)), Some(date(2026, 1, 2))]);
        let plan = plan(&days, date(2026, 1, 2), date(2026, 1, 3)).unwrap();

        assert_eq!(plan.deleted, vec![days[0].id]);
        assert_eq!(
            plan.kept,
            vec![KeptDay {
                day_id: days[1].id,
                new_day_number: 1
            }]
        );
        assert_eq!(plan.created.len(), 1);
        assert_eq!(plan.created[0].day_number, 2);
    }

    #[test]
    fn dateless_days_are_always_dropped() {
        let days = snapshot(&[None, Some(date(2026, 5, 1))]);
        let plan = plan(&days, date(2026, 5, 1), date(2026, 5, 1)).unwrap();
        assert_eq!(plan.deleted, vec![days[0].id]);
        assert_eq!(plan.kept.len(), 1);
    }

    #[test]
    fn duplicate_dates_keep_the_first_row() {
        let shared = date(2026, 7, 7);
        let days = snapshot(&[Some(shared), Some(shared)]);
        let plan = plan(&days, shared, shared).unwrap();
        assert_eq!(plan.kept.len(), 1);
        assert_eq!(plan.kept[0].day_id, days[0].id);
        assert_eq!(plan.deleted, vec![days[1].id]);
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(
            date_range(date(2026, 2, 2), date(2026, 2, 1)),
            Err(EngineError::InvalidDateRange(_))
        ));
    }

    #[test]
    fn single_day_range_is_one_date() {
        let dates = date_range(date(2026, 2, 2), date(2026, 2, 2)).unwrap();
        assert_eq!(dates, vec![date(2026, 2, 2)]);
    }
}
