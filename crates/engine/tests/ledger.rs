use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Allocation, Engine, EngineError, MoneyCents, NewExpense, NewTrip, ParticipantRef,
    UpdateExpense,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    add_user(&db, "alice", "alice@example.com").await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn add_user(db: &DatabaseConnection, username: &str, email: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, email) VALUES (?, ?, ?)",
        vec![username.into(), "password".into(), email.into()],
    ))
    .await
    .unwrap();
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

async fn trip_with_days(engine: &Engine) -> (String, Vec<uuid::Uuid>) {
    let trip = engine
        .create_trip(
            NewTrip {
                name: "Nepal".to_string(),
                destination: Some("Kathmandu".to_string()),
                start_date: Some(date(2026, 10, 1)),
                end_date: Some(date(2026, 10, 4)),
                currency: None,
            },
            "alice",
        )
        .await
        .unwrap();

    let itinerary = engine.trip_itinerary(&trip.id, "alice").await.unwrap();
    let day_ids = itinerary.days.iter().map(|d| d.id).collect();
    (trip.id, day_ids)
}

fn member(user_id: &str) -> ParticipantRef {
    ParticipantRef::Member {
        user_id: user_id.to_string(),
    }
}

#[tokio::test]
async fn create_trip_seeds_one_day_per_date() {
    let (engine, _db) = engine_with_db().await;
    let (trip_id, day_ids) = trip_with_days(&engine).await;

    let itinerary = engine.trip_itinerary(&trip_id, "alice").await.unwrap();
    assert_eq!(day_ids.len(), 4);
    let numbers: Vec<i32> = itinerary.days.iter().map(|d| d.day_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert_eq!(itinerary.days[0].date, Some(date(2026, 10, 1)));
    assert_eq!(itinerary.days[3].date, Some(date(2026, 10, 4)));
}

#[tokio::test]
async fn participant_resolution_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let (trip_id, _) = trip_with_days(&engine).await;

    let first = engine
        .resolve_or_create_participant(&trip_id, "Bob@Example.com", Some("Bob"), None, "alice")
        .await
        .unwrap();
    let second = engine
        .resolve_or_create_participant(&trip_id, " bob@example.com ", None, None, "alice")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert!(matches!(first, ParticipantRef::Guest { .. }));

    let roster = engine.trip_roster(&trip_id, "alice").await.unwrap();
    assert_eq!(roster.len(), 2);
    assert_eq!(roster.iter().filter(|p| p.is_guest).count(), 1);
}

#[tokio::test]
async fn registered_email_resolves_to_member() {
    let (engine, db) = engine_with_db().await;
    add_user(&db, "bob", "bob@example.com").await;
    let (trip_id, _) = trip_with_days(&engine).await;

    let participant = engine
        .resolve_or_create_participant(&trip_id, "bob@example.com", None, None, "alice")
        .await
        .unwrap();
    assert_eq!(participant, member("bob"));

    // The owner's own email never creates an invite.
    let owner = engine
        .resolve_or_create_participant(&trip_id, "alice@example.com", None, None, "alice")
        .await
        .unwrap();
    assert_eq!(owner, member("alice"));
    let roster = engine.trip_roster(&trip_id, "alice").await.unwrap();
    assert_eq!(roster.len(), 2);
}

#[tokio::test]
async fn expense_defaults_to_actor_payer_and_equal_split() {
    let (engine, _db) = engine_with_db().await;
    let (trip_id, day_ids) = trip_with_days(&engine).await;
    engine
        .resolve_or_create_participant(&trip_id, "bob@example.com", None, None, "alice")
        .await
        .unwrap();

    let expense = engine
        .create_expense(
            &trip_id,
            day_ids[0],
            NewExpense {
                amount: MoneyCents::new(9000),
                description: "guide".to_string(),
                category: None,
                occurred_at: None,
                payers: Vec::new(),
                splits: Vec::new(),
                dont_split: false,
            },
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(expense.payers, vec![Allocation::new(member("alice"), MoneyCents::new(9000))]);
    assert_eq!(expense.splits.len(), 2);
    let split_sum: MoneyCents = expense.splits.iter().map(|a| a.amount).sum();
    assert_eq!(split_sum, MoneyCents::new(9000));

    let balances = engine.trip_balances(&trip_id, "alice").await.unwrap();
    assert_eq!(balances.len(), 2);
    let total: i64 = balances.iter().map(|b| b.line.balance.cents()).sum();
    assert_eq!(total, 0);
    let alice = balances
        .iter()
        .find(|b| b.participant == member("alice"))
        .unwrap();
    assert_eq!(alice.line.paid, MoneyCents::new(9000));
    assert_eq!(alice.line.owed, MoneyCents::new(4500));
    assert_eq!(alice.line.balance, MoneyCents::new(4500));
}

#[tokio::test]
async fn dont_split_expense_is_settlement_neutral() {
    let (engine, _db) = engine_with_db().await;
    let (trip_id, day_ids) = trip_with_days(&engine).await;
    engine
        .resolve_or_create_participant(&trip_id, "bob@example.com", None, None, "alice")
        .await
        .unwrap();

    engine
        .create_expense(
            &trip_id,
            day_ids[0],
            NewExpense {
                amount: MoneyCents::new(1200),
                description: "souvenir".to_string(),
                category: None,
                occurred_at: None,
                payers: Vec::new(),
                splits: Vec::new(),
                dont_split: true,
            },
            "alice",
        )
        .await
        .unwrap();

    let balances = engine.trip_balances(&trip_id, "alice").await.unwrap();
    assert!(balances.iter().all(|b| b.line.balance == MoneyCents::ZERO));
}

#[tokio::test]
async fn mismatched_allocations_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let (trip_id, day_ids) = trip_with_days(&engine).await;

    let err = engine
        .create_expense(
            &trip_id,
            day_ids[0],
            NewExpense {
                amount: MoneyCents::new(1000),
                description: "taxi".to_string(),
                category: None,
                occurred_at: None,
                payers: vec![Allocation::new(member("alice"), MoneyCents::new(900))],
                splits: Vec::new(),
                dont_split: false,
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAllocation(_)));
}

#[tokio::test]
async fn update_replaces_allocations_wholesale() {
    let (engine, db) = engine_with_db().await;
    add_user(&db, "bob", "bob@example.com").await;
    let (trip_id, day_ids) = trip_with_days(&engine).await;
    engine
        .resolve_or_create_participant(&trip_id, "bob@example.com", None, None, "alice")
        .await
        .unwrap();

    let expense = engine
        .create_expense(
            &trip_id,
            day_ids[0],
            NewExpense {
                amount: MoneyCents::new(5000),
                description: "hotel".to_string(),
                category: Some("lodging".to_string()),
                occurred_at: None,
                payers: Vec::new(),
                splits: Vec::new(),
                dont_split: false,
            },
            "alice",
        )
        .await
        .unwrap();

    let updated = engine
        .update_expense(
            expense.id,
            UpdateExpense {
                amount: Some(MoneyCents::new(6000)),
                payers: Some(vec![
                    Allocation::new(member("alice"), MoneyCents::new(4000)),
                    Allocation::new(member("bob"), MoneyCents::new(2000)),
                ]),
                splits: Some(vec![
                    Allocation::new(member("alice"), MoneyCents::new(3000)),
                    Allocation::new(member("bob"), MoneyCents::new(3000)),
                ]),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(updated.amount, MoneyCents::new(6000));
    assert_eq!(updated.payers.len(), 2);

    let listed = engine
        .list_trip_expenses(&trip_id, false, "alice")
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].payers.len(), 2);
    assert_eq!(listed[0].splits.len(), 2);

    // Changing the amount without re-supplying allocations cannot validate.
    let err = engine
        .update_expense(
            expense.id,
            UpdateExpense {
                amount: Some(MoneyCents::new(9999)),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAllocation(_)));
}

#[tokio::test]
async fn soft_deleted_expense_is_hidden_but_retained() {
    let (engine, _db) = engine_with_db().await;
    let (trip_id, day_ids) = trip_with_days(&engine).await;

    let expense = engine
        .create_expense(
            &trip_id,
            day_ids[0],
            NewExpense {
                amount: MoneyCents::new(700),
                description: "snacks".to_string(),
                category: None,
                occurred_at: None,
                payers: Vec::new(),
                splits: Vec::new(),
                dont_split: false,
            },
            "alice",
        )
        .await
        .unwrap();

    engine.soft_delete_expense(expense.id, "alice").await.unwrap();
    // Deleting twice is a no-op.
    engine.soft_delete_expense(expense.id, "alice").await.unwrap();

    let live = engine
        .list_trip_expenses(&trip_id, false, "alice")
        .await
        .unwrap();
    assert!(live.is_empty());

    let all = engine
        .list_trip_expenses(&trip_id, true, "alice")
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].is_deleted());

    let balances = engine.trip_balances(&trip_id, "alice").await.unwrap();
    assert!(balances.iter().all(|b| b.line.paid == MoneyCents::ZERO));
}

#[tokio::test]
async fn reorder_must_cover_the_day_exactly() {
    let (engine, _db) = engine_with_db().await;
    let (trip_id, day_ids) = trip_with_days(&engine).await;

    let mut ids = Vec::new();
    for description in ["bus", "lunch", "museum"] {
        let expense = engine
            .create_expense(
                &trip_id,
                day_ids[1],
                NewExpense {
                    amount: MoneyCents::new(500),
                    description: description.to_string(),
                    category: None,
                    occurred_at: None,
                    payers: Vec::new(),
                    splits: Vec::new(),
                    dont_split: false,
                },
                "alice",
            )
            .await
            .unwrap();
        ids.push(expense.id);
    }

    let err = engine
        .reorder_day_expenses(day_ids[1], &ids[..2], "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidId(_)));

    let reversed: Vec<_> = ids.iter().rev().copied().collect();
    engine
        .reorder_day_expenses(day_ids[1], &reversed, "alice")
        .await
        .unwrap();

    let listed = engine.list_day_expenses(day_ids[1], "alice").await.unwrap();
    let descriptions: Vec<&str> = listed.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descriptions, vec!["museum", "lunch", "bus"]);
}

#[tokio::test]
async fn non_member_cannot_touch_the_trip() {
    let (engine, db) = engine_with_db().await;
    add_user(&db, "mallory", "mallory@example.com").await;
    let (trip_id, day_ids) = trip_with_days(&engine).await;

    let err = engine
        .list_trip_expenses(&trip_id, false, "mallory")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .create_expense(
            &trip_id,
            day_ids[0],
            NewExpense {
                amount: MoneyCents::new(100),
                description: "nope".to_string(),
                category: None,
                occurred_at: None,
                payers: Vec::new(),
                splits: Vec::new(),
                dont_split: false,
            },
            "mallory",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // Only the owner can delete the trip, even for invitees.
    add_user(&db, "bob", "bob@example.com").await;
    engine
        .resolve_or_create_participant(&trip_id, "bob@example.com", None, None, "alice")
        .await
        .unwrap();
    let err = engine.delete_trip(&trip_id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn invite_lifecycle_controls_trip_visibility() {
    let (engine, db) = engine_with_db().await;
    add_user(&db, "bob", "bob@example.com").await;
    let (trip_id, _) = trip_with_days(&engine).await;

    engine
        .resolve_or_create_participant(&trip_id, "bob@example.com", None, None, "alice")
        .await
        .unwrap();

    let trips = engine.list_trips("bob").await.unwrap();
    assert_eq!(trips.len(), 1);

    engine.accept_invite(&trip_id, "bob").await.unwrap();
    let roster = engine.trip_roster(&trip_id, "bob").await.unwrap();
    assert_eq!(roster.len(), 2);

    engine.reject_invite(&trip_id, "bob").await.unwrap();
    let trips = engine.list_trips("bob").await.unwrap();
    assert!(trips.is_empty());
    let roster = engine.trip_roster(&trip_id, "alice").await.unwrap();
    assert_eq!(roster.len(), 1);
}
