use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{ContentKind, Engine, EngineError, MoneyCents, NewExpense, NewTrip};
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

async fn four_day_trip(engine: &Engine) -> String {
    engine
        .create_trip(
            NewTrip {
                name: "Dolomites".to_string(),
                destination: None,
                start_date: Some(date(2026, 7, 1)),
                end_date: Some(date(2026, 7, 4)),
                currency: None,
            },
            "alice",
        )
        .await
        .unwrap()
        .id
}

async fn expense_on(engine: &Engine, trip_id: &str, day_id: uuid::Uuid, description: &str) {
    engine
        .create_expense(
            trip_id,
            day_id,
            NewExpense {
                amount: MoneyCents::new(2500),
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
}

#[tokio::test]
async fn advisory_reports_content_on_doomed_days_only() {
    let (engine, _db) = engine_with_db().await;
    let trip_id = four_day_trip(&engine).await;
    let days = engine.trip_itinerary(&trip_id, "alice").await.unwrap().days;

    engine
        .add_note(days[2].id, "refuge booking", "alice")
        .await
        .unwrap();
    expense_on(&engine, &trip_id, days[3].id, "cable car").await;

    // Shrinking to the first two days dooms day 3 (note) and day 4 (expense).
    let report = engine
        .check_date_conflicts(&trip_id, date(2026, 7, 1), Some(date(2026, 7, 2)), "alice")
        .await
        .unwrap();
    assert!(report.has_conflicts);
    assert_eq!(report.affected_days.len(), 2);
    assert_eq!(report.affected_days[0].content, vec![ContentKind::Notes]);
    assert_eq!(report.affected_days[1].content, vec![ContentKind::Expenses]);

    // Shrinking by one day dooms only day 4, which still carries the expense.
    let report = engine
        .check_date_conflicts(&trip_id, date(2026, 7, 1), Some(date(2026, 7, 3)), "alice")
        .await
        .unwrap();
    assert!(report.has_conflicts);
    assert_eq!(report.affected_days.len(), 1);

    // Advisory never mutates.
    let days_after = engine.trip_itinerary(&trip_id, "alice").await.unwrap().days;
    assert_eq!(days_after.len(), 4);
}

#[tokio::test]
async fn shrinking_dates_cascades_and_renumbers() {
    let (engine, _db) = engine_with_db().await;
    let trip_id = four_day_trip(&engine).await;
    let days = engine.trip_itinerary(&trip_id, "alice").await.unwrap().days;

    engine
        .add_note(days[3].id, "doomed note", "alice")
        .await
        .unwrap();
    expense_on(&engine, &trip_id, days[3].id, "doomed expense").await;

    let plan = engine
        .set_trip_dates(&trip_id, date(2026, 7, 2), Some(date(2026, 7, 3)), "alice")
        .await
        .unwrap();
    assert_eq!(plan.kept.len(), 2);
    assert_eq!(plan.deleted.len(), 2);
    assert!(plan.created.is_empty());

    let itinerary = engine.trip_itinerary(&trip_id, "alice").await.unwrap();
    assert_eq!(itinerary.trip.start_date, Some(date(2026, 7, 2)));
    assert_eq!(itinerary.trip.end_date, Some(date(2026, 7, 3)));
    assert_eq!(itinerary.days.len(), 2);
    assert_eq!(itinerary.days[0].day_number, 1);
    assert_eq!(itinerary.days[0].date, Some(date(2026, 7, 2)));
    // The kept day keeps its identity under its new number.
    assert_eq!(itinerary.days[0].id, days[1].id);

    // The doomed day's ledger went with it.
    let expenses = engine
        .list_trip_expenses(&trip_id, true, "alice")
        .await
        .unwrap();
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn extending_dates_keeps_existing_days_untouched() {
    let (engine, _db) = engine_with_db().await;
    let trip_id = four_day_trip(&engine).await;
    let days = engine.trip_itinerary(&trip_id, "alice").await.unwrap().days;
    engine
        .set_day_details(days[0].id, Some("Arrival"), Some("Bolzano"), "alice")
        .await
        .unwrap();

    let plan = engine
        .set_trip_dates(&trip_id, date(2026, 6, 30), Some(date(2026, 7, 5)), "alice")
        .await
        .unwrap();
    assert!(plan.is_pure_extension());
    assert_eq!(plan.created.len(), 2);

    let itinerary = engine.trip_itinerary(&trip_id, "alice").await.unwrap();
    assert_eq!(itinerary.days.len(), 6);
    let first = &itinerary.days[1];
    assert_eq!(first.id, days[0].id);
    assert_eq!(first.day_number, 2);
    assert_eq!(first.title.as_deref(), Some("Arrival"));
}

#[tokio::test]
async fn add_day_extends_the_range_by_one() {
    let (engine, _db) = engine_with_db().await;
    let trip_id = four_day_trip(&engine).await;

    let day = engine.add_day(&trip_id, "alice").await.unwrap();
    assert_eq!(day.day_number, 5);
    assert_eq!(day.date, Some(date(2026, 7, 5)));

    let itinerary = engine.trip_itinerary(&trip_id, "alice").await.unwrap();
    assert_eq!(itinerary.trip.end_date, Some(date(2026, 7, 5)));
    assert_eq!(itinerary.days.len(), 5);
}

#[tokio::test]
async fn deleting_a_day_closes_the_gap() {
    let (engine, _db) = engine_with_db().await;
    let trip_id = four_day_trip(&engine).await;
    let days = engine.trip_itinerary(&trip_id, "alice").await.unwrap().days;
    engine
        .set_day_details(days[2].id, Some("Via ferrata"), None, "alice")
        .await
        .unwrap();
    expense_on(&engine, &trip_id, days[1].id, "doomed").await;

    engine.delete_itinerary_day(days[1].id, "alice").await.unwrap();

    let itinerary = engine.trip_itinerary(&trip_id, "alice").await.unwrap();
    assert_eq!(itinerary.days.len(), 3);
    assert_eq!(itinerary.trip.end_date, Some(date(2026, 7, 3)));

    let numbers: Vec<i32> = itinerary.days.iter().map(|d| d.day_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    // Former day 3 moved up one slot and one calendar day, keeping content.
    assert_eq!(itinerary.days[1].id, days[2].id);
    assert_eq!(itinerary.days[1].date, Some(date(2026, 7, 2)));
    assert_eq!(itinerary.days[1].title.as_deref(), Some("Via ferrata"));

    let expenses = engine
        .list_trip_expenses(&trip_id, true, "alice")
        .await
        .unwrap();
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn only_the_owner_changes_dates() {
    let (engine, db) = engine_with_db().await;
    add_user(&db, "bob", "bob@example.com").await;
    let trip_id = four_day_trip(&engine).await;
    engine
        .resolve_or_create_participant(&trip_id, "bob@example.com", None, None, "alice")
        .await
        .unwrap();

    let err = engine
        .set_trip_dates(&trip_id, date(2026, 7, 1), Some(date(2026, 7, 2)), "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine.add_day(&trip_id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn invalid_ranges_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let trip_id = four_day_trip(&engine).await;

    let err = engine
        .set_trip_dates(&trip_id, date(2026, 7, 4), Some(date(2026, 7, 1)), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidDateRange(_)));

    let err = engine
        .create_trip(
            NewTrip {
                name: "Backwards".to_string(),
                destination: None,
                start_date: Some(date(2026, 8, 2)),
                end_date: Some(date(2026, 8, 1)),
                currency: None,
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidDateRange(_)));
}

#[tokio::test]
async fn day_content_round_trip() {
    let (engine, _db) = engine_with_db().await;
    let trip_id = four_day_trip(&engine).await;
    let days = engine.trip_itinerary(&trip_id, "alice").await.unwrap().days;
    let day_id = days[0].id;

    engine.add_note(day_id, "pack crampons", "alice").await.unwrap();
    let item = engine
        .add_checklist_item(day_id, "book refuge", "alice")
        .await
        .unwrap();
    engine
        .set_checklist_item_done(item.id, true, "alice")
        .await
        .unwrap();

    let notes = engine.list_day_notes(day_id, "alice").await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].body, "pack crampons");

    let checklist = engine.list_day_checklist(day_id, "alice").await.unwrap();
    assert_eq!(checklist.len(), 1);
    assert!(checklist[0].done);
}

#[tokio::test]
async fn single_day_trip_from_start_only() {
    let (engine, _db) = engine_with_db().await;
    let trip = engine
        .create_trip(
            NewTrip {
                name: "Day trip".to_string(),
                destination: None,
                start_date: Some(date(2026, 9, 12)),
                end_date: None,
                currency: None,
            },
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(trip.end_date, Some(date(2026, 9, 12)));
    let itinerary = engine.trip_itinerary(&trip.id, "alice").await.unwrap();
    assert_eq!(itinerary.days.len(), 1);
}
