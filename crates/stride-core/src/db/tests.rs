//! Database tests

use super::*;
use crate::models::*;
use chrono::{Duration, NaiveDate};

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_users().unwrap().is_empty());
    assert_eq!(db.count_observations(DEFAULT_USER_ID).unwrap(), 0);
}

#[test]
fn test_schema_has_unique_date_user() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let columns: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('step_data') WHERE name IN ('id', 'date', 'steps', 'user_id')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(columns, 4);

    conn.execute(
        "INSERT INTO step_data (date, steps, user_id) VALUES ('2024-01-01', 1, 'u')",
        [],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO step_data (date, steps, user_id) VALUES ('2024-01-01', 2, 'u')",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn test_upsert_replaces_same_day() {
    let db = Database::in_memory().unwrap();

    let first = db.upsert_steps(&Observation::new(day(0), 5000, "amy")).unwrap();
    assert_eq!(first, UpsertOutcome::Inserted);

    let second = db.upsert_steps(&Observation::new(day(0), 7500, "amy")).unwrap();
    assert_eq!(second, UpsertOutcome::Updated);

    let points = db.list_steps("amy").unwrap();
    assert_eq!(points, vec![StepPoint { date: day(0), steps: 7500 }]);
}

#[test]
fn test_users_are_isolated() {
    let db = Database::in_memory().unwrap();
    db.upsert_steps(&Observation::new(day(0), 1000, "amy")).unwrap();
    db.upsert_steps(&Observation::new(day(0), 2000, "bob")).unwrap();

    assert_eq!(db.list_users().unwrap(), vec!["amy", "bob"]);
    assert_eq!(db.load_series("amy").unwrap().points()[0].steps, 1000);
    assert_eq!(db.load_series("bob").unwrap().points()[0].steps, 2000);
}

#[test]
fn test_batch_upsert_counts() {
    let db = Database::in_memory().unwrap();
    db.upsert_steps(&Observation::new(day(1), 100, "u")).unwrap();

    let batch: Vec<Observation> = (0..5).map(|i| Observation::new(day(i), 4000, "u")).collect();
    let stats = db.upsert_observations(&batch).unwrap();

    assert_eq!(stats.inserted, 4);
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.total(), 5);
    assert_eq!(db.count_observations("u").unwrap(), 5);
}

#[test]
fn test_series_is_sorted_regardless_of_insert_order() {
    let db = Database::in_memory().unwrap();
    for i in [4, 0, 2, 1, 3] {
        db.upsert_steps(&Observation::new(day(i), 1000 * i as u32, "u"))
            .unwrap();
    }

    let series = db.load_series("u").unwrap();
    let dates: Vec<NaiveDate> = series.points().iter().map(|p| p.date).collect();
    assert_eq!(dates, (0..5).map(day).collect::<Vec<_>>());
    assert_eq!(db.last_observation_date("u").unwrap(), Some(day(4)));
    assert_eq!(db.last_observation_date("nobody").unwrap(), None);
}

#[test]
fn test_raw_rows_carry_integer_steps() {
    let db = Database::in_memory().unwrap();
    db.upsert_steps(&Observation::new(day(0), 6543, "u")).unwrap();

    let rows = db.list_raw_observations("u").unwrap();
    assert_eq!(rows, vec![RawObservation::new("2024-01-01", 6543u32, "u")]);
}

#[test]
fn test_delete_and_clear() {
    let db = Database::in_memory().unwrap();
    for i in 0..3 {
        db.upsert_steps(&Observation::new(day(i), 3000, "u")).unwrap();
    }

    assert!(db.delete_observation("u", day(1)).unwrap());
    assert!(!db.delete_observation("u", day(1)).unwrap());
    assert_eq!(db.count_observations("u").unwrap(), 2);

    assert_eq!(db.clear_user("u").unwrap(), 2);
    assert!(db.load_series("u").unwrap().is_empty());
}

#[test]
fn test_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stride.db");

    {
        let db = Database::new(&path).unwrap();
        db.upsert_steps(&Observation::new(day(0), 8000, "u")).unwrap();
    }

    let db = Database::new(&path).unwrap();
    assert_eq!(db.count_observations("u").unwrap(), 1);
}
