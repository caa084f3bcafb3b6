//! Integration tests for stride-core
//!
//! These tests exercise the full import → store → insights → forecast workflow.

use chrono::{Duration, NaiveDate};
use stride_core::{
    build_dashboard, config::EngineConfig, db::Database, import::parse_csv, Forecaster,
    InsightGenerator, Observation,
};

/// Two weeks starting Monday 2024-01-01, alternating 5000 / 6000 steps
fn fortnight_csv() -> String {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut csv = String::from("date,steps,calories\n");
    for i in 0..14 {
        let steps = if i % 2 == 0 { 5000 } else { 6000 };
        csv.push_str(&format!(
            "{},{},{}\n",
            (start + Duration::days(i)).format("%Y-%m-%d"),
            steps,
            200 + i
        ));
    }
    csv
}

// =============================================================================
// Import Workflow
// =============================================================================

#[test]
fn test_full_import_workflow() {
    let db = Database::in_memory().expect("Failed to create database");

    let observations =
        parse_csv(fortnight_csv().as_bytes(), "walker").expect("Failed to parse CSV");
    assert_eq!(observations.len(), 14);

    let stats = db
        .upsert_observations(&observations)
        .expect("Failed to store observations");
    assert_eq!(stats.inserted, 14);
    assert_eq!(stats.updated, 0);

    let series = db.load_series("walker").unwrap();
    assert_eq!(series.len(), 14);

    let insights = InsightGenerator::default().generate(&series).unwrap();
    assert_eq!(insights.total_days, 14);
    assert_eq!(insights.avg_steps, 5500);
    assert_eq!(insights.max_steps, 6000);
    assert_eq!(insights.min_steps, 5000);
    assert_eq!(insights.day_averages.len(), 7);
    assert!(insights.day_averages.values().all(|&avg| avg == 5500));
    assert_eq!(
        insights.recommendations,
        vec!["Try to increase your daily steps to reach the recommended 10,000 steps."]
    );

    let forecaster = Forecaster::default().train(&series);
    assert!(forecaster.is_trained());

    let points = forecaster.forecast(&series, 7).unwrap();
    assert_eq!(points.len(), 7);
    assert_eq!(
        points[0].date,
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    );
    for pair in points.windows(2) {
        assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
    }
}

#[test]
fn test_reimport_updates_instead_of_duplicating() {
    let db = Database::in_memory().unwrap();
    let observations = parse_csv(fortnight_csv().as_bytes(), "walker").unwrap();

    db.upsert_observations(&observations).unwrap();
    let stats = db.upsert_observations(&observations).unwrap();

    assert_eq!(stats.inserted, 0);
    assert_eq!(stats.updated, 14);
    assert_eq!(db.count_observations("walker").unwrap(), 14);
}

#[test]
fn test_invalid_file_stores_nothing() {
    let db = Database::in_memory().unwrap();
    let csv = "date,steps\n2024-01-01,5000\n2024-01-02,-40\n";

    let err = parse_csv(csv.as_bytes(), "walker").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(db.count_observations("walker").unwrap(), 0);
}

// =============================================================================
// Forecasting Thresholds
// =============================================================================

#[test]
fn test_short_history_falls_back_to_mean() {
    let db = Database::in_memory().unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    for (i, steps) in [4000u32, 5000, 6001].into_iter().enumerate() {
        db.upsert_steps(&Observation::new(
            start + Duration::days(i as i64),
            steps,
            "newcomer",
        ))
        .unwrap();
    }

    let series = db.load_series("newcomer").unwrap();
    let forecaster = Forecaster::default().train(&series);
    assert!(!forecaster.is_trained());

    let points = forecaster.forecast(&series, 3).unwrap();
    assert!(points.iter().all(|p| p.predicted_steps == 5000));
}

#[test]
fn test_dashboard_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[forecast]\nhorizon = 3\n").unwrap();

    let config = EngineConfig::load_from(Some(&path)).unwrap();
    assert_eq!(config.forecast.horizon, 3);

    let db = Database::in_memory().unwrap();
    let observations = parse_csv(fortnight_csv().as_bytes(), "walker").unwrap();
    db.upsert_observations(&observations).unwrap();

    let series = db.load_series("walker").unwrap();
    let forecaster = Forecaster::new(config.forecast.clone()).train(&series);
    let dashboard = build_dashboard(
        &series,
        &InsightGenerator::new(config.insights.clone()),
        &forecaster,
        config.forecast.horizon,
    )
    .unwrap();

    assert!(dashboard.has_data);
    assert_eq!(dashboard.history.len(), 14);
    assert_eq!(dashboard.forecast.len(), 3);

    let json = serde_json::to_value(&dashboard).unwrap();
    assert_eq!(json["insights"]["avg_steps"], 5500);
    assert_eq!(json["forecast"][0]["date"], "2024-01-15");
}
