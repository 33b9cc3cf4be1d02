//! Integration tests for the lag time pipeline
//!
//! These tests verify:
//! 1. Rainfall-runoff table → excess rainfall → lag time, checked by hand
//! 2. Lag is unchanged when the whole event is shifted in time
//! 3. Storms that never exhaust the initial abstraction fail cleanly
//! 4. The shipped runoff.toml loads
//!
//! Run with: cargo test --test lag_time_pipeline

use std::path::Path;

use chrono::Duration;

use runoff_response::analysis::abstraction::compute_excess_rainfall;
use runoff_response::analysis::estimate_event_lag;
use runoff_response::batch::estimate_all;
use runoff_response::config::{DEFAULT_CONFIG_PATH, UnitSystem, load_config};
use runoff_response::ingest::event_csv::read_storm_event;
use runoff_response::model::{HydroError, StormEvent};
use runoff_response::report;

// Hourly discharge with half-hourly rainfall totalling 3.1 in, CN 78.
const STORM_CSV: &str = "Date1,Discharge_cfs,Date2,Rainfall_in,CN
2020-08-10 12:00,35,2020-08-10 11:00,0.2,78
2020-08-10 13:00,38,2020-08-10 11:30,0.4,
2020-08-10 14:00,95,2020-08-10 12:00,1.1,
2020-08-10 15:00,240,2020-08-10 12:30,0.9,
2020-08-10 16:00,410,2020-08-10 13:00,0.3,
2020-08-10 17:00,520,2020-08-10 13:30,0.2,
2020-08-10 18:00,430,,,
2020-08-10 19:00,260,,,
2020-08-10 20:00,140,,,
";

// Light drizzle on a poorly draining watershed: Ia = 2 in is never reached.
const DRIZZLE_CSV: &str = "Date1,Discharge_cfs,Date2,Rainfall_in,CN
2021-03-02 00:00,12,2021-03-02 00:00,0.1,50
2021-03-02 01:00,14,2021-03-02 01:00,0.2,
2021-03-02 02:00,13,2021-03-02 02:00,0.1,
";

fn storm(id: &str) -> StormEvent {
    read_storm_event(id, STORM_CSV.as_bytes()).expect("storm table should parse")
}

#[test]
fn test_storm_table_to_lag_time() {
    let event = storm("salt_creek_2020");
    assert_eq!(event.curve_number, 78.0);
    assert_eq!(event.rainfall.len(), 6);
    assert_eq!(event.discharge.len(), 9);

    // S = 1000/78 − 10 ≈ 2.821, Ia ≈ 0.564: exhausted by the 11:30 sample.
    let excess = compute_excess_rainfall(&event.rainfall, event.curve_number).unwrap();
    assert_eq!(excess.initial_abstraction_index, 1);
    assert!((excess.total_rainfall - 3.1).abs() < 1e-9);

    // Peak 520 cfs at 17:00, 5 h after 12:00; rain 11:30 → 13:30 spans 2 h.
    let result = estimate_event_lag(&event).expect("lag should be computed");
    assert_eq!(result.event_id, "salt_creek_2020");
    assert_eq!(result.peak_discharge, 520.0);
    assert_eq!(result.excess_duration, Duration::hours(2));
    assert!((result.lag_hours - 4.0).abs() < 1e-9, "lag = {}", result.lag_hours);
    assert!(result.is_plausible());
}

#[test]
fn test_lag_invariant_under_time_shift() {
    let event = storm("base");
    let offset = Duration::days(400) + Duration::minutes(7);
    let shifted = StormEvent::new(
        "shifted",
        event.discharge.shifted(offset),
        event.rainfall.shifted(offset),
        event.curve_number,
    )
    .unwrap();

    let a = estimate_event_lag(&event).unwrap();
    let b = estimate_event_lag(&shifted).unwrap();
    assert_eq!(a.lag_hours, b.lag_hours);
    assert_eq!(b.peak_time, a.peak_time + offset);
}

#[test]
fn test_insufficient_rainfall_is_reported() {
    let event = read_storm_event("drizzle", DRIZZLE_CSV.as_bytes()).unwrap();
    let err = estimate_event_lag(&event).unwrap_err();
    match err {
        HydroError::InsufficientRainfall {
            initial_abstraction_in,
            total_rainfall_in,
        } => {
            assert!((initial_abstraction_in - 2.0).abs() < 1e-9);
            assert!((total_rainfall_in - 0.4).abs() < 1e-9);
        }
        other => panic!("expected InsufficientRainfall, got {:?}", other),
    }
}

#[test]
fn test_lag_batch_keeps_going_past_failures() {
    let events = vec![
        storm("a"),
        read_storm_event("drizzle", DRIZZLE_CSV.as_bytes()).unwrap(),
        storm("c"),
    ];
    let reports = estimate_all(events, 2);

    let rows = report::lag_rows(&reports);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].event_id, "a");
    assert_eq!(rows[1].event_id, "c");

    let failures = report::failure_rows(&reports);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].event_id, "drizzle");
    assert_eq!(failures[0].kind, "insufficient_rainfall");
}

#[test]
fn test_shipped_config_loads() {
    let config = load_config(Path::new(DEFAULT_CONFIG_PATH)).expect("runoff.toml should load");
    assert_eq!(config.units.system, UnitSystem::UsCustomary);
    assert!(config.batch.workers >= 1);
    assert_eq!(config.lag_time.input_dir, Path::new("raw_data_lag"));
}
