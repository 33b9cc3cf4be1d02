//! Core data types for the runoff response service.
//!
//! This module defines the shared domain model imported by all other modules:
//! the per-event inputs, the immutable result records the pipelines emit, and
//! the error taxonomy. It contains no I/O.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

use crate::series::TimeSeries;

// ---------------------------------------------------------------------------
// Event inputs
// ---------------------------------------------------------------------------

/// One observed flood event, as consumed by the unit hydrograph pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event identifier (the source table's file stem).
    pub id: String,
    /// Watershed drainage area, in square miles (or km² under metric units).
    pub area: f64,
    /// Total discharge, in cfs (or m³/s).
    pub discharge: TimeSeries,
}

impl Event {
    /// Builds an event, rejecting a non-positive or non-finite drainage area.
    pub fn new(id: impl Into<String>, area: f64, discharge: TimeSeries) -> Result<Self, HydroError> {
        validate_area(area)?;
        Ok(Self {
            id: id.into(),
            area,
            discharge,
        })
    }
}

/// One rainfall-runoff event, as consumed by the lag time pipeline.
///
/// The rainfall series may be shorter than the discharge series; missing
/// rainfall entries are dropped at ingest rather than imputed.
#[derive(Debug, Clone, PartialEq)]
pub struct StormEvent {
    pub id: String,
    pub discharge: TimeSeries,
    /// Incremental rainfall depth per sample, in inches.
    pub rainfall: TimeSeries,
    /// SCS curve number, 0 < CN <= 100.
    pub curve_number: f64,
}

impl StormEvent {
    pub fn new(
        id: impl Into<String>,
        discharge: TimeSeries,
        rainfall: TimeSeries,
        curve_number: f64,
    ) -> Result<Self, HydroError> {
        validate_curve_number(curve_number)?;
        Ok(Self {
            id: id.into(),
            discharge,
            rainfall,
            curve_number,
        })
    }
}

pub(crate) fn validate_area(area: f64) -> Result<(), HydroError> {
    if !area.is_finite() || area <= 0.0 {
        return Err(HydroError::InvalidParameter(format!(
            "drainage area must be positive, got {}",
            area
        )));
    }
    Ok(())
}

pub(crate) fn validate_curve_number(cn: f64) -> Result<(), HydroError> {
    if !cn.is_finite() || cn <= 0.0 || cn > 100.0 {
        return Err(HydroError::InvalidParameter(format!(
            "curve number must be in (0, 100], got {}",
            cn
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit hydrograph results
// ---------------------------------------------------------------------------

/// A single unit hydrograph ordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UhPoint {
    /// Time since the first sample, in days.
    pub elapsed_days: f64,
    /// Discharge per unit depth of direct runoff (cfs/in).
    pub ordinate: f64,
}

/// Direct-runoff response to one unit depth of excess rainfall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitHydrograph {
    pub points: Vec<UhPoint>,
}

impl UnitHydrograph {
    pub fn ordinates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.ordinate).collect()
    }

    /// Index, elapsed time and value of the peak ordinate. Ties resolve to
    /// the earliest sample.
    pub fn peak(&self) -> Option<(usize, UhPoint)> {
        let mut best: Option<(usize, UhPoint)> = None;
        for (i, point) in self.points.iter().enumerate() {
            match best {
                Some((_, b)) if point.ordinate <= b.ordinate => {}
                _ => best = Some((i, *point)),
            }
        }
        best
    }
}

/// A point of the dimensionless unit hydrograph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionlessPoint {
    /// t / Tp
    pub time_ratio: f64,
    /// Q / Qp
    pub flow_ratio: f64,
}

/// Unit hydrograph rescaled by its own time-to-peak and peak ordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionlessUh {
    pub points: Vec<DimensionlessPoint>,
}

/// Everything the unit hydrograph pipeline derives for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitHydrographReport {
    pub event_id: String,
    pub baseflow: f64,
    /// Total direct-runoff depth of the observed event, in inches.
    pub runoff_depth: f64,
    pub unit_hydrograph: UnitHydrograph,
    pub dimensionless: DimensionlessUh,
    pub peak_ordinate: f64,
    pub time_to_peak_days: f64,
    /// Peak rate factor, rounded to the nearest integer.
    pub prf: i64,
    /// Depth under the unit hydrograph recomputed by the runoff integrator.
    pub uh_depth: f64,
    /// Set when `uh_depth` does not round to 1.0 at one decimal place. The
    /// ordinates are left as derived; see `UnitHydrograph::rescaled_to_unit_depth`.
    pub depth_advisory: bool,
}

// ---------------------------------------------------------------------------
// Lag time results
// ---------------------------------------------------------------------------

/// Rainfall-to-peak lag time for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagTimeResult {
    pub event_id: String,
    pub peak_time: NaiveDateTime,
    pub peak_discharge: f64,
    /// Duration of the effective (excess) rainfall window.
    #[serde(serialize_with = "serialize_duration_hours")]
    pub excess_duration: Duration,
    /// Lag time in hours. Not clamped; may be negative.
    pub lag_hours: f64,
}

impl LagTimeResult {
    /// A negative lag means the discharge peak precedes the midpoint of the
    /// effective rainfall window.
    pub fn is_plausible(&self) -> bool {
        self.lag_hours >= 0.0
    }
}

fn serialize_duration_hours<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(duration_hours(*d))
}

/// Converts a signed duration to fractional hours.
pub fn duration_hours(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 3_600_000.0
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Per-event computation failures. Outputs are all-or-nothing: an event that
/// fails produces none of its results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HydroError {
    /// A sampling interval differs from the first one.
    #[error(
        "non-uniform sampling at sample {index}: expected {expected_secs}s interval, found {found_secs}s"
    )]
    NonUniformSampling {
        index: usize,
        expected_secs: i64,
        found_secs: i64,
    },

    /// Zero time-to-peak or no direct runoff; dimensionless results undefined.
    #[error("degenerate event: {0}")]
    DegenerateEvent(String),

    /// Total rainfall never exhausts the initial abstraction.
    #[error(
        "insufficient rainfall: total {total_rainfall_in:.3} in does not exceed initial abstraction {initial_abstraction_in:.3} in"
    )]
    InsufficientRainfall {
        initial_abstraction_in: f64,
        total_rainfall_in: f64,
    },

    /// Non-positive area, curve number out of range, empty or malformed series.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The batch worker running the event panicked.
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
}

impl HydroError {
    /// Stable tag used in failure summary tables.
    pub fn kind(&self) -> &'static str {
        match self {
            HydroError::NonUniformSampling { .. } => "non_uniform_sampling",
            HydroError::DegenerateEvent(_) => "degenerate_event",
            HydroError::InsufficientRainfall { .. } => "insufficient_rainfall",
            HydroError::InvalidParameter(_) => "invalid_parameter",
            HydroError::WorkerPanicked(_) => "worker_panicked",
        }
    }
}
