//! Per-event hydrologic analysis.
//!
//! Submodules, leaf-first:
//! - `baseflow`        — straight-line baseflow separation
//! - `runoff`          — trapezoidal integration to runoff depth
//! - `unit_hydrograph` — UH, dimensionless UH, peak rate factor
//! - `abstraction`     — SCS curve-number excess rainfall
//! - `lag_time`        — rainfall-to-peak lag
//!
//! The two pipelines below are pure functions of a single event. They hold
//! no state between calls, so any number of events can run concurrently.

pub mod abstraction;
pub mod baseflow;
pub mod lag_time;
pub mod runoff;
pub mod unit_hydrograph;

use crate::model::{Event, HydroError, LagTimeResult, StormEvent, UnitHydrographReport};
use runoff::{DepthUnits, RunoffIntegrator};

/// Knobs shared by the pipelines, normally taken from `RunoffConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub units: DepthUnits,
    /// Reject discharge series whose intervals are not all equal to the
    /// first one. When false, the first interval is trusted.
    pub validate_sampling: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            units: DepthUnits::US_CUSTOMARY,
            validate_sampling: true,
        }
    }
}

/// Baseflow separation → depth integration → unit hydrograph, dimensionless
/// UH and PRF for one event.
pub fn derive_unit_hydrograph(
    event: &Event,
    options: &PipelineOptions,
) -> Result<UnitHydrographReport, HydroError> {
    let interval = if options.validate_sampling {
        event.discharge.validate_uniform()?
    } else {
        event.discharge.interval()?
    };
    let integrator = RunoffIntegrator::new(event.area, interval, options.units)?;

    let separation = baseflow::separate(&event.discharge);
    let depth = integrator.integrate_to_depth(&separation.direct_runoff.values());
    let set = unit_hydrograph::build(&separation, &depth, &integrator)?;

    Ok(UnitHydrographReport {
        event_id: event.id.clone(),
        baseflow: separation.baseflow,
        runoff_depth: set.runoff_depth,
        unit_hydrograph: set.unit_hydrograph,
        dimensionless: set.dimensionless,
        peak_ordinate: set.peak_ordinate,
        time_to_peak_days: set.time_to_peak_days,
        prf: set.prf,
        uh_depth: set.uh_depth,
        depth_advisory: set.depth_advisory,
    })
}

/// Curve-number abstraction → lag time for one event.
pub fn estimate_event_lag(event: &StormEvent) -> Result<LagTimeResult, HydroError> {
    let excess = abstraction::compute_excess_rainfall(&event.rainfall, event.curve_number)?;
    let est = lag_time::estimate(
        &event.discharge,
        &event.rainfall,
        excess.initial_abstraction_index,
    )?;

    Ok(LagTimeResult {
        event_id: event.id.clone(),
        peak_time: est.peak_time,
        peak_discharge: est.peak_discharge,
        excess_duration: est.excess_duration,
        lag_hours: est.lag_hours,
    })
}
