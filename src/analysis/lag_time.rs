//! Rainfall-to-peak lag time.
//!
//! lag = (T_peak − t_start − D_rain / 2), in hours, where T_peak is the time
//! of maximum discharge (first occurrence), t_start is the first discharge
//! timestamp, and D_rain is the span from the sample that exhausts the
//! initial abstraction to the last rainfall sample.

use chrono::{Duration, NaiveDateTime};

use crate::model::{HydroError, duration_hours};
use crate::series::TimeSeries;

/// Lag components before they are attached to an event id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagEstimate {
    pub peak_time: NaiveDateTime,
    pub peak_discharge: f64,
    pub excess_duration: Duration,
    pub lag_hours: f64,
}

/// Estimates the lag time. The result is not clamped and may be negative.
///
/// # Errors
/// - `InvalidParameter` if `initial_abstraction_index` is past the end of
///   the rainfall series.
pub fn estimate(
    discharge: &TimeSeries,
    rainfall: &TimeSeries,
    initial_abstraction_index: usize,
) -> Result<LagEstimate, HydroError> {
    let start = rainfall
        .samples()
        .get(initial_abstraction_index)
        .ok_or_else(|| {
            HydroError::InvalidParameter(format!(
                "initial abstraction index {} outside rainfall series of {} samples",
                initial_abstraction_index,
                rainfall.len()
            ))
        })?;

    let (_, peak) = discharge.peak();
    let excess_duration = rainfall.last().timestamp - start.timestamp;
    let lag = (peak.timestamp - discharge.first().timestamp) - excess_duration / 2;

    Ok(LagEstimate {
        peak_time: peak.timestamp,
        peak_discharge: peak.value,
        excess_duration,
        lag_hours: duration_hours(lag),
    })
}
