//! Straight-line baseflow separation.
//!
//! The whole event is assumed to start at baseflow: the first discharge
//! sample is taken as a constant baseflow and subtracted from every sample,
//! flooring at zero. There is no recession-curve fitting. Events whose series
//! does not start near baseline will produce zero-inflated direct runoff.

use serde::Serialize;

use crate::series::TimeSeries;

/// Result of separating baseflow from total discharge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseflowSeparation {
    /// Constant baseflow, in the discharge series' units.
    pub baseflow: f64,
    /// Total discharge minus baseflow, floored at zero, same timestamps.
    pub direct_runoff: TimeSeries,
}

/// Separates a constant baseflow taken from the first sample.
pub fn separate(discharge: &TimeSeries) -> BaseflowSeparation {
    let baseflow = discharge.first().value;
    let direct_runoff = discharge.map_values(|q| (q - baseflow).max(0.0));

    BaseflowSeparation {
        baseflow,
        direct_runoff,
    }
}
