//! Runoff integrator: direct-runoff discharge to incremental runoff depth.
//!
//! Each interval's volume is the trapezoidal average discharge times the
//! interval length. Dividing by the drainage area gives a depth; the
//! `DepthUnits` constants carry the conversion between the area's length
//! unit and the depth unit, so the same code serves US customary
//! (mi², cfs → in) and metric (km², m³/s → mm) inputs:
//!
//! ```text
//! depth[i] = (q[i-1] + q[i]) / 2 × Δt × depth_per_length / (area × length_per_area_side²)
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::model::{HydroError, validate_area};
use crate::series::interval_seconds;

/// Geometric constants converting (flow unit × seconds) / area to depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthUnits {
    /// Flow-unit lengths per side of one area unit (5280 ft per mile).
    pub length_per_area_side: f64,
    /// Depth units per flow-unit length (12 in per ft).
    pub depth_per_length: f64,
    /// Multiplier taking Qp × Tp × 24 / area in these units to the NRCS
    /// peak rate factor scale (cfs/in, hours, mi²; 484 for the standard UH).
    pub prf_scale: f64,
}

impl DepthUnits {
    /// Area in mi², discharge in ft³/s, depth in inches.
    pub const US_CUSTOMARY: DepthUnits = DepthUnits {
        length_per_area_side: 5280.0,
        depth_per_length: 12.0,
        prf_scale: 1.0,
    };

    /// Area in km², discharge in m³/s, depth in millimetres.
    pub const METRIC: DepthUnits = DepthUnits {
        length_per_area_side: 1000.0,
        depth_per_length: 1000.0,
        // 35.3147 cfs per m³/s × 25.4 mm per in × 2.58999 km² per mi²
        prf_scale: 2323.2,
    };

    /// Depth produced by one unit of discharge sustained for one second over
    /// `area`.
    fn depth_per_flow_second(&self, area: f64) -> f64 {
        self.depth_per_length / (area * self.length_per_area_side.powi(2))
    }
}

impl Default for DepthUnits {
    fn default() -> Self {
        DepthUnits::US_CUSTOMARY
    }
}

/// Integrates discharge ordinates sampled at a fixed interval over a fixed
/// drainage area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunoffIntegrator {
    area: f64,
    interval_seconds: f64,
    units: DepthUnits,
}

impl RunoffIntegrator {
    /// # Errors
    /// - `InvalidParameter` for a non-positive area or interval.
    pub fn new(area: f64, interval: Duration, units: DepthUnits) -> Result<Self, HydroError> {
        validate_area(area)?;
        let interval_seconds = interval_seconds(interval);
        if interval_seconds <= 0.0 {
            return Err(HydroError::InvalidParameter(format!(
                "sampling interval must be positive, got {}s",
                interval_seconds
            )));
        }
        Ok(Self {
            area,
            interval_seconds,
            units,
        })
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn interval_seconds(&self) -> f64 {
        self.interval_seconds
    }

    pub fn units(&self) -> DepthUnits {
        self.units
    }

    /// Incremental depth per sample. `depth[0]` is zero; the elements sum to
    /// the total depth under the ordinates.
    pub fn integrate_to_depth(&self, ordinates: &[f64]) -> Vec<f64> {
        let factor = self.interval_seconds * self.units.depth_per_flow_second(self.area);

        let mut depth = Vec::with_capacity(ordinates.len());
        if ordinates.is_empty() {
            return depth;
        }
        depth.push(0.0);
        for pair in ordinates.windows(2) {
            depth.push((pair[0] + pair[1]) / 2.0 * factor);
        }
        depth
    }

    /// Total depth under the ordinates.
    pub fn total_depth(&self, ordinates: &[f64]) -> f64 {
        self.integrate_to_depth(ordinates).iter().sum()
    }
}
