//! Unit hydrograph builder.
//!
//! Normalizes a direct-runoff hydrograph so the depth under it is exactly one
//! unit of depth, then derives:
//!
//! 1. **Unit hydrograph** — ordinate[i] = direct_runoff[i] / total_depth (cfs/in)
//! 2. **Depth check** — the UH is re-integrated with the same integrator; if
//!    the depth does not round to 1.0 at one decimal place an advisory is
//!    raised. Ordinates are never corrected automatically.
//! 3. **Dimensionless UH** — (t / Tp, Q / Qp), peak maps to (1.0, 1.0)
//! 4. **Peak rate factor** — round(Qp × Tp(days) × 24 / area)

use crate::analysis::baseflow::BaseflowSeparation;
use crate::analysis::runoff::RunoffIntegrator;
use crate::model::{
    DimensionlessPoint, DimensionlessUh, HydroError, UhPoint, UnitHydrograph,
};

/// Output of `build`, before it is attached to an event id.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitHydrographSet {
    pub unit_hydrograph: UnitHydrograph,
    pub dimensionless: DimensionlessUh,
    pub runoff_depth: f64,
    pub peak_ordinate: f64,
    pub time_to_peak_days: f64,
    pub prf: i64,
    pub uh_depth: f64,
    pub depth_advisory: bool,
}

/// Builds the UH, dimensionless UH and PRF from separated direct runoff and
/// its incremental depth series.
///
/// # Errors
/// - `InvalidParameter` if `depth` does not line up with the direct runoff.
/// - `DegenerateEvent` if there is no direct runoff at all, or the peak falls
///   on the first sample (zero time-to-peak).
pub fn build(
    separation: &BaseflowSeparation,
    depth: &[f64],
    integrator: &RunoffIntegrator,
) -> Result<UnitHydrographSet, HydroError> {
    let direct = &separation.direct_runoff;
    if depth.len() != direct.len() {
        return Err(HydroError::InvalidParameter(format!(
            "depth series has {} samples, direct runoff has {}",
            depth.len(),
            direct.len()
        )));
    }

    let runoff_depth: f64 = depth.iter().sum();
    if runoff_depth <= 0.0 {
        return Err(HydroError::DegenerateEvent(
            "no direct runoff above baseflow".to_string(),
        ));
    }

    let elapsed = direct.elapsed_days()?;
    let unit_hydrograph = UnitHydrograph {
        points: elapsed
            .iter()
            .zip(direct.samples())
            .map(|(&elapsed_days, s)| UhPoint {
                elapsed_days,
                ordinate: s.value / runoff_depth,
            })
            .collect(),
    };

    let uh_depth = integrator.total_depth(&unit_hydrograph.ordinates());
    let depth_advisory = round_to(uh_depth, 1) != 1.0;

    let (peak_index, peak) = unit_hydrograph
        .peak()
        .ok_or_else(|| HydroError::InvalidParameter("unit hydrograph is empty".to_string()))?;
    if peak_index == 0 {
        return Err(HydroError::DegenerateEvent(
            "peak discharge at the first sample (zero time-to-peak)".to_string(),
        ));
    }

    let dimensionless = dimensionless(&unit_hydrograph, peak);
    // Reported on the NRCS scale whatever the input units.
    let prf = peak_rate_factor(
        peak.ordinate * integrator.units().prf_scale,
        peak.elapsed_days,
        integrator.area(),
    );

    Ok(UnitHydrographSet {
        unit_hydrograph,
        dimensionless,
        runoff_depth,
        peak_ordinate: peak.ordinate,
        time_to_peak_days: peak.elapsed_days,
        prf,
        uh_depth,
        depth_advisory,
    })
}

fn dimensionless(uh: &UnitHydrograph, peak: UhPoint) -> DimensionlessUh {
    DimensionlessUh {
        points: uh
            .points
            .iter()
            .map(|p| DimensionlessPoint {
                time_ratio: p.elapsed_days / peak.elapsed_days,
                flow_ratio: p.ordinate / peak.ordinate,
            })
            .collect(),
    }
}

/// PRF = Qp × Tp × 24 / area, with Tp in days, rounded to the nearest integer.
pub fn peak_rate_factor(peak_ordinate: f64, time_to_peak_days: f64, area: f64) -> i64 {
    (peak_ordinate * time_to_peak_days * 24.0 / area).round() as i64
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

impl UnitHydrograph {
    /// Depth under the ordinates, as computed by `integrator`.
    pub fn depth(&self, integrator: &RunoffIntegrator) -> f64 {
        integrator.total_depth(&self.ordinates())
    }

    /// Proportionally rescales the ordinates so the integrated depth is
    /// exactly 1.0. Opt-in follow-up to a depth advisory.
    ///
    /// # Errors
    /// - `DegenerateEvent` if the current depth is zero.
    pub fn rescaled_to_unit_depth(
        &self,
        integrator: &RunoffIntegrator,
    ) -> Result<UnitHydrograph, HydroError> {
        let depth = self.depth(integrator);
        if depth <= 0.0 {
            return Err(HydroError::DegenerateEvent(
                "unit hydrograph has zero depth".to_string(),
            ));
        }
        Ok(UnitHydrograph {
            points: self
                .points
                .iter()
                .map(|p| UhPoint {
                    elapsed_days: p.elapsed_days,
                    ordinate: p.ordinate / depth,
                })
                .collect(),
        })
    }
}
