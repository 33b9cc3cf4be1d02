//! SCS curve-number abstraction.
//!
//! For a rainfall hyetograph (incremental depth per sample, inches) and a
//! curve number:
//!
//! - S  = 1000 / CN − 10 (potential maximum retention)
//! - Ia = 0.2 × S (initial abstraction)
//! - P  = total event rainfall
//! - Pe = (P − Ia)² / (P − Ia + S) (excess rainfall), requires P > Ia
//!
//! Walking the hyetograph in time order and drawing down the Ia balance
//! finds the sample where effective rainfall starts.

use serde::Serialize;

use crate::model::{HydroError, validate_curve_number};
use crate::series::TimeSeries;

/// Fraction of potential retention taken as initial abstraction.
pub const INITIAL_ABSTRACTION_RATIO: f64 = 0.2;

/// Abstraction and excess-rainfall quantities for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcessRainfall {
    /// S, inches.
    pub potential_retention: f64,
    /// Ia, inches.
    pub initial_abstraction: f64,
    /// P, inches.
    pub total_rainfall: f64,
    /// Pe, inches.
    pub excess_rainfall: f64,
    /// First sample at which the running Ia balance reaches zero.
    pub initial_abstraction_index: usize,
    /// Rainfall rescaled by Pe / P, for display alongside the hydrograph.
    pub scaled: TimeSeries,
}

/// Potential maximum retention S for a curve number, in inches.
pub fn potential_retention(curve_number: f64) -> f64 {
    1000.0 / curve_number - 10.0
}

/// Applies the curve-number method to a rainfall series.
///
/// # Errors
/// - `InvalidParameter` for a curve number outside (0, 100] or negative
///   rainfall depths.
/// - `InsufficientRainfall` if the cumulative rainfall never exhausts Ia.
pub fn compute_excess_rainfall(
    rainfall: &TimeSeries,
    curve_number: f64,
) -> Result<ExcessRainfall, HydroError> {
    validate_curve_number(curve_number)?;
    if let Some(s) = rainfall.samples().iter().find(|s| s.value < 0.0) {
        return Err(HydroError::InvalidParameter(format!(
            "negative rainfall depth {} at {}",
            s.value, s.timestamp
        )));
    }

    let s = potential_retention(curve_number);
    let p = rainfall.sum();
    let ia = INITIAL_ABSTRACTION_RATIO * s;

    let insufficient = HydroError::InsufficientRainfall {
        initial_abstraction_in: ia,
        total_rainfall_in: p,
    };

    let mut balance = ia;
    let mut index = None;
    for (i, sample) in rainfall.samples().iter().enumerate() {
        balance -= sample.value;
        if balance <= 0.0 {
            index = Some(i);
            break;
        }
    }
    let initial_abstraction_index = index.ok_or_else(|| insufficient.clone())?;

    // CN = 100 gives Ia = 0, so the balance is exhausted at the first sample
    // even when P is zero.
    if p <= ia {
        return Err(insufficient);
    }

    let excess = (p - ia).powi(2) / (p - ia + s);
    let scaled = rainfall.map_values(|depth| depth * excess / p);

    Ok(ExcessRainfall {
        potential_retention: s,
        initial_abstraction: ia,
        total_rainfall: p,
        excess_rainfall: excess,
        initial_abstraction_index,
        scaled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn hyetograph(depths: &[f64]) -> TimeSeries {
        let t0 = NaiveDate::from_ymd_opt(2020, 8, 10)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        TimeSeries::from_pairs(
            depths
                .iter()
                .enumerate()
                .map(|(i, d)| (t0 + Duration::minutes(15 * i as i64), *d)),
        )
        .unwrap()
    }

    #[test]
    fn test_cn_85_three_inch_storm() {
        let rain = hyetograph(&[0.1, 0.2, 0.5, 1.0, 0.8, 0.3, 0.1]);
        let result = compute_excess_rainfall(&rain, 85.0).unwrap();

        assert!((result.potential_retention - 1.7647).abs() < 1e-3);
        assert!((result.initial_abstraction - 0.3529).abs() < 1e-3);
        assert!((result.total_rainfall - 3.0).abs() < 1e-12);
        assert!((result.excess_rainfall - 1.59).abs() < 0.01, "got {}", result.excess_rainfall);
        // 0.1 + 0.2 = 0.3 < 0.353; adding 0.5 exhausts Ia at index 2.
        assert_eq!(result.initial_abstraction_index, 2);
    }

    #[test]
    fn test_scaled_series_sums_to_excess() {
        let rain = hyetograph(&[0.4, 0.9, 0.6, 0.2]);
        let result = compute_excess_rainfall(&rain, 78.0).unwrap();
        assert!((result.scaled.sum() - result.excess_rainfall).abs() < 1e-12);
        assert_eq!(result.scaled.len(), rain.len());
    }

    #[test]
    fn test_light_rain_is_insufficient() {
        let rain = hyetograph(&[0.05, 0.1, 0.05]);
        let result = compute_excess_rainfall(&rain, 60.0);
        assert!(matches!(result, Err(HydroError::InsufficientRainfall { .. })));
    }

    #[test]
    fn test_exact_exhaustion_without_excess_is_insufficient() {
        // CN = 80: S = 2.5, Ia = 0.5. P = Ia exactly leaves no excess.
        let rain = hyetograph(&[0.25, 0.25]);
        let result = compute_excess_rainfall(&rain, 80.0);
        assert!(matches!(result, Err(HydroError::InsufficientRainfall { .. })));
    }

    #[test]
    fn test_impervious_watershed_starts_at_first_sample() {
        let rain = hyetograph(&[0.3, 0.2]);
        let result = compute_excess_rainfall(&rain, 100.0).unwrap();
        assert_eq!(result.initial_abstraction_index, 0);
        assert!((result.excess_rainfall - 0.5).abs() < 1e-12, "all rain becomes runoff");
    }

    #[test]
    fn test_invalid_curve_number_and_negative_depths() {
        let rain = hyetograph(&[0.3, 0.2]);
        assert!(matches!(
            compute_excess_rainfall(&rain, 0.0),
            Err(HydroError::InvalidParameter(_))
        ));
        assert!(compute_excess_rainfall(&rain, 101.0).is_err());

        let bad = hyetograph(&[0.3, -0.2]);
        assert!(matches!(
            compute_excess_rainfall(&bad, 80.0),
            Err(HydroError::InvalidParameter(_))
        ));
    }
}
