//! Tabular output for pipeline results.
//!
//! Writers take any `io::Write`; choosing file names and folders is left to
//! the caller. Summary tables have one row per event keyed by event id.

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::batch::EventReport;
use crate::model::{DimensionlessUh, LagTimeResult, UnitHydrograph, UnitHydrographReport};
use crate::series::TimeSeries;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON write failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Summary rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrfRow {
    #[serde(rename = "Event")]
    pub event_id: String,
    /// NRCS scale (484 for the standard UH) for either unit system.
    #[serde(rename = "PRF")]
    pub prf: i64,
    #[serde(rename = "Tp_hr")]
    pub time_to_peak_hours: f64,
    #[serde(rename = "UH_depth_in")]
    pub uh_depth: f64,
    #[serde(rename = "Depth_advisory")]
    pub depth_advisory: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagRow {
    #[serde(rename = "Event")]
    pub event_id: String,
    #[serde(rename = "Lag time_hr")]
    pub lag_hours: f64,
    #[serde(rename = "Plausible")]
    pub plausible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRow {
    #[serde(rename = "Event")]
    pub event_id: String,
    #[serde(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Message")]
    pub message: String,
}

pub fn prf_rows(reports: &[EventReport<UnitHydrographReport>]) -> Vec<PrfRow> {
    reports
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok())
        .map(|uh| PrfRow {
            event_id: uh.event_id.clone(),
            prf: uh.prf,
            time_to_peak_hours: uh.time_to_peak_days * 24.0,
            uh_depth: uh.uh_depth,
            depth_advisory: uh.depth_advisory,
        })
        .collect()
}

pub fn lag_rows(reports: &[EventReport<LagTimeResult>]) -> Vec<LagRow> {
    reports
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok())
        .map(|lag| LagRow {
            event_id: lag.event_id.clone(),
            lag_hours: lag.lag_hours,
            plausible: lag.is_plausible(),
        })
        .collect()
}

pub fn failure_rows<T>(reports: &[EventReport<T>]) -> Vec<FailureRow> {
    reports
        .iter()
        .filter_map(|r| {
            r.outcome.as_ref().err().map(|e| FailureRow {
                event_id: r.event_id.clone(),
                kind: e.kind().to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Writes serializable rows as CSV with a header row.
pub fn write_rows<W: Write, R: Serialize>(writer: W, rows: &[R]) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Unit hydrograph as `Days,UH_cfs/in`.
pub fn write_unit_hydrograph<W: Write>(writer: W, uh: &UnitHydrograph) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Days", "UH_cfs/in"])?;
    for p in &uh.points {
        wtr.write_record([p.elapsed_days.to_string(), p.ordinate.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Dimensionless unit hydrograph as `t/Tp,Q/Qp`.
pub fn write_dimensionless<W: Write>(writer: W, duh: &DimensionlessUh) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["t/Tp", "Q/Qp"])?;
    for p in &duh.points {
        wtr.write_record([p.time_ratio.to_string(), p.flow_ratio.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// A timestamped series as `date,<value_header>`.
pub fn write_series<W: Write>(
    writer: W,
    series: &TimeSeries,
    value_header: &str,
) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", value_header])?;
    for s in series.samples() {
        wtr.write_record([
            s.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            s.value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Pretty-printed JSON of any serializable result.
pub fn write_json<W: Write, T: Serialize>(writer: W, value: &T) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HydroError, UhPoint};
    use chrono::{Duration, NaiveDate};

    fn uh_report(id: &str, prf: i64) -> UnitHydrographReport {
        UnitHydrographReport {
            event_id: id.to_string(),
            baseflow: 100.0,
            runoff_depth: 0.5,
            unit_hydrograph: UnitHydrograph { points: vec![] },
            dimensionless: DimensionlessUh { points: vec![] },
            peak_ordinate: 1000.0,
            time_to_peak_days: 0.25,
            prf,
            uh_depth: 1.0,
            depth_advisory: false,
        }
    }

    #[test]
    fn test_prf_and_failure_rows_split_outcomes() {
        let reports = vec![
            EventReport { event_id: "a".into(), outcome: Ok(uh_report("a", 484)) },
            EventReport {
                event_id: "b".into(),
                outcome: Err(HydroError::DegenerateEvent("peak at first sample".into())),
            },
        ];

        let prf = prf_rows(&reports);
        assert_eq!(prf.len(), 1);
        assert_eq!(prf[0].prf, 484);
        assert_eq!(prf[0].time_to_peak_hours, 6.0);

        let failures = failure_rows(&reports);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].event_id, "b");
        assert_eq!(failures[0].kind, "degenerate_event");
    }

    #[test]
    fn test_write_rows_uses_renamed_headers() {
        let rows = vec![LagRow { event_id: "storm_1".into(), lag_hours: 3.5, plausible: true }];
        let mut buf = Vec::new();
        write_rows(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Event,Lag time_hr,Plausible\nstorm_1,3.5,true\n");
    }

    #[test]
    fn test_write_unit_hydrograph_table() {
        let uh = UnitHydrograph {
            points: vec![
                UhPoint { elapsed_days: 0.0, ordinate: 0.0 },
                UhPoint { elapsed_days: 0.5, ordinate: 250.0 },
            ],
        };
        let mut buf = Vec::new();
        write_unit_hydrograph(&mut buf, &uh).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Days,UH_cfs/in\n0,0\n0.5,250\n");
    }

    #[test]
    fn test_write_series_formats_timestamps() {
        let t0 = NaiveDate::from_ymd_opt(2020, 8, 10).unwrap().and_hms_opt(11, 0, 0).unwrap();
        let series =
            TimeSeries::from_pairs(vec![(t0, 0.25), (t0 + Duration::minutes(15), 0.3)]).unwrap();
        let mut buf = Vec::new();
        write_series(&mut buf, &series, "rainfall_in").unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "date,rainfall_in\n2020-08-10 11:00:00,0.25\n2020-08-10 11:15:00,0.3\n"
        );
    }

    #[test]
    fn test_write_json_report() {
        let mut buf = Vec::new();
        write_json(&mut buf, &uh_report("a", 300)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["prf"], 300);
        assert_eq!(value["event_id"], "a");
    }
}
