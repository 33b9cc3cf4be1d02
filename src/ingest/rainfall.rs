//! Basin-average rainfall from several precipitation stations.
//!
//! Each station table carries `date` and `QPCP` (15-minute precipitation,
//! inches) columns. Readings equal to the missing-data flag are discarded,
//! and the remaining depths are averaged per timestamp across stations.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;

use super::IngestError;
use super::event_csv::{event_id_from_path, parse_timestamp};
use crate::model::HydroError;
use crate::series::{Sample, TimeSeries};

/// NCDC flag value for a missing precipitation reading.
pub const NCDC_MISSING_FLAG: f64 = 999.99;

const COL_DATE: &str = "date";
const COL_PRECIP: &str = "QPCP";

/// One precipitation reading from one station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRainfall {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub depth: f64,
}

/// Reads a station precipitation table. Rows with a blank date or depth are
/// skipped; flagged values are kept here and removed by the averaging step.
pub fn read_station_rainfall<R: Read>(
    station_id: &str,
    reader: R,
) -> Result<Vec<StationRainfall>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(COL_DATE))
        .ok_or_else(|| IngestError::MissingColumn(COL_DATE.to_string()))?;
    let depth_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(COL_PRECIP))
        .ok_or_else(|| IngestError::MissingColumn(COL_PRECIP.to_string()))?;

    let mut readings = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let (Some(date), Some(depth)) = (
            record.get(date_idx).filter(|s| !s.is_empty()),
            record.get(depth_idx).filter(|s| !s.is_empty()),
        ) else {
            continue;
        };

        let timestamp = parse_timestamp(date)
            .ok_or_else(|| IngestError::parse(row, format!("invalid date '{}'", date)))?;
        let depth: f64 = depth
            .parse()
            .map_err(|e| IngestError::parse(row, format!("invalid QPCP '{}': {}", depth, e)))?;

        readings.push(StationRainfall {
            station_id: station_id.to_string(),
            timestamp,
            depth,
        });
    }

    Ok(readings)
}

/// Opens a station table; the station id is the file stem.
pub fn load_station_rainfall(path: &Path) -> Result<Vec<StationRainfall>, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    read_station_rainfall(&event_id_from_path(path), file)
}

fn is_missing(depth: f64, flag: f64) -> bool {
    !depth.is_finite() || (depth - flag).abs() < 1e-6
}

/// Averages readings per timestamp after dropping flagged and non-finite
/// values. Timestamps with no valid reading from any station are absent
/// from the result.
///
/// # Errors
/// - `InvalidParameter` if no valid reading remains.
pub fn average_station_rainfall(
    readings: &[StationRainfall],
    missing_flag: f64,
) -> Result<TimeSeries, HydroError> {
    let mut by_time: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();

    for reading in readings {
        if is_missing(reading.depth, missing_flag) {
            continue;
        }
        let entry = by_time.entry(reading.timestamp).or_insert((0.0, 0));
        entry.0 += reading.depth;
        entry.1 += 1;
    }

    TimeSeries::new(
        by_time
            .into_iter()
            .map(|(t, (sum, count))| Sample::new(t, sum / count as f64))
            .collect(),
    )
}
