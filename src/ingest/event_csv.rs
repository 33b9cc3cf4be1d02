//! Event table readers.
//!
//! UH event table (one file per flood event):
//!
//! ```text
//! datetime,discharge_cfs,area_mi2
//! 2019-05-01 00:00,100,12.4
//! 2019-05-01 00:15,104,
//! ...
//! ```
//!
//! Column 0 is the timestamp, column 1 the discharge, and the drainage area
//! is read from column 2 of the first data row only. Header names are not
//! checked.
//!
//! Rainfall-runoff event table, columns located by name:
//!
//! ```text
//! Date1,Discharge_cfs,Date2,Rainfall_in,CN
//! 2020-08-10 12:00,35,2020-08-10 11:00,0.02,78
//! ...
//! 2020-08-12 03:00,41,,,
//! ```
//!
//! The rainfall pair is usually shorter than the discharge pair; blank
//! trailing cells are dropped, not imputed. The curve number is read from
//! the first data row.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};

use super::IngestError;
use crate::model::{Event, StormEvent};
use crate::series::{Sample, TimeSeries};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M%:z"];

/// Parses a table timestamp. Timestamps carrying a UTC offset are converted
/// to UTC so a series crossing a DST change stays monotonic and uniform;
/// timestamps without an offset are taken as written.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Event identifier for a table path: its file stem.
pub fn event_id_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_value(row: usize, column: &str, raw: &str) -> Result<f64, IngestError> {
    raw.trim().parse::<f64>().map_err(|e| {
        IngestError::parse(row, format!("invalid {} '{}': {}", column, raw.trim(), e))
    })
}

fn parse_time(row: usize, column: &str, raw: &str) -> Result<NaiveDateTime, IngestError> {
    parse_timestamp(raw)
        .ok_or_else(|| IngestError::parse(row, format!("invalid {} '{}'", column, raw.trim())))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

// ---------------------------------------------------------------------------
// UH event table
// ---------------------------------------------------------------------------

/// Reads a UH event table into an `Event`.
pub fn read_discharge_event<R: Read>(id: &str, reader: R) -> Result<Event, IngestError> {
    let mut rdr = csv_reader(reader);
    let mut samples = Vec::new();
    let mut area = None;

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let time_raw = record.get(0).unwrap_or("");
        let value_raw = record.get(1).unwrap_or("");
        if time_raw.is_empty() && value_raw.is_empty() {
            continue;
        }

        if area.is_none() {
            let area_raw = record
                .get(2)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| IngestError::parse(row, "drainage area missing from column 3"))?;
            area = Some(parse_value(row, "area", area_raw)?);
        }

        samples.push(Sample::new(
            parse_time(row, "timestamp", time_raw)?,
            parse_value(row, "discharge", value_raw)?,
        ));
    }

    let area = area.ok_or_else(|| IngestError::parse(1, "table has no data rows"))?;
    let discharge = TimeSeries::new(samples)?;
    Ok(Event::new(id, area, discharge)?)
}

/// Opens and reads a UH event table; the event id is the file stem.
pub fn load_discharge_event(path: &Path) -> Result<Event, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    read_discharge_event(&event_id_from_path(path), file)
}

// ---------------------------------------------------------------------------
// Rainfall-runoff event table
// ---------------------------------------------------------------------------

const COL_DISCHARGE_TIME: &str = "Date1";
const COL_DISCHARGE: &str = "Discharge_cfs";
const COL_RAIN_TIME: &str = "Date2";
const COL_RAIN: &str = "Rainfall_in";
const COL_CN: &str = "CN";

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
}

/// Reads a paired (time, value) cell set; `None` when either cell is blank.
fn paired_cells<'a>(
    record: &'a csv::StringRecord,
    time_idx: usize,
    value_idx: usize,
) -> Option<(&'a str, &'a str)> {
    let time = record.get(time_idx).filter(|s| !s.is_empty())?;
    let value = record.get(value_idx).filter(|s| !s.is_empty())?;
    Some((time, value))
}

/// Reads a rainfall-runoff event table into a `StormEvent`.
pub fn read_storm_event<R: Read>(id: &str, reader: R) -> Result<StormEvent, IngestError> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();

    let q_time = column_index(&headers, COL_DISCHARGE_TIME)?;
    let q_value = column_index(&headers, COL_DISCHARGE)?;
    let r_time = column_index(&headers, COL_RAIN_TIME)?;
    let r_value = column_index(&headers, COL_RAIN)?;
    let cn_idx = column_index(&headers, COL_CN)?;

    let mut discharge = Vec::new();
    let mut rainfall = Vec::new();
    let mut curve_number = None;

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        if curve_number.is_none() {
            if let Some(raw) = record.get(cn_idx).filter(|s| !s.is_empty()) {
                curve_number = Some(parse_value(row, COL_CN, raw)?);
            }
        }

        if let Some((time, value)) = paired_cells(&record, q_time, q_value) {
            discharge.push(Sample::new(
                parse_time(row, COL_DISCHARGE_TIME, time)?,
                parse_value(row, COL_DISCHARGE, value)?,
            ));
        }
        if let Some((time, value)) = paired_cells(&record, r_time, r_value) {
            rainfall.push(Sample::new(
                parse_time(row, COL_RAIN_TIME, time)?,
                parse_value(row, COL_RAIN, value)?,
            ));
        }
    }

    let curve_number = curve_number.ok_or_else(|| IngestError::parse(1, "curve number missing"))?;
    let discharge = TimeSeries::new(discharge)?;
    let rainfall = TimeSeries::new(rainfall)?;
    Ok(StormEvent::new(id, discharge, rainfall, curve_number)?)
}

/// Opens and reads a rainfall-runoff event table; the event id is the file stem.
pub fn load_storm_event(path: &Path) -> Result<StormEvent, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    read_storm_event(&event_id_from_path(path), file)
}
