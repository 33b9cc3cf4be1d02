//! runoff_response: watershed response to storm events.
//!
//! Derives unit hydrographs, dimensionless unit hydrographs and peak rate
//! factors from discharge records, and estimates lag time from paired
//! rainfall and discharge using the SCS curve-number abstraction.
//!
//! # Module structure
//!
//! ```text
//! runoff_response
//! ├── model       — shared data types (Event, StormEvent, UnitHydrograph, HydroError, …)
//! ├── series      — timestamped series with uniform-interval checks
//! ├── config      — runoff.toml loader (units, sampling, workers, folders)
//! ├── logging     — tracing subscriber setup
//! ├── batch       — thread pool driver with per-event outcome reports
//! ├── report      — CSV / JSON writers for series and summary tables
//! ├── ingest
//! │   ├── event_csv — UH event and rainfall-runoff event tables
//! │   ├── rainfall  — station precipitation tables and basin averaging
//! │   └── fixtures (test only) — representative tables
//! └── analysis
//!     ├── baseflow        — straight-line baseflow separation
//!     ├── runoff          — trapezoidal discharge-to-depth integration
//!     ├── unit_hydrograph — UH, dimensionless UH and PRF
//!     ├── abstraction     — SCS initial abstraction and excess rainfall
//!     └── lag_time        — lag between excess rainfall and peak discharge
//! ```

pub mod analysis;
pub mod batch;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
pub mod series;
