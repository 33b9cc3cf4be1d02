//! Test fixtures: representative event and precipitation tables.
//!
//! Structurally complete but truncated to the minimum needed to exercise
//! the readers and both pipelines.

/// 2-hour flood event at 15-minute spacing on a 12.4 mi² watershed.
/// Baseflow 100 cfs, peak 410 cfs at +1 h.
pub(crate) fn fixture_uh_event_csv() -> &'static str {
    "datetime,discharge_cfs,area_mi2
2019-05-01 00:00,100,12.4
2019-05-01 00:15,120,
2019-05-01 00:30,210,
2019-05-01 00:45,340,
2019-05-01 01:00,410,
2019-05-01 01:15,300,
2019-05-01 01:30,190,
2019-05-01 01:45,130,
2019-05-01 02:00,105,
"
}

/// Same layout with the peak on the first row.
pub(crate) fn fixture_uh_receding_csv() -> &'static str {
    "datetime,discharge_cfs,area_mi2
2019-06-02 12:00,640,12.4
2019-06-02 12:15,520,
2019-06-02 12:30,410,
2019-06-02 12:45,330,
"
}

/// Rainfall-runoff event: hourly discharge, 30-minute rainfall totalling
/// 3.1 in, CN 78. Rainfall rows stop before the discharge rows do.
pub(crate) fn fixture_storm_event_csv() -> &'static str {
    "Date1,Discharge_cfs,Date2,Rainfall_in,CN
2020-08-10 12:00,35,2020-08-10 11:00,0.2,78
2020-08-10 13:00,38,2020-08-10 11:30,0.4,
2020-08-10 14:00,95,2020-08-10 12:00,1.1,
2020-08-10 15:00,240,2020-08-10 12:30,0.9,
2020-08-10 16:00,410,2020-08-10 13:00,0.3,
2020-08-10 17:00,520,2020-08-10 13:30,0.2,
2020-08-10 18:00,430,,,
2020-08-10 19:00,260,,,
2020-08-10 20:00,140,,,
2020-08-10 21:00,70,,,
"
}

/// NCDC 15-minute precipitation for one station, including a 999.99
/// missing-data flag.
pub(crate) fn fixture_station_a_csv() -> &'static str {
    "date,QPCP
2020-08-10T11:00:00,0.20
2020-08-10T11:15:00,0.40
2020-08-10T11:30:00,999.99
2020-08-10T11:45:00,0.10
"
}

/// Second station sharing two timestamps with station A.
pub(crate) fn fixture_station_b_csv() -> &'static str {
    "date,QPCP
2020-08-10T11:00:00,0.30
2020-08-10T11:15:00,0.20
2020-08-10T11:30:00,0.50
"
}
