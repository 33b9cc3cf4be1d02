//! Batch driver for independent per-event computations.
//!
//! Each event is handed to a worker in a `threadpool::ThreadPool`, run through
//! a pipeline, and reported back over a channel. One event failing never
//! aborts the batch: every event yields an `EventReport` carrying either its
//! result or the error kind that stopped it, including a job that panics.
//! Reports come back in input order. No state is shared between jobs; each
//! job owns its event.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc;

use threadpool::ThreadPool;
use tracing::{info, warn};

use crate::analysis::{self, PipelineOptions};
use crate::model::{Event, HydroError, LagTimeResult, StormEvent, UnitHydrographReport};

/// Anything with an identifier the batch can report against.
pub trait BatchEvent {
    fn event_id(&self) -> &str;
}

impl BatchEvent for Event {
    fn event_id(&self) -> &str {
        &self.id
    }
}

impl BatchEvent for StormEvent {
    fn event_id(&self) -> &str {
        &self.id
    }
}

/// Tagged per-event outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct EventReport<T> {
    pub event_id: String,
    pub outcome: Result<T, HydroError>,
}

impl<T> EventReport<T> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Counts of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_reports<T>(reports: &[EventReport<T>]) -> Self {
        let succeeded = reports.iter().filter(|r| r.is_success()).count();
        Self {
            succeeded,
            failed: reports.len() - succeeded,
        }
    }
}

/// Runs `job` over every event on a pool of `workers` threads.
pub fn run_batch<E, T, F>(events: Vec<E>, workers: usize, job: F) -> Vec<EventReport<T>>
where
    E: BatchEvent + Send + 'static,
    T: Send + 'static,
    F: Fn(&E) -> Result<T, HydroError> + Send + Sync + 'static,
{
    let total = events.len();
    if total == 0 {
        return Vec::new();
    }

    let pool = ThreadPool::new(workers.clamp(1, total));
    let job = Arc::new(job);
    let (tx, rx) = mpsc::channel();
    let ids: Vec<String> = events.iter().map(|e| e.event_id().to_string()).collect();

    for (index, event) in events.into_iter().enumerate() {
        let tx = tx.clone();
        let job = Arc::clone(&job);
        pool.execute(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(&event)))
                .unwrap_or_else(|payload| Err(HydroError::WorkerPanicked(panic_message(payload))));
            let report = EventReport {
                event_id: event.event_id().to_string(),
                outcome,
            };
            // The receiver outlives the pool; a send error means the batch
            // was abandoned and the result is no longer wanted.
            let _ = tx.send((index, report));
        });
    }
    drop(tx);

    let mut slots: Vec<Option<EventReport<T>>> = (0..total).map(|_| None).collect();
    for (index, report) in rx {
        match &report.outcome {
            Ok(_) => info!(event_id = %report.event_id, "event processed"),
            Err(e) => warn!(
                event_id = %report.event_id,
                kind = e.kind(),
                error = %e,
                "event failed, continuing with batch"
            ),
        }
        slots[index] = Some(report);
    }
    pool.join();

    // A slot stays empty only if its worker died before sending.
    let reports: Vec<EventReport<T>> = slots
        .into_iter()
        .zip(ids)
        .map(|(slot, event_id)| {
            slot.unwrap_or_else(|| {
                warn!(event_id = %event_id, "no report from worker");
                EventReport {
                    event_id,
                    outcome: Err(HydroError::WorkerPanicked(
                        "worker exited without reporting".to_string(),
                    )),
                }
            })
        })
        .collect();
    let summary = BatchSummary::from_reports(&reports);
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "batch complete"
    );
    reports
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Unit hydrograph pipeline over a batch of events.
pub fn derive_all(
    events: Vec<Event>,
    options: PipelineOptions,
    workers: usize,
) -> Vec<EventReport<UnitHydrographReport>> {
    run_batch(events, workers, move |event| {
        let report = analysis::derive_unit_hydrograph(event, &options)?;
        if report.depth_advisory {
            warn!(
                event_id = %report.event_id,
                uh_depth = report.uh_depth,
                "unit hydrograph depth is not 1.0; ordinates should be rescaled"
            );
        }
        Ok(report)
    })
}

/// Lag time pipeline over a batch of events.
pub fn estimate_all(events: Vec<StormEvent>, workers: usize) -> Vec<EventReport<LagTimeResult>> {
    run_batch(events, workers, analysis::estimate_event_lag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::TimeSeries;
    use chrono::{Duration, NaiveDate};

    fn event(id: &str, values: &[f64]) -> Event {
        let t0 = NaiveDate::from_ymd_opt(2019, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let discharge = TimeSeries::from_pairs(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (t0 + Duration::minutes(15 * i as i64), *v)),
        )
        .unwrap();
        Event::new(id, 4.0, discharge).unwrap()
    }

    #[test]
    fn test_failed_event_does_not_abort_batch() {
        let events = vec![
            event("a", &[10.0, 50.0, 30.0, 10.0]),
            event("receding", &[90.0, 60.0, 30.0]),
            event("c", &[20.0, 25.0, 80.0, 40.0, 20.0]),
        ];
        let reports = derive_all(events, PipelineOptions::default(), 2);

        assert_eq!(reports.len(), 3);
        assert!(reports[0].is_success());
        assert!(matches!(reports[1].outcome, Err(HydroError::DegenerateEvent(_))));
        assert!(reports[2].is_success());
        assert_eq!(
            BatchSummary::from_reports(&reports),
            BatchSummary { succeeded: 2, failed: 1 }
        );
    }

    #[test]
    fn test_reports_preserve_input_order() {
        let ids: Vec<String> = (0..20).map(|i| format!("event_{:02}", i)).collect();
        let events: Vec<Event> = ids
            .iter()
            .map(|id| event(id, &[5.0, 15.0, 45.0, 20.0, 5.0]))
            .collect();

        let reports = derive_all(events, PipelineOptions::default(), 4);
        let got: Vec<&str> = reports.iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(got, ids.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallel_results_match_sequential() {
        let e = event("same", &[12.0, 30.0, 95.0, 70.0, 33.0, 14.0]);
        let sequential = analysis::derive_unit_hydrograph(&e, &PipelineOptions::default()).unwrap();
        let reports = derive_all(vec![e.clone(), e], PipelineOptions::default(), 8);
        for report in reports {
            assert_eq!(report.outcome.unwrap(), sequential);
        }
    }

    #[test]
    fn test_panicking_job_reported_as_failure() {
        let events = vec![
            event("a", &[10.0, 50.0, 30.0]),
            event("boom", &[10.0, 50.0, 30.0]),
            event("c", &[10.0, 50.0, 30.0]),
        ];
        let reports = run_batch(events, 2, |e: &Event| {
            if e.id == "boom" {
                panic!("gauge table corrupted");
            }
            Ok(e.id.clone())
        });

        let ids: Vec<&str> = reports.iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "boom", "c"], "panicking event keeps its slot");
        assert_eq!(
            BatchSummary::from_reports(&reports),
            BatchSummary { succeeded: 2, failed: 1 }
        );
        let err = reports[1].outcome.as_ref().unwrap_err();
        assert_eq!(err.kind(), "worker_panicked");
        assert!(err.to_string().contains("gauge table corrupted"), "got {}", err);
    }

    #[test]
    fn test_empty_batch() {
        let reports = derive_all(Vec::new(), PipelineOptions::default(), 4);
        assert!(reports.is_empty());
    }
}
