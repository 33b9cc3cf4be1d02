//! Timestamped series with a uniform sampling interval.
//!
//! `TimeSeries` is the foundation every pipeline stage consumes. It is
//! constructed once from ordered samples and never mutated afterwards;
//! transformations (`map_values`, `shifted`) return a new series.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::model::HydroError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One (timestamp, value) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Non-empty, strictly time-ordered sequence of samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Builds a series from samples already in time order.
    ///
    /// # Errors
    /// - `InvalidParameter` if `samples` is empty, a value is not finite, or
    ///   timestamps are not strictly increasing.
    pub fn new(samples: Vec<Sample>) -> Result<Self, HydroError> {
        if samples.is_empty() {
            return Err(HydroError::InvalidParameter("series is empty".to_string()));
        }

        for (i, sample) in samples.iter().enumerate() {
            if !sample.value.is_finite() {
                return Err(HydroError::InvalidParameter(format!(
                    "non-finite value {} at sample {}",
                    sample.value, i
                )));
            }
        }

        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(HydroError::InvalidParameter(format!(
                    "timestamps not strictly increasing at sample {} ({} after {})",
                    i + 1,
                    pair[1].timestamp,
                    pair[0].timestamp
                )));
            }
        }

        Ok(Self { samples })
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, HydroError>
    where
        I: IntoIterator<Item = (NaiveDateTime, f64)>,
    {
        Self::new(pairs.into_iter().map(|(t, v)| Sample::new(t, v)).collect())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }

    pub fn last(&self) -> &Sample {
        &self.samples[self.samples.len() - 1]
    }

    pub fn sum(&self) -> f64 {
        self.samples.iter().map(|s| s.value).sum()
    }

    /// Index and sample of the maximum value, first occurrence on ties.
    pub fn peak(&self) -> (usize, &Sample) {
        let mut best = 0;
        for (i, sample) in self.samples.iter().enumerate().skip(1) {
            if sample.value > self.samples[best].value {
                best = i;
            }
        }
        (best, &self.samples[best])
    }

    /// Sampling interval taken from the first two timestamps.
    ///
    /// # Errors
    /// - `InvalidParameter` if the series has a single sample.
    pub fn interval(&self) -> Result<Duration, HydroError> {
        if self.samples.len() < 2 {
            return Err(HydroError::InvalidParameter(
                "at least two samples are needed to derive a sampling interval".to_string(),
            ));
        }
        Ok(self.samples[1].timestamp - self.samples[0].timestamp)
    }

    /// Like `interval`, but also checks every later interval against the first.
    ///
    /// # Errors
    /// - `NonUniformSampling` naming the first sample whose preceding interval
    ///   differs.
    pub fn validate_uniform(&self) -> Result<Duration, HydroError> {
        let interval = self.interval()?;
        for (i, pair) in self.samples.windows(2).enumerate().skip(1) {
            let step = pair[1].timestamp - pair[0].timestamp;
            if step != interval {
                return Err(HydroError::NonUniformSampling {
                    index: i + 1,
                    expected_secs: interval.num_seconds(),
                    found_secs: step.num_seconds(),
                });
            }
        }
        Ok(interval)
    }

    /// Elapsed time index in days, starting at zero and stepping by the
    /// first interval.
    pub fn elapsed_days(&self) -> Result<Vec<f64>, HydroError> {
        let step = interval_seconds(self.interval()?) / SECONDS_PER_DAY;
        Ok((0..self.samples.len()).map(|i| i as f64 * step).collect())
    }

    /// New series with the same timestamps and transformed values.
    pub fn map_values<F>(&self, f: F) -> TimeSeries
    where
        F: Fn(f64) -> f64,
    {
        TimeSeries {
            samples: self
                .samples
                .iter()
                .map(|s| Sample::new(s.timestamp, f(s.value)))
                .collect(),
        }
    }

    /// New series with every timestamp moved by `offset`.
    pub fn shifted(&self, offset: Duration) -> TimeSeries {
        TimeSeries {
            samples: self
                .samples
                .iter()
                .map(|s| Sample::new(s.timestamp + offset, s.value))
                .collect(),
        }
    }
}

/// Interval length in (fractional) seconds.
pub fn interval_seconds(interval: Duration) -> f64 {
    interval.num_milliseconds() as f64 / 1000.0
}
