//! Readers that turn tabulated event files into typed events.
//!
//! - `event_csv` — the UH event table and the rainfall-runoff event table
//! - `rainfall`  — per-station precipitation tables and their basin average
//! - `fixtures` (test only) — representative tables

pub mod event_csv;
pub mod rainfall;

#[cfg(test)]
pub(crate) mod fixtures;

use thiserror::Error;

use crate::model::HydroError;

/// Errors raised while reading tabulated input.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `row` counts data rows from 1, excluding the header.
    #[error("data row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error(transparent)]
    Hydro(#[from] HydroError),
}

impl IngestError {
    pub fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Short tag for failure tables; hydrology errors keep their own kind.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Hydro(e) => e.kind(),
            _ => "ingest_error",
        }
    }

    fn parse(row: usize, message: impl Into<String>) -> Self {
        IngestError::Parse {
            row,
            message: message.into(),
        }
    }
}
