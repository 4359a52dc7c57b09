use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a report request. Everything else degrades silently.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    MalformedCsv(#[from] csv::Error),

    #[error("failed to render {chart} chart: {reason}")]
    Chart { chart: &'static str, reason: String },

    #[error("chart rendering task failed: {0}")]
    ChartTask(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
