//! Risk report pipeline: CSV upload in, charts plus a written summary out.

pub mod ai;
pub mod charts;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod report;
pub mod risk;
pub mod stats;
pub mod telemetry;
pub mod util;

pub use error::{ReportError, Result};
pub use models::{Analysis, AnalysisOutcome, AnalysisType, Dataset, Language, ReportResult};
pub use report::ReportGenerator;
