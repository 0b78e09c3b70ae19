//! Analysis of GPX cycling routes: distances, grades, elevation and time
//! statistics, climb detection and simplification for map display.

pub mod analysis;
pub mod climb;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod model_impls;
pub mod parser;
pub mod read;
pub mod simplification;
pub mod stats;
pub mod worker;

pub use analysis::{analyse_file, analyse_gpx_str};
pub use config::{AnalysisConfig, SmoothingLevel};
pub use error::{ErrorPayload, ParseError, WorkerError};
pub use model::AnalysisResult;
pub use parser::parse_gpx_str;
pub use worker::{analyse_batch, AnalysisJob, AnalysisWorker, JobHandle, JobOutcome};
