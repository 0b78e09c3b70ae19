//! Error types surfaced to callers. Only the parser can fail; the later
//! stages fall back to documented defaults instead of raising errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The ways a GPX document can be rejected, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The XML could not be read as a GPX document.
    #[error("Failed to parse GPX file: {details}")]
    Malformed { details: String },
    /// The document is valid but contains no `<trk>` elements.
    #[error("No tracks found in GPX file: The file must contain at least one track with points")]
    NoTracks,
    /// There are tracks, but none of them contain any points.
    #[error("No valid points found in GPX tracks: All tracks appear to be empty")]
    EmptyTracks,
    /// Fewer than 2 points across all tracks.
    #[error("Insufficient points: At least 2 points are required for analysis")]
    InsufficientPoints { count: usize },
}

impl ParseError {
    /// The short, fixed description of the failure.
    pub fn message(&self) -> &'static str {
        match self {
            ParseError::Malformed { .. } => "Failed to parse GPX file",
            ParseError::NoTracks => "No tracks found in GPX file",
            ParseError::EmptyTracks => "No valid points found in GPX tracks",
            ParseError::InsufficientPoints { .. } => "Insufficient points",
        }
    }

    /// Additional information about the failure.
    pub fn details(&self) -> Option<String> {
        match self {
            ParseError::Malformed { details } => Some(details.clone()),
            ParseError::NoTracks => {
                Some("The file must contain at least one track with points".to_owned())
            }
            ParseError::EmptyTracks => Some("All tracks appear to be empty".to_owned()),
            ParseError::InsufficientPoints { .. } => {
                Some("At least 2 points are required for analysis".to_owned())
            }
        }
    }

    /// Wraps a reader error, keeping the whole context chain as the details.
    pub(crate) fn malformed(err: anyhow::Error) -> Self {
        ParseError::Malformed {
            details: format!("{err:#}"),
        }
    }
}

/// A structured error that can cross a thread or process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

impl From<&ParseError> for ErrorPayload {
    fn from(value: &ParseError) -> Self {
        Self {
            message: value.message().to_owned(),
            details: value.details(),
        }
    }
}

impl From<ParseError> for ErrorPayload {
    fn from(value: ParseError) -> Self {
        Self::from(&value)
    }
}

/// Failures of the background worker itself, as opposed to failures of the
/// job it was running.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Could not create the analysis thread pool: {0}")]
    PoolCreation(#[from] rayon::ThreadPoolBuildError),
    #[error("The analysis worker stopped without sending a result")]
    Disconnected,
}
