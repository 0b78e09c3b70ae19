//! Turns GPX text into the flat point sequence the rest of the pipeline
//! works on, rejecting documents that cannot be analysed.

use log::debug;
use logging_timer::time;

use crate::{
    error::ParseError,
    model::{Gpx, ParsedGpx},
    read::read_gpx_from_str,
};

/// The minimum number of points needed to say anything about a route.
pub const MIN_POINTS: usize = 2;

/// Parses a GPX 1.0 or 1.1 document. All tracks and segments are
/// concatenated, in document order, into one sequence of points.
///
/// The checks are made in this order, each with its own error:
/// the XML must be readable, there must be at least one track,
/// the tracks must contain at least one point, and there must be at least
/// [`MIN_POINTS`] points in total.
#[time]
pub fn parse_gpx_str(text: &str) -> Result<ParsedGpx, ParseError> {
    let gpx = read_gpx_from_str(text).map_err(ParseError::malformed)?;
    validate_gpx(gpx)
}

/// Applies the structural checks to an already-read document.
pub fn validate_gpx(gpx: Gpx) -> Result<ParsedGpx, ParseError> {
    if gpx.tracks.is_empty() {
        return Err(ParseError::NoTracks);
    }

    let metadata = gpx.route_metadata();
    let points = gpx.into_points();

    if points.is_empty() {
        return Err(ParseError::EmptyTracks);
    }

    if points.len() < MIN_POINTS {
        return Err(ParseError::InsufficientPoints {
            count: points.len(),
        });
    }

    let has_elevation = points.iter().any(|p| p.elevation.is_some());
    let has_time = points.iter().any(|p| p.time.is_some());

    debug!(
        "Parsed {} points, has_elevation={}, has_time={}",
        points.len(),
        has_elevation,
        has_time
    );

    Ok(ParsedGpx {
        points,
        has_elevation,
        has_time,
        metadata,
    })
}
