use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::config::SmoothingLevel;

pub type Lat = f64; // -90..90
pub type Lon = f64; // -180..180

/// Data read from a GPX file. Only the parts of
/// https://www.topografix.com/GPX/1/1/gpx.xsd that the analysis needs are
/// kept: the metadata name/description and the tracks. Waypoints, routes and
/// extensions are skipped by the reader.
#[derive(Debug, Clone, Default)]
pub struct Gpx {
    /// The 'version' attribute, "1.0" or "1.1".
    pub version: Option<String>,
    /// The 'creator' attribute.
    pub creator: Option<String>,
    /// The name of the GPX file, from the metadata element.
    pub name: Option<String>,
    /// A description of the GPX file, from the metadata element.
    pub description: Option<String>,
    /// A list of tracks, in document order.
    pub tracks: Vec<Track>,
}

/// A Track is an ordered list of points describing a path.
#[derive(Debug, Clone, Default)]
pub struct Track {
    /// GPS name of the track.
    pub name: Option<String>,
    /// List of segments in the track. A new segment is normally started
    /// when GPS reception was lost or the receiver was turned off.
    pub segments: Vec<TrackSegment>,
}

/// A Track Segment holds a list of Track Points which are logically connected
/// in order.
#[derive(Debug, Clone, Default)]
pub struct TrackSegment {
    pub points: Vec<RawPoint>,
}

/// A single `<trkpt>` as recorded by the device. Immutable once read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPoint {
    /// The latitude, read from the "lat" attribute. Decimal degrees, WGS84.
    pub latitude: Lat,
    /// The longitude, read from the "lon" attribute. Decimal degrees, WGS84.
    pub longitude: Lon,
    /// The elevation in metres, as read from the <ele> tag.
    pub elevation: Option<f64>,
    /// The time as read from the <time> tag.
    #[serde(with = "time::serde::rfc3339::option")]
    pub time: Option<OffsetDateTime>,
}

/// The successful output of the parser: one flat, ordered point sequence
/// plus flags describing what data the points carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedGpx {
    pub points: Vec<RawPoint>,
    /// True iff at least one point has an elevation.
    pub has_elevation: bool,
    /// True iff at least one point has a timestamp.
    pub has_time: bool,
    pub metadata: RouteMetadata,
}

/// Descriptive information about the route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A RawPoint with the derived distance and grade attached. One-to-one with
/// the RawPoints it was made from, in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedPoint {
    pub latitude: Lat,
    pub longitude: Lon,
    pub elevation: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub time: Option<OffsetDateTime>,
    /// Metres from the first point of the route, following the track.
    pub distance: f64,
    /// Smoothed slope at this point, in percent. Always within [-30, 30].
    pub grade: f64,
}

/// A point of the simplified polyline used for rendering. Elevation is 0
/// where the source point had none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedPoint {
    pub lat: Lat,
    pub lon: Lon,
    pub ele: f64,
}

/// Climb categories, from hardest to easiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClimbCategory {
    /// Hors Catégorie - beyond categorisation.
    #[serde(rename = "HC")]
    Hc,
    #[serde(rename = "1")]
    Cat1,
    #[serde(rename = "2")]
    Cat2,
    #[serde(rename = "3")]
    Cat3,
    #[serde(rename = "4")]
    Cat4,
}

/// A contiguous stretch of the route with sustained positive grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Climb {
    /// Index into the EnhancedPoints of the first point of the climb.
    pub start_index: usize,
    /// Index into the EnhancedPoints of the last point of the climb.
    pub end_index: usize,
    pub start_distance: f64,
    pub end_distance: f64,
    /// Length of the climb in metres.
    pub distance: f64,
    /// Sum of the positive elevation deltas within the climb, in metres.
    pub elevation_gain: f64,
    pub avg_grade: f64,
    pub max_grade: f64,
    /// None means uncategorised.
    pub category: Option<ClimbCategory>,
}

/// Aggregate statistics for a route, or part of one. Distances are in
/// metres, times in seconds and speeds in m/s. The time-derived fields are
/// None when the points carry no usable timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub total_distance: f64,
    pub total_elevation_gain: f64,
    pub total_elevation_loss: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub total_time: Option<f64>,
    pub moving_time: Option<f64>,
    pub avg_speed: Option<f64>,
    pub max_speed: Option<f64>,
}

/// Statistics for a selected distance range of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    pub start_distance: f64,
    pub end_distance: f64,
    #[serde(flatten)]
    pub stats: RouteStats,
}

/// The complete analysis of one GPX document. Built in one go by
/// [`crate::analysis::analyse_gpx_str`] and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub file_name: Option<String>,
    pub metadata: RouteMetadata,
    /// The smoothing level the elevation statistics were computed with.
    pub smoothing: SmoothingLevel,
    /// Full-resolution points with distance and grade.
    pub points: Vec<EnhancedPoint>,
    /// Reduced point set for map rendering.
    pub simplified_points: Vec<SimplifiedPoint>,
    pub stats: RouteStats,
    pub climbs: Vec<Climb>,
    pub has_elevation: bool,
    pub has_time: bool,
    /// True if the start and end are within LOOP_THRESHOLD_METRES.
    pub is_loop: bool,
}
