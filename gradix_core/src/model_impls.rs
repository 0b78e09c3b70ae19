use core::fmt;

use geo::{point, Point};
use log::debug;

use crate::model::{
    ClimbCategory, EnhancedPoint, Gpx, RawPoint, RouteMetadata, SimplifiedPoint,
};

impl Gpx {
    /// Returns the total number of points across all tracks and segments.
    pub fn num_points(&self) -> usize {
        self.tracks
            .iter()
            .map(|track| {
                track
                    .segments
                    .iter()
                    .map(|segment| segment.points.len())
                    .sum::<usize>()
            })
            .sum()
    }

    /// The name and description of the route. If the file's metadata does
    /// not name it, the name of the first named track is used.
    pub fn route_metadata(&self) -> RouteMetadata {
        let name = self
            .name
            .clone()
            .or_else(|| self.tracks.iter().find_map(|t| t.name.clone()));

        RouteMetadata {
            name,
            description: self.description.clone(),
        }
    }

    /// Merges all the tracks and segments into one flat list of points in
    /// document order. Gaps between segments (paused recordings, laps) are
    /// not preserved, the route is treated as one continuous line.
    pub fn into_points(self) -> Vec<RawPoint> {
        let mut points = Vec::with_capacity(self.num_points());
        let mut track_count = 0;
        let mut segment_count = 0;

        for src_track in self.tracks {
            track_count += 1;

            for mut src_segment in src_track.segments {
                segment_count += 1;
                points.append(&mut src_segment.points);
            }
        }

        debug!(
            "Merged {} tracks with {} segments and {} points into a single track",
            track_count,
            segment_count,
            points.len(),
        );

        points
    }
}

impl RawPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            time: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Makes a geo-Point based on the lat-lon coordinates of this point.
    /// n.b. x=lon, y=lat. If you do it the other way round the
    /// distances are wrong - a lot wrong.
    pub fn as_geo_point(&self) -> Point {
        point! { x: self.longitude, y: self.latitude }
    }

    /// Missing elevations count as sea level in every calculation.
    pub fn elevation_or_zero(&self) -> f64 {
        self.elevation.unwrap_or_default()
    }
}

impl EnhancedPoint {
    pub fn new(raw: &RawPoint, distance: f64, grade: f64) -> Self {
        Self {
            latitude: raw.latitude,
            longitude: raw.longitude,
            elevation: raw.elevation,
            time: raw.time,
            distance,
            grade,
        }
    }

    /// The original point, without the derived data.
    pub fn raw(&self) -> RawPoint {
        RawPoint {
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: self.elevation,
            time: self.time,
        }
    }

    pub fn elevation_or_zero(&self) -> f64 {
        self.elevation.unwrap_or_default()
    }
}

impl From<&RawPoint> for SimplifiedPoint {
    fn from(value: &RawPoint) -> Self {
        Self {
            lat: value.latitude,
            lon: value.longitude,
            ele: value.elevation_or_zero(),
        }
    }
}

impl ClimbCategory {
    /// The short code, as used in the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            ClimbCategory::Hc => "HC",
            ClimbCategory::Cat1 => "1",
            ClimbCategory::Cat2 => "2",
            ClimbCategory::Cat3 => "3",
            ClimbCategory::Cat4 => "4",
        }
    }

    /// A human readable name such as "Category 2".
    pub fn label(self) -> String {
        match self {
            ClimbCategory::Hc => "Hors Catégorie".to_owned(),
            other => format!("Category {}", other.as_str()),
        }
    }
}

impl fmt::Display for ClimbCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Like [`ClimbCategory::label`], but also names uncategorised climbs.
pub fn category_label(category: Option<ClimbCategory>) -> String {
    match category {
        Some(c) => c.label(),
        None => "Uncategorized".to_owned(),
    }
}
