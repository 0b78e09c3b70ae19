//! Distances along the route and the smoothed grade at every point.

use geo::{HaversineDistance, Point};
use logging_timer::time;

use crate::{
    config::{GRADE_CLAMP, LOOP_THRESHOLD_METRES},
    model::{EnhancedPoint, RawPoint},
};

/// Great-circle distance between two points, in metres, on a sphere with
/// the mean Earth radius.
pub fn distance_between_points_metres(p1: Point, p2: Point) -> f64 {
    p1.haversine_distance(&p2)
}

/// Returns the distance from the first point to every point, following the
/// track. The first entry is always 0 and the sequence never decreases.
pub fn cumulative_distances(points: &[RawPoint]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(points.len());
    if points.is_empty() {
        return distances;
    }

    distances.push(0.0);
    let mut running_metres = 0.0;

    for pair in points.windows(2) {
        running_metres +=
            distance_between_points_metres(pair[0].as_geo_point(), pair[1].as_geo_point());
        distances.push(running_metres);
    }

    distances
}

/// Calculates the grade at each point over a centred window of
/// `window_size` points, i.e. point i uses the rise and run between points
/// `i - window_size/2` and `i + window_size/2` (cut off at the ends of the
/// route). Point-to-point grades are far too noisy to be useful.
///
/// A window that collapses to a single point, or that covers no distance,
/// has a grade of 0. Every grade is clamped to +/- GRADE_CLAMP percent to
/// suppress spikes in the elevation data.
pub fn rolling_grades(points: &[RawPoint], distances: &[f64], window_size: usize) -> Vec<f64> {
    assert_eq!(points.len(), distances.len());

    let half_window = window_size / 2;
    let last_idx = points.len().saturating_sub(1);

    (0..points.len())
        .map(|idx| {
            let start = idx.saturating_sub(half_window);
            let end = (idx + half_window).min(last_idx);
            if start == end {
                return 0.0;
            }

            let horizontal_metres = distances[end] - distances[start];
            if horizontal_metres == 0.0 {
                return 0.0;
            }

            let rise_metres = points[end].elevation_or_zero() - points[start].elevation_or_zero();
            let grade = rise_metres / horizontal_metres * 100.0;
            grade.clamp(-GRADE_CLAMP, GRADE_CLAMP)
        })
        .collect()
}

/// Joins the distances and grades onto the points they were calculated from.
pub fn enhance_points(points: &[RawPoint], distances: &[f64], grades: &[f64]) -> Vec<EnhancedPoint> {
    points
        .iter()
        .zip(distances)
        .zip(grades)
        .map(|((p, &distance), &grade)| EnhancedPoint::new(p, distance, grade))
        .collect()
}

/// Calculates distances and grades and returns the enhanced points.
#[time]
pub fn enhance(points: &[RawPoint], grade_window: usize) -> Vec<EnhancedPoint> {
    let distances = cumulative_distances(points);
    let grades = rolling_grades(points, &distances, grade_window);
    enhance_points(points, &distances, &grades)
}

/// A route is a loop if it finishes within LOOP_THRESHOLD_METRES of where
/// it started.
pub fn is_loop_route(points: &[RawPoint]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => {
            distance_between_points_metres(first.as_geo_point(), last.as_geo_point())
                <= LOOP_THRESHOLD_METRES
        }
        _ => false,
    }
}
