//! Contains the functionality relating to Climbs.
//! A climb is found by a small state machine running over the smoothed
//! grades. The start and end grades are different so that a grade which
//! hovers around the start value does not produce a string of tiny climbs.

use log::debug;
use logging_timer::time;

use crate::{
    config::{ClimbDetectionParameters, CLIMB_MIN_DISTANCE, CLIMB_MIN_GRADE},
    model::{Climb, ClimbCategory, EnhancedPoint},
};

/// The state of the detector between points.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ClimbState {
    NotClimbing,
    Climbing(OpenClimb),
}

/// A climb that has started but not yet finished.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenClimb {
    start_index: usize,
    start_distance: f64,
    elevation_gain: f64,
    max_grade: f64,
}

impl OpenClimb {
    fn start(index: usize, point: &EnhancedPoint) -> Self {
        Self {
            start_index: index,
            start_distance: point.distance,
            elevation_gain: 0.0,
            max_grade: point.grade,
        }
    }

    /// Turns the open climb into a Climb ending at `point`, or None if it
    /// is too short to count.
    fn close(
        self,
        end_index: usize,
        point: &EnhancedPoint,
        params: &ClimbDetectionParameters,
    ) -> Option<Climb> {
        let distance = point.distance - self.start_distance;
        if distance < params.min_distance_metres || distance <= 0.0 {
            return None;
        }

        let avg_grade = self.elevation_gain / distance * 100.0;

        Some(Climb {
            start_index: self.start_index,
            end_index,
            start_distance: self.start_distance,
            end_distance: point.distance,
            distance,
            elevation_gain: self.elevation_gain,
            avg_grade,
            max_grade: self.max_grade,
            category: categorize_climb(distance, avg_grade),
        })
    }
}

/// Finds the climbs in a route. The climbs are returned in route order and
/// never overlap. A climb still open at the last point is closed there.
///
/// Within a climb only the rises count towards the elevation gain, short
/// dips are ignored. The caller should not bother calling this for routes
/// without elevation data, every grade will be 0.
#[time]
pub fn detect_climbs(points: &[EnhancedPoint], params: &ClimbDetectionParameters) -> Vec<Climb> {
    let mut climbs = Vec::new();
    if points.len() < 2 {
        return climbs;
    }

    let last_idx = points.len() - 1;
    let mut state = ClimbState::NotClimbing;

    for idx in 1..points.len() {
        let p = &points[idx];

        if state == ClimbState::NotClimbing && p.grade >= params.min_grade {
            state = ClimbState::Climbing(OpenClimb::start(idx, p));
        }

        if let ClimbState::Climbing(mut open) = state {
            let rise = p.elevation_or_zero() - points[idx - 1].elevation_or_zero();
            if rise > 0.0 {
                open.elevation_gain += rise;
            }
            open.max_grade = open.max_grade.max(p.grade);

            if p.grade < params.end_grade || idx == last_idx {
                if let Some(climb) = open.close(idx, p, params) {
                    climbs.push(climb);
                }
                state = ClimbState::NotClimbing;
            } else {
                state = ClimbState::Climbing(open);
            }
        }
    }

    debug!("Detected {} climbs in {} points", climbs.len(), points.len());
    climbs
}

/// Categorizes a climb by the product of its length in metres and its
/// average grade in percent, the way the major stage races roughly do.
/// Climbs that are too short or too shallow to be climbs at all are
/// uncategorized whatever their score.
pub fn categorize_climb(distance_metres: f64, avg_grade: f64) -> Option<ClimbCategory> {
    if avg_grade < CLIMB_MIN_GRADE || distance_metres < CLIMB_MIN_DISTANCE {
        return None;
    }

    let score = distance_metres * avg_grade;

    if score > 80_000.0 {
        Some(ClimbCategory::Hc)
    } else if score > 64_000.0 {
        Some(ClimbCategory::Cat1)
    } else if score > 32_000.0 {
        Some(ClimbCategory::Cat2)
    } else if score > 16_000.0 {
        Some(ClimbCategory::Cat3)
    } else if score > 8_000.0 {
        Some(ClimbCategory::Cat4)
    } else {
        None
    }
}
