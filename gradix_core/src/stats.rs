//! Aggregate statistics over a sequence of enhanced points.

use logging_timer::time;

use crate::{
    config::STOP_SPEED_THRESHOLD,
    model::{EnhancedPoint, RouteStats, SegmentStats},
};

/// Elevation totals and extremes, in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElevationStats {
    pub gain: f64,
    pub loss: f64,
    pub min: f64,
    pub max: f64,
}

/// Time-derived statistics. All None if the track has no time data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeStats {
    /// Seconds from the first to the last point.
    pub total_time: Option<f64>,
    /// Seconds spent above STOP_SPEED_THRESHOLD.
    pub moving_time: Option<f64>,
    /// Metres per second over the moving time.
    pub avg_speed: Option<f64>,
    /// Fastest point-to-point speed, in metres per second.
    pub max_speed: Option<f64>,
}

/// Totals the elevation gained and lost, ignoring changes smaller than
/// `vertical_threshold` metres.
///
/// This is a hysteresis filter: the elevation is compared against the last
/// "confirmed" elevation rather than the previous point. Once the difference
/// reaches the threshold, the whole difference is added to the gain or loss
/// and the current elevation becomes the new reference. Without this GPS
/// altitude jitter hugely overstates the amount of climbing.
///
/// Min and max are plain extremes and are not affected by the threshold.
/// Missing elevations count as 0.
pub fn elevation_stats(points: &[EnhancedPoint], vertical_threshold: f64) -> ElevationStats {
    let Some(first) = points.first() else {
        return ElevationStats::default();
    };

    let mut stats = ElevationStats {
        gain: 0.0,
        loss: 0.0,
        min: first.elevation_or_zero(),
        max: first.elevation_or_zero(),
    };
    let mut reference_ele = first.elevation_or_zero();

    for p in points {
        let ele = p.elevation_or_zero();
        stats.min = stats.min.min(ele);
        stats.max = stats.max.max(ele);

        let diff = ele - reference_ele;
        if diff.abs() >= vertical_threshold {
            if diff > 0.0 {
                stats.gain += diff;
            } else {
                stats.loss += diff.abs();
            }
            reference_ele = ele;
        }
    }

    stats
}

/// Calculates total time, moving time and speeds. If the first or last
/// point has no timestamp the track is considered to have no time data.
///
/// Pairs of points where either time is missing, or where time does not
/// advance, are skipped.
pub fn time_stats(points: &[EnhancedPoint]) -> TimeStats {
    let (Some(first_time), Some(last_time)) = (
        points.first().and_then(|p| p.time),
        points.last().and_then(|p| p.time),
    ) else {
        return TimeStats::default();
    };

    let total_time = (last_time - first_time).as_seconds_f64();
    let mut moving_time = 0.0;
    let mut max_speed: f64 = 0.0;

    for pair in points.windows(2) {
        let (Some(t1), Some(t2)) = (pair[0].time, pair[1].time) else {
            continue;
        };

        let delta_seconds = (t2 - t1).as_seconds_f64();
        if delta_seconds <= 0.0 {
            continue;
        }

        let speed = (pair[1].distance - pair[0].distance) / delta_seconds;
        if speed > STOP_SPEED_THRESHOLD {
            moving_time += delta_seconds;
        }
        max_speed = max_speed.max(speed);
    }

    let distance = points[points.len() - 1].distance - points[0].distance;
    let avg_speed = if moving_time > 0.0 {
        Some(distance / moving_time)
    } else {
        None
    };

    TimeStats {
        total_time: Some(total_time),
        moving_time: Some(moving_time),
        avg_speed,
        max_speed: Some(max_speed),
    }
}

/// Reduces the points to a single set of route statistics.
#[time]
pub fn route_stats(points: &[EnhancedPoint], vertical_threshold: f64) -> RouteStats {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return RouteStats::default();
    };

    let elevation = elevation_stats(points, vertical_threshold);
    let time = time_stats(points);

    RouteStats {
        total_distance: last.distance - first.distance,
        total_elevation_gain: elevation.gain,
        total_elevation_loss: elevation.loss,
        min_elevation: elevation.min,
        max_elevation: elevation.max,
        total_time: time.total_time,
        moving_time: time.moving_time,
        avg_speed: time.avg_speed,
        max_speed: time.max_speed,
    }
}

/// Statistics for the part of the route between two distances (inclusive),
/// for example a range selected on the elevation profile. Returns None if the
/// range is inverted or contains no points.
pub fn segment_stats(
    points: &[EnhancedPoint],
    start_distance: f64,
    end_distance: f64,
    vertical_threshold: f64,
) -> Option<SegmentStats> {
    if start_distance > end_distance {
        return None;
    }

    // Distances never decrease so the selection is one contiguous run.
    let first_idx = points.partition_point(|p| p.distance < start_distance);
    let end_idx = points.partition_point(|p| p.distance <= end_distance);
    if first_idx >= end_idx {
        return None;
    }

    Some(SegmentStats {
        start_distance,
        end_distance,
        stats: route_stats(&points[first_idx..end_idx], vertical_threshold),
    })
}
