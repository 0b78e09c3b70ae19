use log::info;
use logging_timer::time;

use crate::{
    config::DEFAULT_SIMPLIFY_TOLERANCE,
    model::{RawPoint, SimplifiedPoint},
};

/// We take input from the user in "metres of accuracy".
/// The simplifier requires an epsilon which is relative to the
/// coordinate scale in use. Since we are using lat-lon, we need to
/// convert metres using the following relation:
/// 1 degree of latitude = 111,111 metres
pub fn metres_to_epsilon(metres: u16) -> f64 {
    metres as f64 / 111111.0
}

/// Picks a tolerance, in degrees, from the size of the track. Small tracks
/// keep more detail, huge tracks are reduced hard enough to stay cheap to
/// render.
///
/// Input Points    Tolerance   Roughly
/// < 1,000         0.00005     5 m
/// < 10,000        0.0001      10 m
/// < 50,000        0.0002      20 m
/// otherwise       0.0005      50 m
pub fn adaptive_tolerance(num_points: usize) -> f64 {
    if num_points < 1_000 {
        0.00005
    } else if num_points < 10_000 {
        DEFAULT_SIMPLIFY_TOLERANCE
    } else if num_points < 50_000 {
        0.0002
    } else {
        0.0005
    }
}

/// A point as a plain 3D coordinate: (lon, lat, elevation).
type Vec3 = [f64; 3];

fn to_vec3(p: &RawPoint) -> Vec3 {
    [p.longitude, p.latitude, p.elevation_or_zero()]
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Squared distance from `p` to the line segment `a -> b`.
fn segment_distance_squared(p: Vec3, a: Vec3, b: Vec3) -> f64 {
    let ab = sub(b, a);
    let ap = sub(p, a);
    let len_sq = dot(ab, ab);

    if len_sq == 0.0 {
        return dot(ap, ap);
    }

    let t = (dot(ap, ab) / len_sq).clamp(0.0, 1.0);
    let closest = [a[0] + t * ab[0], a[1] + t * ab[1], a[2] + t * ab[2]];
    let d = sub(p, closest);
    dot(d, d)
}

/// Douglas-Peucker in three dimensions, treating (lon, lat, elevation) as
/// Euclidean space. Elevation is in metres and lat-lon in degrees so the
/// elevation dominates: a point is kept if it changes the elevation profile
/// even when it is on a straight road.
///
/// The first and last points are always kept. Inputs of 2 points or fewer
/// are returned as they are. Uses an explicit work stack so very long
/// unsimplifiable tracks cannot overflow the call stack.
#[time]
pub fn simplify_with_elevation(points: &[RawPoint], tolerance: f64) -> Vec<SimplifiedPoint> {
    if points.len() <= 2 {
        return points.iter().map(SimplifiedPoint::from).collect();
    }

    let coords: Vec<Vec3> = points.iter().map(to_vec3).collect();
    let tolerance_sq = tolerance * tolerance;
    let last_idx = coords.len() - 1;

    let mut keep = vec![false; coords.len()];
    keep[0] = true;
    keep[last_idx] = true;

    let mut stack = vec![(0, last_idx)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }

        let mut max_dist_sq = 0.0;
        let mut max_idx = first;
        for idx in first + 1..last {
            let d = segment_distance_squared(coords[idx], coords[first], coords[last]);
            if d > max_dist_sq {
                max_dist_sq = d;
                max_idx = idx;
            }
        }

        if max_dist_sq > tolerance_sq {
            keep[max_idx] = true;
            stack.push((max_idx, last));
            stack.push((first, max_idx));
        }
    }

    let simplified: Vec<SimplifiedPoint> = points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then(|| SimplifiedPoint::from(p)))
        .collect();

    info!(
        "Simplified {} points to {} ({:.1}%) with tolerance {}",
        points.len(),
        simplified.len(),
        simplified.len() as f64 * 100.0 / points.len() as f64,
        tolerance
    );

    simplified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(lat: f64, lon: f64, ele: f64) -> RawPoint {
        RawPoint::new(lat, lon).with_elevation(ele)
    }

    fn from_simplified(points: &[SimplifiedPoint]) -> Vec<RawPoint> {
        points.iter().map(|p| raw(p.lat, p.lon, p.ele)).collect()
    }

    #[test]
    fn tolerance_by_size() {
        assert_eq!(adaptive_tolerance(0), 0.00005);
        assert_eq!(adaptive_tolerance(999), 0.00005);
        assert_eq!(adaptive_tolerance(1_000), 0.0001);
        assert_eq!(adaptive_tolerance(9_999), 0.0001);
        assert_eq!(adaptive_tolerance(10_000), 0.0002);
        assert_eq!(adaptive_tolerance(49_999), 0.0002);
        assert_eq!(adaptive_tolerance(50_000), 0.0005);
    }

    #[test]
    fn metres_conversion() {
        assert!((metres_to_epsilon(10) - 0.00009).abs() < 1e-6);
    }

    #[test]
    fn small_inputs_are_unchanged() {
        assert!(simplify_with_elevation(&[], 0.1).is_empty());

        let one = [raw(1.0, 2.0, 3.0)];
        assert_eq!(
            simplify_with_elevation(&one, 0.1),
            vec![SimplifiedPoint { lat: 1.0, lon: 2.0, ele: 3.0 }]
        );

        let two = [raw(1.0, 2.0, 3.0), RawPoint::new(1.0, 2.0)];
        let s = simplify_with_elevation(&two, 1000.0);
        assert_eq!(s.len(), 2);
        assert_eq!(s[1].ele, 0.0);
    }

    #[test]
    fn straight_line_reduces_to_endpoints() {
        let points: Vec<RawPoint> = (0..50)
            .map(|i| raw(45.0 + i as f64 * 0.001, 6.0 + i as f64 * 0.001, 100.0))
            .collect();
        let s = simplify_with_elevation(&points, 0.0001);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0], SimplifiedPoint::from(&points[0]));
        assert_eq!(s[1], SimplifiedPoint::from(&points[49]));
    }

    #[test]
    fn corners_are_kept() {
        let points = vec![
            raw(0.0, 0.0, 0.0),
            raw(0.0, 0.5, 0.0),
            raw(0.0, 1.0, 0.0),
            raw(0.5, 1.0, 0.0),
            raw(1.0, 1.0, 0.0),
        ];
        let s = simplify_with_elevation(&points, 0.01);
        let lats_lons: Vec<(f64, f64)> = s.iter().map(|p| (p.lat, p.lon)).collect();
        assert_eq!(lats_lons, vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
    }

    #[test]
    fn elevation_changes_are_kept() {
        // Straight in plan but with a hill in the middle.
        let points = vec![
            raw(0.0, 0.0, 0.0),
            raw(0.0, 0.001, 0.0),
            raw(0.0, 0.002, 50.0),
            raw(0.0, 0.003, 0.0),
            raw(0.0, 0.004, 0.0),
        ];
        let s = simplify_with_elevation(&points, 0.0001);
        assert!(s.iter().any(|p| p.ele == 50.0));
    }

    #[test]
    fn output_is_in_input_order_and_keeps_endpoints() {
        let points: Vec<RawPoint> = (0..200)
            .map(|i| {
                let x = i as f64 * 0.0005;
                raw(45.0 + (x * 40.0).sin() * 0.01, 6.0 + x, 100.0)
            })
            .collect();
        let s = simplify_with_elevation(&points, 0.0001);
        assert!(s.len() < points.len());
        assert_eq!(s[0], SimplifiedPoint::from(&points[0]));
        assert_eq!(*s.last().unwrap(), SimplifiedPoint::from(&points[199]));
        assert!(s.windows(2).all(|w| w[0].lon < w[1].lon));
    }

    #[test]
    fn simplifying_twice_removes_nothing_more() {
        let points: Vec<RawPoint> = (0..300)
            .map(|i| {
                let x = i as f64 * 0.0003;
                raw(45.0 + (x * 25.0).cos() * 0.02, 6.0 + x, (x * 10.0).sin() * 0.002)
            })
            .collect();
        let once = simplify_with_elevation(&points, 0.0002);
        let twice = simplify_with_elevation(&from_simplified(&once), 0.0002);
        assert_eq!(once, twice);
    }

    #[test]
    fn long_unsimplifiable_track_does_not_overflow() {
        // A zig-zag where every point is a corner.
        let points: Vec<RawPoint> = (0..10_000)
            .map(|i| raw(if i % 2 == 0 { 0.0 } else { 1.0 }, i as f64, 0.0))
            .collect();
        let s = simplify_with_elevation(&points, 0.01);
        assert_eq!(s.len(), points.len());
    }
}
