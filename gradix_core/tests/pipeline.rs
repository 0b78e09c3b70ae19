//! Tests for the whole analysis pipeline

mod common;

use common::*;
use gradix_core::{
    analyse_file, analyse_gpx_str,
    climb::detect_climbs,
    config::ClimbDetectionParameters,
    geometry::{cumulative_distances, rolling_grades},
    parse_gpx_str,
    simplification::simplify_with_elevation,
    AnalysisConfig, ParseError, SmoothingLevel,
};

fn analyse(doc: &str) -> gradix_core::AnalysisResult {
    analyse_gpx_str(doc, Some("test.gpx"), &AnalysisConfig::default()).unwrap()
}

fn at(seconds: u32) -> String {
    format!("2024-06-01T08:{:02}:{:02}Z", seconds / 60, seconds % 60)
}

#[test]
fn test_rising_six_point_route_is_well_formed() {
    let points = northward(55.0, (0..6).map(|i| 10.0 + i as f64 * 15.0));
    let result = analyse(&single_track_doc(&points));

    assert!(result.has_elevation);
    assert_eq!(result.points.len(), 6);
    assert_eq!(result.points[0].distance, 0.0);
    assert!(result.points.windows(2).all(|w| w[0].distance < w[1].distance));
    assert!(result.points.iter().all(|p| (-30.0..=30.0).contains(&p.grade)));
    assert!(result.climbs.iter().all(|c| c.distance >= 300.0));
    assert!(approx_eq(result.stats.total_elevation_gain, 75.0, 1e-9));
    assert_eq!(result.stats.min_elevation, 10.0);
    assert_eq!(result.stats.max_elevation, 85.0);
    assert_eq!(result.simplified_points.first().unwrap().ele, 10.0);
    assert_eq!(result.simplified_points.last().unwrap().ele, 85.0);
}

#[test]
fn test_no_tracks_short_circuits() {
    let err = analyse_gpx_str(&gpx_doc(""), None, &AnalysisConfig::default()).unwrap_err();
    assert_eq!(err.message(), "No tracks found in GPX file");
}

#[test]
fn test_one_point_short_circuits() {
    let doc = single_track_doc(&[Pt::new(45.0, 7.0).ele(100.0)]);
    let err = analyse_gpx_str(&doc, None, &AnalysisConfig::default()).unwrap_err();
    assert_eq!(err, ParseError::InsufficientPoints { count: 1 });
}

#[test]
fn test_loop_detection() {
    let far = single_track_doc(&northward(600.0, [0.0, 0.0]));
    assert!(!analyse(&far).is_loop);

    let near = single_track_doc(&northward(100.0, [0.0, 0.0]));
    assert!(analyse(&near).is_loop);
}

#[test]
fn test_out_and_back_is_a_loop() {
    let mut points = northward(200.0, [0.0; 10]);
    let back: Vec<Pt> = points.iter().rev().skip(1).cloned().collect();
    points.extend(back);
    let result = analyse(&single_track_doc(&points));
    assert!(result.is_loop);
    assert!(approx_eq(result.stats.total_distance, 3600.0, 5.0));
}

#[test]
fn test_flat_route() {
    let result = analyse(&single_track_doc(&northward(50.0, [50.0; 30])));
    assert_eq!(result.stats.total_elevation_gain, 0.0);
    assert_eq!(result.stats.total_elevation_loss, 0.0);
    assert!(result.climbs.is_empty());
    assert!(result.points.iter().all(|p| p.grade == 0.0));
}

#[test]
fn test_single_climb_is_found() {
    // Flat for 5 points, up 3 m every 50 m for 10 points, then flat.
    let elevations = (0..20).map(|i: i32| 100.0 + 3.0 * (i - 5).clamp(0, 10) as f64);
    let result = analyse(&single_track_doc(&northward(50.0, elevations)));

    assert_eq!(result.climbs.len(), 1);
    let climb = &result.climbs[0];
    assert!(climb.distance >= 300.0);
    assert!(approx_eq(climb.elevation_gain, 30.0, 1e-6));
    assert!(climb.avg_grade >= 3.0);
    assert!(climb.max_grade <= 30.0);
    assert!(climb.start_index < climb.end_index);
    assert!(approx_eq(
        climb.distance,
        climb.end_distance - climb.start_distance,
        1e-9
    ));
    // 30 m of gain scores 3000, far below Category 4.
    assert_eq!(climb.category, None);
}

#[test]
fn test_climbs_never_overlap() {
    // Two hills separated by a descent and a flat.
    let mut elevations = Vec::new();
    elevations.extend([0.0; 6]);
    elevations.extend((1..=15).map(|i| i as f64 * 5.0));
    elevations.extend((1..=15).map(|i| 75.0 - i as f64 * 5.0));
    elevations.extend([0.0; 6]);
    elevations.extend((1..=15).map(|i| i as f64 * 6.0));
    elevations.extend([90.0; 6]);

    let result = analyse(&single_track_doc(&northward(50.0, elevations)));
    assert_eq!(result.climbs.len(), 2);
    for pair in result.climbs.windows(2) {
        assert!(pair[0].end_index <= pair[1].start_index);
    }
    for climb in &result.climbs {
        assert!(climb.distance >= 300.0);
    }
}

#[test]
fn test_distances_and_grades_properties() {
    let points: Vec<Pt> = (0..200)
        .map(|i| {
            let x = i as f64;
            Pt::new(45.0 + (x * 0.3).sin() * 0.001 + x * 0.0003, 7.0 + (x * 0.2).cos() * 0.001)
                .ele(200.0 + (x * 0.15).sin() * 80.0 + if i % 17 == 0 { 40.0 } else { 0.0 })
        })
        .collect();
    let parsed = parse_gpx_str(&single_track_doc(&points)).unwrap();

    let distances = cumulative_distances(&parsed.points);
    assert_eq!(distances[0], 0.0);
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));

    let grades = rolling_grades(&parsed.points, &distances, 10);
    assert_eq!(grades.len(), parsed.points.len());
    assert!(grades.iter().all(|g| (-30.0..=30.0).contains(g)));
}

#[test]
fn test_simplification_keeps_endpoints_and_is_stable() {
    let points: Vec<Pt> = (0..500)
        .map(|i| {
            let x = i as f64;
            Pt::new(45.0 + x * 0.0002, 7.0 + (x * 0.05).sin() * 0.003).ele(300.0 + (x * 0.02).cos() * 0.01)
        })
        .collect();
    let parsed = parse_gpx_str(&single_track_doc(&points)).unwrap();
    let tolerance = 0.0001;

    let once = simplify_with_elevation(&parsed.points, tolerance);
    assert_eq!(once[0].lat, parsed.points[0].latitude);
    assert_eq!(once.last().unwrap().lon, parsed.points[499].longitude);
    assert!(once.len() < parsed.points.len());

    let as_raw: Vec<_> = once
        .iter()
        .map(|p| gradix_core::model::RawPoint::new(p.lat, p.lon).with_elevation(p.ele))
        .collect();
    let twice = simplify_with_elevation(&as_raw, tolerance);
    assert_eq!(once, twice);
}

#[test]
fn test_time_statistics() {
    // 50 m every 10 s, then a one minute stop, then 50 m in 10 s.
    let mut points: Vec<Pt> = northward(50.0, [100.0; 6])
        .into_iter()
        .enumerate()
        .map(|(i, p)| p.time(&at(i as u32 * 10)))
        .collect();
    let last = points[5].clone();
    points.push(last.time(&at(110)));
    points.push(Pt::new(45.0 + 300.0 * METRE, 7.0).ele(100.0).time(&at(120)));

    let result = analyse(&single_track_doc(&points));
    assert!(result.has_time);
    assert_eq!(result.stats.total_time, Some(120.0));
    assert_eq!(result.stats.moving_time, Some(60.0));
    assert!(approx_eq(result.stats.avg_speed.unwrap(), 5.0, 0.01));
    assert!(approx_eq(result.stats.max_speed.unwrap(), 5.0, 0.01));
}

#[test]
fn test_no_time_means_no_time_statistics() {
    let mut points = northward(50.0, [100.0; 4]);
    points[0] = points[0].clone().time(&at(0));
    let result = analyse(&single_track_doc(&points));
    assert!(result.has_time);
    assert_eq!(result.stats.total_time, None);
    assert_eq!(result.stats.moving_time, None);
    assert_eq!(result.stats.avg_speed, None);
    assert_eq!(result.stats.max_speed, None);
}

#[test]
fn test_smoothing_levels_reduce_gain() {
    // A noisy flat road: +/- 2 m of jitter.
    let elevations = (0..60).map(|i| 100.0 + if i % 2 == 0 { 2.0 } else { -2.0 });
    let doc = single_track_doc(&northward(20.0, elevations));

    let gain = |level| {
        analyse_gpx_str(&doc, None, &AnalysisConfig::with_smoothing(level))
            .unwrap()
            .stats
            .total_elevation_gain
    };

    assert!(gain(SmoothingLevel::Off) > 100.0);
    assert!(gain(SmoothingLevel::Low) > 100.0);
    assert_eq!(gain(SmoothingLevel::Medium), 0.0);
    assert_eq!(gain(SmoothingLevel::High), 0.0);
}

#[test]
fn test_segment_stats_over_the_climb() {
    let elevations = (0..20).map(|i: i32| 100.0 + 3.0 * (i - 5).clamp(0, 10) as f64);
    let result = analyse(&single_track_doc(&northward(50.0, elevations)));

    let seg = result
        .segment_stats(result.points[5].distance, result.points[15].distance)
        .unwrap();
    assert!(approx_eq(seg.stats.total_distance, 500.0, 1.0));
    assert_eq!(seg.stats.min_elevation, 100.0);
    assert_eq!(seg.stats.max_elevation, 130.0);
    // 3 m steps add up to 30 m, confirmed every 6 m at medium smoothing.
    assert!(approx_eq(seg.stats.total_elevation_gain, 30.0, 1e-9));
    assert!(result.segment_stats(10.0, 5.0).is_none());
}

#[test]
fn test_climb_detection_matches_pipeline() {
    let elevations = (0..20).map(|i: i32| 100.0 + 3.0 * (i - 5).clamp(0, 10) as f64);
    let result = analyse(&single_track_doc(&northward(50.0, elevations)));
    let again = detect_climbs(&result.points, &ClimbDetectionParameters::default());
    assert_eq!(again, result.climbs);
}

#[test]
fn test_analyse_file_records_the_file_name() {
    let path = std::env::temp_dir().join(format!("gradix-test-{}.gpx", std::process::id()));
    std::fs::write(&path, single_track_doc(&northward(100.0, [10.0, 20.0, 30.0]))).unwrap();

    let result = analyse_file(&path, &AnalysisConfig::default());
    std::fs::remove_file(&path).unwrap();

    let result = result.unwrap();
    assert_eq!(
        result.file_name.as_deref(),
        path.file_name().and_then(|f| f.to_str())
    );
    assert_eq!(result.points.len(), 3);
}

#[test]
fn test_analyse_missing_file_is_an_error() {
    let path = std::env::temp_dir().join("gradix-test-does-not-exist.gpx");
    let err = analyse_file(&path, &AnalysisConfig::default()).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read"));
}
