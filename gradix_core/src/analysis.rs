//! Runs the whole pipeline: parse, enhance, statistics, climbs, simplify.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use logging_timer::time;

use crate::{
    climb::detect_climbs,
    config::AnalysisConfig,
    error::ParseError,
    geometry::{enhance, is_loop_route},
    model::{AnalysisResult, ParsedGpx, SegmentStats},
    parser::parse_gpx_str,
    simplification::{adaptive_tolerance, simplify_with_elevation},
    stats::{route_stats, segment_stats},
};

/// Analyses a GPX document held in memory. This is a pure function of its
/// inputs. A parse failure stops the pipeline before anything else runs, so
/// there are no partial results.
#[time]
pub fn analyse_gpx_str(
    text: &str,
    file_name: Option<&str>,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, ParseError> {
    let parsed = parse_gpx_str(text)?;
    Ok(analyse_parsed(parsed, file_name, config))
}

/// Runs the stages after parsing. Cannot fail.
pub fn analyse_parsed(
    parsed: ParsedGpx,
    file_name: Option<&str>,
    config: &AnalysisConfig,
) -> AnalysisResult {
    let ParsedGpx {
        points,
        has_elevation,
        has_time,
        metadata,
    } = parsed;

    let enhanced = enhance(&points, config.grade_window);
    let stats = route_stats(&enhanced, config.smoothing.vertical_threshold_metres());

    let climbs = if has_elevation {
        detect_climbs(&enhanced, &config.climbs)
    } else {
        Vec::new()
    };

    let tolerance = config
        .simplify_tolerance
        .unwrap_or_else(|| adaptive_tolerance(points.len()));
    let simplified_points = simplify_with_elevation(&points, tolerance);

    AnalysisResult {
        file_name: file_name.map(str::to_owned),
        metadata,
        smoothing: config.smoothing,
        is_loop: is_loop_route(&points),
        points: enhanced,
        simplified_points,
        stats,
        climbs,
        has_elevation,
        has_time,
    }
}

/// Reads a GPX file and analyses it. The file name (without the directory)
/// is recorded in the result.
#[time]
pub fn analyse_file<P: AsRef<Path>>(input_file: P, config: &AnalysisConfig) -> Result<AnalysisResult> {
    let input_file = input_file.as_ref();
    info!("Analysing GPX file {:?}", input_file);

    let text = std::fs::read_to_string(input_file)
        .with_context(|| format!("Failed to read {:?}", input_file))?;
    let file_name = input_file.file_name().map(|f| f.to_string_lossy());

    let result = analyse_gpx_str(&text, file_name.as_deref(), config)
        .with_context(|| format!("Failed to analyse {:?}", input_file))?;
    Ok(result)
}

impl AnalysisResult {
    /// Statistics for the part of the route between two distances, in
    /// metres from the start. Elevation changes are filtered with the same
    /// smoothing level as the whole route.
    pub fn segment_stats(&self, start_distance: f64, end_distance: f64) -> Option<SegmentStats> {
        segment_stats(
            &self.points,
            start_distance,
            end_distance,
            self.smoothing.vertical_threshold_metres(),
        )
    }
}
